//! Shared test fixtures

use crate::editor::Editor;
use std::sync::Arc;
use text_engine::testing::FakeFace;
use text_model::{FontName, TextStyle};

/// An editor over `text` at font size 10 with the fake face installed
/// (every character advances 6px, line boxes are 10px tall)
pub(crate) fn editor(text: &str) -> Editor {
    let mut style = TextStyle::default();
    style.font_size = 10.0;
    let mut editor = Editor::new(text, style);
    editor.install_face(
        FontName::new("Inter", "Regular").cache_key(),
        Arc::new(FakeFace::new()),
    );
    editor
}
