//! The editor facade and its synchronous recompute cycle
//!
//! `Editor` owns the persistent document, the font store, the selection,
//! and the derived-data bundle. Every mutation invalidates the tightest
//! tier of the bundle and runs `apply`, so callers always observe a
//! consistent layout after a call returns. Fonts arrive asynchronously:
//! a pass over text whose font is missing lays out with placeholders,
//! enqueues requests, and the host re-enters through `install_font_data`.

use crate::error::Result;
use crate::events::{EditorEvent, EventCallback, EventHub};
use crate::rects::Rect;
use layout_engine::cache::tier_for;
use layout_engine::{baseline, decorations, glyphs, offsets, wrap, Baseline, DerivedData, Glyph};
use text_engine::{compute_metrics, FontFace, FontRequest, FontStore};
use text_model::{
    AutoResize, InvalidationTier, Selection, SelectionUpdate, StyleField, StyleId, StyleOverride,
    TextData, TextStyle, BASE_STYLE_ID,
};

pub struct Editor {
    pub(crate) data: TextData,
    pub(crate) store: FontStore,
    pub(crate) derived: DerivedData,
    pub(crate) selection: Selection,
    /// Style waiting to be applied to the next insertion at a collapsed
    /// selection; cleared by deselect
    pub(crate) pending_style: Option<StyleOverride>,
    pub(crate) events: EventHub,
    pub(crate) width: Option<f32>,
    pub(crate) height: Option<f32>,
}

impl Editor {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        let mut editor = Self {
            data: TextData::new(text, style),
            store: FontStore::new(),
            derived: DerivedData::default(),
            selection: Selection::NONE,
            pending_style: None,
            events: EventHub::default(),
            width: None,
            height: None,
        };
        editor.apply();
        editor
    }

    pub fn from_data(data: TextData) -> Self {
        let mut editor = Self {
            data,
            store: FontStore::new(),
            derived: DerivedData::default(),
            selection: Selection::NONE,
            pending_style: None,
            events: EventHub::default(),
            width: None,
            height: None,
        };
        editor.apply();
        editor
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn text(&self) -> &str {
        &self.data.characters
    }

    pub fn data(&self) -> &TextData {
        &self.data
    }

    pub fn base_style(&self) -> &TextStyle {
        &self.data.style
    }

    pub fn baselines(&self) -> &[Baseline] {
        &self.derived.baselines
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.derived.glyphs
    }

    /// Underline and strikethrough rectangles for the current layout
    pub fn get_text_decoration_rects(&self) -> &[Rect] {
        &self.derived.decoration_rects
    }

    /// Per-character horizontal offsets, line-relative
    pub fn character_offsets(&self) -> &[f32] {
        &self.derived.logical_character_offsets
    }

    pub fn content_width(&self) -> f32 {
        self.derived.content_width
    }

    pub fn content_height(&self) -> f32 {
        self.derived.content_height
    }

    pub fn on(&mut self, event: EditorEvent, callback: EventCallback) {
        self.events.on(event, callback);
    }

    // =========================================================================
    // Layout entry points
    // =========================================================================

    /// Lay out against the given dimensions. `None` components auto-size:
    /// both absent grows in both directions, width alone fixes the width and
    /// grows the height, both present is a fixed box.
    pub fn layout(&mut self, width: Option<f32>, height: Option<f32>) {
        self.width = width;
        self.height = height;
        let mode = match (width, height) {
            (None, _) => AutoResize::WidthAndHeight,
            (Some(_), None) => AutoResize::Height,
            (Some(_), Some(_)) => AutoResize::None,
        };
        let changed = self.data.style.text_auto_resize != mode;
        self.data.style.text_auto_resize = mode;
        let tier = if changed {
            tier_for(&[StyleField::TextAutoResize])
        } else {
            InvalidationTier::Metrics
        };
        self.invalidate(tier);
        self.apply();
    }

    /// Run the derivation pipeline over whatever layers are stale:
    /// metrics -> wrapped lines -> baselines -> glyphs -> offsets, with the
    /// truncation result written back into the base style.
    pub(crate) fn apply(&mut self) {
        let metrics = match self.derived.metrics.take() {
            Some(metrics) => metrics,
            None => compute_metrics(&self.data, &mut self.store),
        };

        let avail_w = self.available_width();
        let avail_h = self.available_height();
        let lines = wrap(&self.data, &metrics, avail_w);
        let layout = baseline::compute(&self.data, lines, avail_w, avail_h);

        match layout.truncation {
            Some((start, height)) => {
                self.data.style.truncation_start_index = start as i64;
                self.data.style.truncated_height = height;
            }
            None => {
                self.data.style.truncation_start_index = -1;
                self.data.style.truncated_height = -1.0;
            }
        }

        let glyph_output = glyphs::assemble(&self.data, &layout, &mut self.store);
        let decoration_rects = decorations::compute(&self.data, &layout);
        let character_offsets = offsets::compute(&layout, self.data.char_len());

        self.derived.metrics = Some(metrics);
        self.derived.baselines = layout.baselines;
        self.derived.lines = layout.lines;
        self.derived.glyphs = glyph_output.glyphs;
        self.derived.decoration_rects = decoration_rects;
        self.derived.logical_character_offsets = character_offsets;
        self.derived.content_width = layout.content_width;
        self.derived.content_height = layout.content_height;

        tracing::debug!(
            baselines = self.derived.baselines.len(),
            width = self.derived.content_width,
            height = self.derived.content_height,
            "layout recomputed"
        );

        self.clamp_selection();
        self.events.emit(EditorEvent::LayoutChanged);
    }

    pub(crate) fn invalidate(&mut self, tier: InvalidationTier) {
        self.derived.invalidate(tier);
    }

    fn available_width(&self) -> Option<f32> {
        match self.data.style.text_auto_resize {
            AutoResize::WidthAndHeight => None,
            _ => self.width,
        }
    }

    fn available_height(&self) -> Option<f32> {
        match self.data.style.text_auto_resize {
            AutoResize::None => self.height,
            _ => None,
        }
    }

    // =========================================================================
    // Asynchronous font plumbing
    // =========================================================================

    pub fn take_pending_font_requests(&mut self) -> Vec<FontRequest> {
        self.store.take_pending_font_requests()
    }

    /// Deliver fetched font bytes. `Ok(true)` means the delivery was
    /// accepted and layout re-ran once; stale keys are ignored and
    /// unparsable data is an error.
    pub fn install_font_data(&mut self, key: &str, bytes: Vec<u8>) -> Result<bool> {
        if self.store.install_font_data(key, bytes)? {
            self.invalidate(InvalidationTier::All);
            self.apply();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Register an already-parsed face (tests, embedded fonts)
    pub fn install_face(&mut self, key: impl Into<String>, face: std::sync::Arc<dyn FontFace>) {
        self.store.install_face(key, face);
        self.invalidate(InvalidationTier::All);
        self.apply();
    }

    // =========================================================================
    // Selection coordinate mapping (shared by edit/select/navigate/rects)
    // =========================================================================

    /// Whether the document ends with a break, creating an empty phantom
    /// line below the last baseline. The phantom line's baseline index is
    /// `baselines.len()`.
    pub(crate) fn has_phantom_line(&self) -> bool {
        self.data.characters.ends_with('\n')
    }

    pub(crate) fn style_id_at(&self, offset: usize) -> StyleId {
        self.data
            .character_style_ids
            .get(offset)
            .copied()
            .unwrap_or(BASE_STYLE_ID)
    }

    /// Absolute character offset of a `(baseline, offset)` pair
    pub(crate) fn abs_offset(&self, baseline: i32, offset: i32) -> usize {
        if baseline < 0 || offset < 0 {
            return 0;
        }
        let baseline = baseline as usize;
        if baseline >= self.derived.baselines.len() {
            return self.data.char_len();
        }
        let b = &self.derived.baselines[baseline];
        (b.first_character + offset as usize).min(b.end_character)
    }

    pub(crate) fn focus_abs(&self) -> usize {
        self.abs_offset(self.selection.focus, self.selection.focus_offset)
    }

    pub(crate) fn anchor_abs(&self) -> usize {
        self.abs_offset(self.selection.anchor, self.selection.anchor_offset)
    }

    /// The selected absolute character range in reading order, when a
    /// non-collapsed selection exists
    pub(crate) fn selection_range(&self) -> Option<(usize, usize)> {
        if !self.selection.has_selection() || self.selection.is_collapsed() {
            return None;
        }
        let a = self.anchor_abs();
        let f = self.focus_abs();
        Some((a.min(f), a.max(f)))
    }

    /// Map an absolute character offset back to `(baseline, offset)`.
    /// The end of a document with a trailing break maps to the phantom line.
    pub(crate) fn update_for_offset(&self, abs: usize) -> SelectionUpdate {
        let abs = abs.min(self.data.char_len());
        if self.has_phantom_line() && abs == self.data.char_len() {
            return SelectionUpdate::collapsed(self.derived.baselines.len() as i32, 0);
        }
        let index = self
            .derived
            .baselines
            .iter()
            .rposition(|b| b.first_character <= abs)
            .unwrap_or(0);
        let b = match self.derived.baselines.get(index) {
            Some(b) => b,
            None => return SelectionUpdate::collapsed(0, 0),
        };
        let offset = abs.min(b.end_character) - b.first_character;
        SelectionUpdate::collapsed(index as i32, offset as i32)
    }

    /// Collapse the selection at an absolute offset and announce it
    pub(crate) fn set_caret(&mut self, abs: usize) {
        let update = self.update_for_offset(abs);
        self.selection = Selection::NONE;
        self.selection.merge(update);
        self.events.emit(EditorEvent::SelectionChanged);
    }

    /// Number of caret positions on a baseline (a terminating break is not
    /// a caret position; the caret before it is the line's last)
    pub(crate) fn caret_slots(&self, baseline: usize) -> usize {
        let (b, line) = match (
            self.derived.baselines.get(baseline),
            self.derived.lines.get(baseline),
        ) {
            (Some(b), Some(line)) => (b, line),
            _ => return 0,
        };
        let count = b.end_character - b.first_character;
        if line.ends_with_break {
            count.saturating_sub(1)
        } else {
            count
        }
    }

    /// Absolute x of the caret at `(baseline, offset)`, alignment included
    pub(crate) fn caret_x(&self, baseline: usize, offset: usize) -> f32 {
        if baseline >= self.derived.baselines.len() {
            // Phantom line: caret sits at the line's indentation
            return layout_engine::indentation_px(&self.data, self.data.lines.len().saturating_sub(1));
        }
        let b = &self.derived.baselines[baseline];
        let abs = b.first_character + offset;
        // Inside the line the offset table applies directly; at or past the
        // line end (including the slot before a terminating break, whose
        // offset equals the break's) the caret sits at the visible end
        let rel = if abs < b.end_character {
            self.derived
                .logical_character_offsets
                .get(abs)
                .copied()
                .unwrap_or_else(|| self.line_end_x(baseline))
        } else {
            self.line_end_x(baseline)
        };
        b.position.0 + rel
    }

    /// Line-relative x of the caret past the last slot
    fn line_end_x(&self, baseline: usize) -> f32 {
        self.derived
            .lines
            .get(baseline)
            .map(|l| l.paragraph_indent + l.width())
            .unwrap_or(0.0)
    }

    /// Drop a selection whose baseline indices no longer exist after a
    /// relayout changed the line count
    pub(crate) fn clamp_selection(&mut self) {
        if !self.selection.has_selection() {
            return;
        }
        let last = self.derived.baselines.len() as i32 - 1;
        let max = if self.has_phantom_line() { last + 1 } else { last }.max(0);
        if self.selection.anchor > max {
            self.selection.anchor = max;
            self.selection.anchor_offset = 0;
        }
        if self.selection.focus > max {
            self.selection.focus = max;
            self.selection.focus_offset = 0;
        }
        let clamp_offset = |baseline: i32, offset: i32, editor: &Editor| -> i32 {
            let b = baseline as usize;
            if b >= editor.derived.baselines.len() {
                return 0;
            }
            let slots = editor.caret_slots(b) as i32;
            offset.min(slots)
        };
        self.selection.anchor_offset =
            clamp_offset(self.selection.anchor, self.selection.anchor_offset, self);
        self.selection.focus_offset =
            clamp_offset(self.selection.focus, self.selection.focus_offset, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EditorEvent;
    use crate::test_util::editor;
    use std::cell::RefCell;
    use std::rc::Rc;
    use text_model::Toggle;

    #[test]
    fn construction_lays_out() {
        let editor = editor("ab\ncd");
        assert_eq!(editor.baselines().len(), 2);
        assert!((editor.content_height() - 20.0).abs() < 1e-4);
        assert!((editor.content_width() - 12.0).abs() < 1e-4);
    }

    #[test]
    fn layout_dimensions_drive_auto_resize() {
        let mut editor = editor("ab cd ef");
        editor.layout(Some(30.0), None);
        assert_eq!(editor.base_style().text_auto_resize, AutoResize::Height);
        // Budget of 30px fits one 5-character chunk per line
        assert!(editor.baselines().len() > 1);

        editor.layout(None, None);
        assert_eq!(
            editor.base_style().text_auto_resize,
            AutoResize::WidthAndHeight
        );
        assert_eq!(editor.baselines().len(), 1);
    }

    #[test]
    fn truncation_writes_back_into_style() {
        let mut editor = editor("a\nb\nc\nd");
        editor.data.style.text_truncation = Toggle::Enable;
        editor.data.style.max_lines = 2;
        editor.layout(Some(100.0), Some(100.0));
        assert_eq!(editor.base_style().truncation_start_index, 4);
        assert!((editor.base_style().truncated_height - 20.0).abs() < 1e-4);

        editor.layout(None, None);
        assert_eq!(editor.base_style().truncation_start_index, -1);
    }

    #[test]
    fn font_arrival_reruns_layout_once() {
        let mut style = TextStyle::default();
        style.font_size = 10.0;
        let mut editor = Editor::new("ab", style);
        // No face installed: placeholders have zero advance
        assert!((editor.content_width() - 0.0).abs() < 1e-4);
        let requests = editor.take_pending_font_requests();
        assert!(requests.iter().any(|r| r.key.starts_with("Inter#")));

        let count = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&count);
        editor.on(
            EditorEvent::LayoutChanged,
            Box::new(move |_| *seen.borrow_mut() += 1),
        );
        // Unparsable bytes error out without a relayout
        assert!(editor
            .install_font_data("Inter#Regular#Inter-Regular", vec![1, 2, 3])
            .is_err());
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn offset_mapping_roundtrips() {
        let editor = editor("ab\ncd");
        let update = editor.update_for_offset(4);
        assert_eq!(update.anchor, Some(1));
        assert_eq!(update.anchor_offset, Some(1));
        assert_eq!(editor.abs_offset(1, 1), 4);
        // The break belongs to line 0; the offset after it starts line 1
        let update = editor.update_for_offset(3);
        assert_eq!(update.anchor, Some(1));
        assert_eq!(update.anchor_offset, Some(0));
    }

    #[test]
    fn trailing_break_maps_to_phantom_line() {
        let editor = editor("ab\n");
        assert_eq!(editor.baselines().len(), 1);
        let update = editor.update_for_offset(3);
        assert_eq!(update.anchor, Some(1));
        assert_eq!(update.anchor_offset, Some(0));
        assert_eq!(editor.abs_offset(1, 0), 3);
    }

    #[test]
    fn caret_x_spans_the_line() {
        let editor = editor("ab\ncd");
        assert!((editor.caret_x(0, 0) - 0.0).abs() < 1e-4);
        assert!((editor.caret_x(0, 1) - 6.0).abs() < 1e-4);
        // Past the last slot clamps to the line end (break excluded)
        assert!((editor.caret_x(0, 2) - 12.0).abs() < 1e-4);
        assert_eq!(editor.caret_slots(0), 2);
        assert_eq!(editor.caret_slots(1), 2);
    }
}
