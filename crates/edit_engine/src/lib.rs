//! Edit Engine - the interactive editor facade
//!
//! Owns the document, the font store, the selection, and the derived
//! layout bundle. Every public mutation runs the full synchronous
//! recompute cycle (`apply`) before returning; asynchronous font arrival
//! re-runs it exactly once per delivery.
//!
//! # Modules
//!
//! - `editor`: the `Editor` type, layout cycle, font plumbing
//! - `edit`: text insertion/deletion, list autoformat
//! - `style_ops`: style application over selections, lists, indentation
//! - `select`: selection state, hit testing, click semantics
//! - `navigate`: keyboard arrow navigation
//! - `rects`: caret and selection rectangles
//! - `events`: subscription and dispatch

mod error;
mod events;
#[cfg(test)]
mod test_util;

pub mod edit;
pub mod editor;
pub mod navigate;
pub mod rects;
pub mod select;
pub mod style_ops;

pub use edit::{DeleteDirection, DeleteGranularity, DeleteOptions};
pub use editor::Editor;
pub use error::*;
pub use events::{EditorEvent, EventCallback};
pub use navigate::{ArrowDirection, ArrowModifiers};
pub use rects::Rect;
pub use select::PointModifiers;
pub use style_ops::{BaseStyleUpdate, SelectionStyles};
