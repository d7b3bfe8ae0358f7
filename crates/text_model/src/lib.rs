//! Text Model - character buffer, logical lines, and style overrides
//!
//! This crate owns the persistent state of a rich-text element: the
//! character buffer, the `\n`-delimited logical-line table with its list
//! metadata, the base style, and the sparse per-character style-override
//! table. Everything else in the engine (shaping, layout, selection
//! geometry) is derived from this state.
//!
//! # Modules
//!
//! - `style`: base style, partial overrides, and the field/invalidation table
//! - `text_data`: the buffer + parallel tables and their edit helpers
//! - `override_store`: range application and canonicalization of overrides
//! - `selection`: baseline-relative anchor/focus selection state
//! - `list`: list marker text generation (numerals, letters, romans, bullet)
//! - `tokenize`: grapheme segmentation and selection word grouping
//! - `case`: text-case transforms applied before shaping

mod selection;
mod style;
mod text_data;

pub mod case;
pub mod list;
pub mod override_store;
pub mod tokenize;

pub use selection::*;
pub use style::*;
pub use text_data::*;

pub use list::marker_content;
