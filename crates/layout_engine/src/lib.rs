//! Layout Engine - line breaking, baseline geometry, and glyph assembly
//!
//! Consumes the metrics-record sequence and produces the derived bundle the
//! editor exposes: wrapped physical lines, baseline geometry (alignment,
//! indentation, paragraph spacing, justification, truncation), positioned
//! glyphs including list markers, and per-character horizontal offsets for
//! hit testing.
//!
//! # Modules
//!
//! - `wrap`: word grouping and greedy line wrapping
//! - `justify`: slack redistribution for justified lines
//! - `baseline`: vertical/horizontal baseline placement
//! - `glyphs`: positioned render primitives, markers, truncation
//! - `decorations`: underline and strikethrough rectangles
//! - `offsets`: cumulative per-character advances within baselines
//! - `cache`: the derived-data bundle and its invalidation tiers

pub mod baseline;
pub mod cache;
pub mod decorations;
pub mod glyphs;
pub mod justify;
pub mod offsets;
pub mod wrap;

pub use baseline::{Baseline, BaselineLayout};
pub use cache::DerivedData;
pub use glyphs::{Glyph, GlyphOutput};
pub use wrap::{indentation_px, wrap, WrappedLine};
