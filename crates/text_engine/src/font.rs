//! Font abstraction consumed by the shaping pipeline
//!
//! Production code implements [`FontFace`] with rustybuzz (`harf`); tests
//! substitute a deterministic face with fixed metrics so geometry assertions
//! are exact.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Face-wide metrics in font units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceMetrics {
    pub ascent: i16,
    pub descent: i16,
    pub line_gap: i16,
    pub cap_height: i16,
}

/// One shaped glyph with its advance and cluster mapping
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedGlyph {
    pub glyph_id: u32,
    /// Character offset into the shaped run this glyph starts at
    pub cluster: usize,
    /// Horizontal advance in font units
    pub x_advance: i32,
    pub x_offset: i32,
    pub y_offset: i32,
    /// Glyph outline as an SVG path in font units, empty when uncovered
    pub path: String,
}

/// OpenType feature switches assembled from the effective style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeFeatures {
    pub ligatures_disabled: bool,
    pub superscript: bool,
    pub subscript: bool,
    pub fractions: bool,
}

/// A loaded font face
///
/// All metric accessors are in font units; callers scale by
/// `font_size / units_per_em`.
pub trait FontFace: Send + Sync {
    fn family(&self) -> &str;
    fn style_name(&self) -> &str;
    fn units_per_em(&self) -> u16;
    fn metrics(&self) -> FaceMetrics;
    fn has_glyph(&self, c: char) -> bool;
    fn shape(&self, text: &str, features: &ShapeFeatures) -> Vec<ShapedGlyph>;

    /// A new face with the given variation axes applied, when supported
    fn variation(&self, axes: &BTreeMap<String, f32>) -> Option<Arc<dyn FontFace>>;

    /// A new face for a named instance (e.g. "Bold"), when supported
    fn named_instance(&self, name: &str) -> Option<Arc<dyn FontFace>>;
}

/// Scale a font-unit value to pixels for a font size
pub fn scale(value: i32, units_per_em: u16, font_size: f32) -> f32 {
    if units_per_em == 0 {
        return 0.0;
    }
    value as f32 / units_per_em as f32 * font_size
}
