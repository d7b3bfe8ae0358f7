//! Per-cluster metrics records, the shaping pipeline's output

use serde::{Deserialize, Serialize};

/// Shaping classification of a metrics record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordClass {
    Ordinary,
    Space,
    Break,
    Emoji,
}

/// One shaped character cluster
///
/// `x_advance` already includes the letter-spacing contribution. `path` is
/// an SVG outline in font units (renderers scale by
/// `font_size / units_per_em`), empty for spaces, breaks, emoji, and glyphs
/// awaiting a font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub class: RecordClass,
    pub code_points: Vec<u32>,
    pub path: String,
    pub x_advance: f32,
    pub ascent: f32,
    pub cap_height: f32,
    pub height: f32,
    pub font_size: f32,
    /// Units-per-em of the face the path was outlined with; renderers scale
    /// paths by `font_size / units_per_em`
    pub units_per_em: u16,
    pub letter_spacing: f32,
    /// Character offset of the cluster's first character
    pub first_character: usize,
    pub is_ligature: bool,
}

impl MetricsRecord {
    /// A zero-advance placeholder for a character whose font has not
    /// arrived yet
    pub fn placeholder(first_character: usize, code_points: Vec<u32>, font_size: f32) -> Self {
        Self {
            class: RecordClass::Ordinary,
            code_points,
            path: String::new(),
            x_advance: 0.0,
            ascent: font_size * 0.8,
            cap_height: font_size * 0.7,
            height: font_size,
            font_size,
            units_per_em: 1000,
            letter_spacing: 0.0,
            first_character,
            is_ligature: false,
        }
    }

    pub fn is_break(&self) -> bool {
        self.class == RecordClass::Break
    }

    pub fn is_space(&self) -> bool {
        self.class == RecordClass::Space
    }
}
