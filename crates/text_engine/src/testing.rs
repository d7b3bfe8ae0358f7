//! Deterministic font face for tests
//!
//! Fixed metrics (1000 upem, ascent 800, descent -200, cap height 700) and
//! a fixed 600-unit advance per character make geometry assertions exact:
//! at font size 10 every character advances 6.0 pixels.

use crate::font::{FaceMetrics, FontFace, ShapeFeatures, ShapedGlyph};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

pub const FAKE_UNITS_PER_EM: u16 = 1000;
pub const FAKE_ADVANCE: i32 = 600;
pub const FAKE_ASCENT: i16 = 800;
pub const FAKE_DESCENT: i16 = -200;
pub const FAKE_CAP_HEIGHT: i16 = 700;

#[derive(Debug, Clone, Default)]
pub struct FakeFace {
    missing: HashSet<char>,
}

impl FakeFace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A face that reports no glyph for the given characters
    pub fn with_missing(missing: impl IntoIterator<Item = char>) -> Self {
        Self {
            missing: missing.into_iter().collect(),
        }
    }
}

impl FontFace for FakeFace {
    fn family(&self) -> &str {
        "Fake"
    }

    fn style_name(&self) -> &str {
        "Regular"
    }

    fn units_per_em(&self) -> u16 {
        FAKE_UNITS_PER_EM
    }

    fn metrics(&self) -> FaceMetrics {
        FaceMetrics {
            ascent: FAKE_ASCENT,
            descent: FAKE_DESCENT,
            line_gap: 0,
            cap_height: FAKE_CAP_HEIGHT,
        }
    }

    fn has_glyph(&self, c: char) -> bool {
        !self.missing.contains(&c) && !c.is_control()
    }

    fn shape(&self, text: &str, _features: &ShapeFeatures) -> Vec<ShapedGlyph> {
        text.chars()
            .enumerate()
            .map(|(i, c)| ShapedGlyph {
                glyph_id: c as u32,
                cluster: i,
                x_advance: FAKE_ADVANCE,
                x_offset: 0,
                y_offset: 0,
                path: if self.has_glyph(c) {
                    "M0 0L600 0L600 700L0 700Z".to_string()
                } else {
                    String::new()
                },
            })
            .collect()
    }

    fn variation(&self, _axes: &BTreeMap<String, f32>) -> Option<Arc<dyn FontFace>> {
        Some(Arc::new(self.clone()))
    }

    fn named_instance(&self, _name: &str) -> Option<Arc<dyn FontFace>> {
        Some(Arc::new(self.clone()))
    }
}
