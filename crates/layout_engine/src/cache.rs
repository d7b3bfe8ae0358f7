//! The derived-data bundle and its invalidation tiers
//!
//! Everything below the persistent document state is derived and cached
//! here between mutations. A style mutation computes the tightest tier
//! covering the fields it touched and clears only the layers that tier
//! invalidates: `Paint` keeps all cached layers (only draw data changed),
//! `Metrics` keeps shaped metrics but redoes geometry, `All` reshapes.

use crate::baseline::Baseline;
use crate::glyphs::Glyph;
use crate::wrap::WrappedLine;
use text_engine::MetricsRecord;
use text_model::{InvalidationTier, StyleField};

#[derive(Debug, Clone, Default)]
pub struct DerivedData {
    /// Shaped metrics, memoized until an `All` invalidation
    pub metrics: Option<Vec<MetricsRecord>>,
    pub baselines: Vec<Baseline>,
    /// Wrapped lines aligned with `baselines`
    pub lines: Vec<WrappedLine>,
    pub glyphs: Vec<Glyph>,
    pub decoration_rects: Vec<[f32; 4]>,
    pub logical_character_offsets: Vec<f32>,
    pub content_width: f32,
    pub content_height: f32,
}

impl DerivedData {
    /// Clear the layers invalidated by `tier`
    pub fn invalidate(&mut self, tier: InvalidationTier) {
        match tier {
            InvalidationTier::Paint => {}
            InvalidationTier::Metrics => self.clear_geometry(),
            InvalidationTier::All => {
                self.metrics = None;
                self.clear_geometry();
            }
        }
    }

    fn clear_geometry(&mut self) {
        self.baselines.clear();
        self.lines.clear();
        self.glyphs.clear();
        self.decoration_rects.clear();
        self.logical_character_offsets.clear();
        self.content_width = 0.0;
        self.content_height = 0.0;
    }
}

/// The tightest tier covering a set of touched fields
pub fn tier_for(fields: &[StyleField]) -> InvalidationTier {
    fields
        .iter()
        .map(|f| f.invalidation())
        .max()
        .unwrap_or(InvalidationTier::Paint)
}
