//! Per-character horizontal offsets within baselines
//!
//! For every character offset, the cumulative advance from its baseline's
//! left edge to the character's left side. Hit testing and caret placement
//! read this table instead of re-walking metrics records. Characters inside
//! a multi-character cluster (ligature, emoji) interpolate the cluster's
//! advance evenly.

use crate::baseline::BaselineLayout;

/// Offsets indexed by character offset; length equals the buffer length.
pub fn compute(layout: &BaselineLayout, char_len: usize) -> Vec<f32> {
    let mut offsets = vec![0.0; char_len];
    for line in &layout.lines {
        let mut acc = line.paragraph_indent;
        for r in &line.records {
            let span = r.code_points.len().max(1);
            let step = r.x_advance / span as f32;
            for k in 0..span {
                let idx = r.first_character + k;
                if idx < char_len {
                    offsets[idx] = acc + step * k as f32;
                }
            }
            acc += r.x_advance;
        }
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline;
    use crate::wrap::wrap;
    use std::sync::Arc;
    use text_engine::testing::FakeFace;
    use text_engine::{compute_metrics, FontStore};
    use text_model::{FontName, TextData, TextStyle};

    fn layout(text: &str, width: Option<f32>) -> (TextData, BaselineLayout) {
        let mut style = TextStyle::default();
        style.font_size = 10.0;
        let data = TextData::new(text, style);
        let mut store = FontStore::new();
        store.install_face(
            FontName::new("Inter", "Regular").cache_key(),
            Arc::new(FakeFace::new()),
        );
        let metrics = compute_metrics(&data, &mut store);
        let lines = wrap(&data, &metrics, width);
        let out = baseline::compute(&data, lines, width, None);
        (data, out)
    }

    #[test]
    fn offsets_accumulate_per_line() {
        let (data, out) = layout("ab\ncd", None);
        let offsets = compute(&out, data.char_len());
        assert_eq!(offsets.len(), 5);
        assert!((offsets[0] - 0.0).abs() < 1e-4);
        assert!((offsets[1] - 6.0).abs() < 1e-4);
        // Break sits after "ab"
        assert!((offsets[2] - 12.0).abs() < 1e-4);
        // Second line restarts at zero
        assert!((offsets[3] - 0.0).abs() < 1e-4);
        assert!((offsets[4] - 6.0).abs() < 1e-4);
    }

    #[test]
    fn emoji_cluster_interpolates() {
        let family = "\u{1f468}\u{200d}\u{1f469}\u{200d}\u{1f466}";
        let (data, out) = layout(&format!("a{family}"), None);
        let offsets = compute(&out, data.char_len());
        // Cluster advance 10 over 5 characters = 2 per character
        assert!((offsets[1] - 6.0).abs() < 1e-4);
        assert!((offsets[2] - 8.0).abs() < 1e-4);
        assert!((offsets[5] - 14.0).abs() < 1e-4);
    }

    #[test]
    fn paragraph_indent_shifts_first_line() {
        let mut style = TextStyle::default();
        style.font_size = 10.0;
        style.paragraph_indent = 9.0;
        let data = TextData::new("ab", style);
        let mut store = FontStore::new();
        store.install_face(
            FontName::new("Inter", "Regular").cache_key(),
            Arc::new(FakeFace::new()),
        );
        let metrics = compute_metrics(&data, &mut store);
        let lines = wrap(&data, &metrics, Some(100.0));
        let out = baseline::compute(&data, lines, Some(100.0), None);
        let offsets = compute(&out, data.char_len());
        assert!((offsets[0] - 9.0).abs() < 1e-4);
        assert!((offsets[1] - 15.0).abs() < 1e-4);
    }
}
