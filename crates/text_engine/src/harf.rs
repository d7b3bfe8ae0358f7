//! rustybuzz-backed production implementation of [`FontFace`]

use crate::error::{Result, TextEngineError};
use crate::font::{FaceMetrics, FontFace, ShapeFeatures, ShapedGlyph};
use rustybuzz::ttf_parser;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A parsed face that owns its backing bytes.
///
/// rustybuzz borrows the font data, so the face and the `Arc` holding the
/// bytes are kept together; the transmute to `'static` is sound because the
/// data lives as long as the face and is never mutated.
struct CachedFace {
    #[allow(dead_code)]
    data: Arc<Vec<u8>>,
    face: rustybuzz::Face<'static>,
}

impl CachedFace {
    fn new(data: Arc<Vec<u8>>, variations: &[rustybuzz::Variation]) -> Result<Self> {
        let slice: &'static [u8] =
            unsafe { std::mem::transmute::<&[u8], &'static [u8]>(data.as_slice()) };
        let mut face = rustybuzz::Face::from_slice(slice, 0)
            .ok_or_else(|| TextEngineError::InvalidFontData("unparsable font".into()))?;
        face.set_variations(variations);
        Ok(Self { data, face })
    }
}

pub struct HarfFace {
    family: String,
    style_name: String,
    data: Arc<Vec<u8>>,
    variations: Vec<rustybuzz::Variation>,
    inner: CachedFace,
}

impl HarfFace {
    pub fn from_bytes(
        family: impl Into<String>,
        style_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let data = Arc::new(bytes);
        let inner = CachedFace::new(Arc::clone(&data), &[])?;
        Ok(Self {
            family: family.into(),
            style_name: style_name.into(),
            data,
            variations: Vec::new(),
            inner,
        })
    }

    fn with_variations(&self, variations: Vec<rustybuzz::Variation>) -> Result<Self> {
        let inner = CachedFace::new(Arc::clone(&self.data), &variations)?;
        Ok(Self {
            family: self.family.clone(),
            style_name: self.style_name.clone(),
            data: Arc::clone(&self.data),
            variations,
            inner,
        })
    }

    fn feature_list(features: &ShapeFeatures) -> Vec<rustybuzz::Feature> {
        use ttf_parser::Tag;
        let on = |tag: &[u8; 4]| rustybuzz::Feature::new(Tag::from_bytes(tag), 1, ..);
        let off = |tag: &[u8; 4]| rustybuzz::Feature::new(Tag::from_bytes(tag), 0, ..);

        let mut list = vec![
            on(b"kern"),
            on(b"clig"),
            on(b"rlig"),
            on(b"calt"),
            on(b"ccmp"),
            on(b"locl"),
        ];
        if features.ligatures_disabled {
            list.push(off(b"liga"));
        } else {
            list.push(on(b"liga"));
        }
        if features.superscript {
            list.push(on(b"sups"));
        }
        if features.subscript {
            list.push(on(b"subs"));
        }
        if features.fractions {
            list.push(on(b"frac"));
            list.push(on(b"numr"));
        }
        list
    }

    fn outline(&self, glyph_id: u16) -> String {
        let mut builder = SvgPathBuilder::default();
        let outlined = self
            .inner
            .face
            .outline_glyph(ttf_parser::GlyphId(glyph_id), &mut builder);
        match outlined {
            Some(_) => builder.path,
            None => String::new(),
        }
    }
}

impl FontFace for HarfFace {
    fn family(&self) -> &str {
        &self.family
    }

    fn style_name(&self) -> &str {
        &self.style_name
    }

    fn units_per_em(&self) -> u16 {
        self.inner.face.units_per_em() as u16
    }

    fn metrics(&self) -> FaceMetrics {
        let face = &self.inner.face;
        let ascent = face.ascender();
        FaceMetrics {
            ascent,
            descent: face.descender(),
            line_gap: face.line_gap(),
            // Cap height is optional in the OS/2 table; estimate from the
            // ascender when absent
            cap_height: face
                .capital_height()
                .unwrap_or_else(|| (ascent as f32 * 0.88) as i16),
        }
    }

    fn has_glyph(&self, c: char) -> bool {
        self.inner.face.glyph_index(c).is_some()
    }

    fn shape(&self, text: &str, features: &ShapeFeatures) -> Vec<ShapedGlyph> {
        let mut buffer = rustybuzz::UnicodeBuffer::new();
        for (i, c) in text.chars().enumerate() {
            // Clusters are character offsets, not byte offsets
            buffer.add(c, i as u32);
        }
        buffer.guess_segment_properties();

        let feature_list = Self::feature_list(features);
        let glyphs = rustybuzz::shape(&self.inner.face, &feature_list, buffer);

        let infos = glyphs.glyph_infos();
        let positions = glyphs.glyph_positions();
        let mut out = Vec::with_capacity(infos.len());
        for (info, pos) in infos.iter().zip(positions.iter()) {
            out.push(ShapedGlyph {
                glyph_id: info.glyph_id,
                cluster: info.cluster as usize,
                x_advance: pos.x_advance,
                x_offset: pos.x_offset,
                y_offset: pos.y_offset,
                path: self.outline(info.glyph_id as u16),
            });
        }
        out
    }

    fn variation(&self, axes: &BTreeMap<String, f32>) -> Option<Arc<dyn FontFace>> {
        if axes.is_empty() {
            return None;
        }
        let mut variations = Vec::with_capacity(axes.len());
        for (tag, &value) in axes {
            let bytes = tag.as_bytes();
            if bytes.len() != 4 {
                return None;
            }
            let tag = ttf_parser::Tag::from_bytes(&[bytes[0], bytes[1], bytes[2], bytes[3]]);
            variations.push(rustybuzz::Variation { tag, value });
        }
        match self.with_variations(variations) {
            Ok(face) => Some(Arc::new(face)),
            Err(err) => {
                tracing::warn!(error = %err, "failed to instantiate variation");
                None
            }
        }
    }

    fn named_instance(&self, name: &str) -> Option<Arc<dyn FontFace>> {
        // Weight-only mapping of the common style names; faces without a
        // wght axis just ignore the variation
        let weight = match name {
            "Thin" => 100.0,
            "ExtraLight" => 200.0,
            "Light" => 300.0,
            "Regular" => 400.0,
            "Medium" => 500.0,
            "SemiBold" => 600.0,
            "Bold" => 700.0,
            "ExtraBold" => 800.0,
            "Black" => 900.0,
            _ => return None,
        };
        let axes = BTreeMap::from([("wght".to_string(), weight)]);
        self.variation(&axes)
    }
}

/// Collects a glyph outline as an SVG path string in font units
#[derive(Default)]
struct SvgPathBuilder {
    path: String,
}

impl ttf_parser::OutlineBuilder for SvgPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.push_str(&format!("M{x} {y}"));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.push_str(&format!("L{x} {y}"));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.path.push_str(&format!("Q{x1} {y1} {x} {y}"));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.path
            .push_str(&format!("C{x1} {y1} {x2} {y2} {x} {y}"));
    }

    fn close(&mut self) {
        self.path.push('Z');
    }
}
