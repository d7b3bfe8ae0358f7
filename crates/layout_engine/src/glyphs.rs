//! Glyph assembly: baselines + metrics -> positioned render primitives
//!
//! Regular clusters map to one positioned glyph each. Emoji carry their
//! cluster codepoints and an explicit square cell instead of an outline.
//! List markers are synthesized once per logical line, placed left of the
//! line's text, and fall back to the embedded marker glyph set when the
//! resolved font lacks coverage. Truncation appends an ellipsis at the cut.

use crate::baseline::BaselineLayout;
use crate::wrap::{indentation_px, list_head_line};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use text_engine::marker_font::{self, MARKER_UNITS_PER_EM};
use text_engine::{FontFace, FontStore, ShapeFeatures};
use text_model::{marker_content, StyleId, TextData, TextStyle, BASE_STYLE_ID};

const ELLIPSIS: char = '\u{2026}';

/// A positioned render primitive in element-local coordinates
///
/// Buffer glyphs carry `first_character`/`x_advance`/`style_id`; synthetic
/// glyphs (list markers, the truncation ellipsis) leave them `None`. Emoji
/// glyphs have an empty path and carry the cluster codepoints plus a
/// bounding rect for the renderer to fill with a raster cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub path: String,
    pub position: (f32, f32),
    pub font_size: f32,
    pub units_per_em: u16,
    pub first_character: Option<usize>,
    pub x_advance: Option<f32>,
    pub style_id: Option<StyleId>,
    pub emoji_code_points: Option<Vec<u32>>,
    pub emoji_rect: Option<[f32; 4]>,
}

impl Glyph {
    fn synthetic(path: String, position: (f32, f32), font_size: f32, units_per_em: u16) -> Self {
        Self {
            path,
            position,
            font_size,
            units_per_em,
            first_character: None,
            x_advance: None,
            style_id: None,
            emoji_code_points: None,
            emoji_rect: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphOutput {
    pub glyphs: Vec<Glyph>,
}

/// Assemble positioned glyphs for a computed baseline layout
pub fn assemble(data: &TextData, layout: &BaselineLayout, store: &mut FontStore) -> GlyphOutput {
    let mut glyphs = Vec::new();

    for (baseline, line) in layout.baselines.iter().zip(layout.lines.iter()) {
        let mut x = baseline.position.0 + line.paragraph_indent;
        let y = baseline.position.1;
        for r in &line.records {
            match r.class {
                text_engine::RecordClass::Break => {}
                text_engine::RecordClass::Space => {
                    x += r.x_advance;
                }
                text_engine::RecordClass::Emoji => {
                    glyphs.push(Glyph {
                        path: String::new(),
                        position: (x, y),
                        font_size: r.font_size,
                        units_per_em: r.units_per_em,
                        first_character: Some(r.first_character),
                        x_advance: Some(r.x_advance),
                        style_id: Some(style_id_at(data, r.first_character)),
                        emoji_code_points: Some(r.code_points.clone()),
                        emoji_rect: Some([x, y - r.font_size, r.font_size, r.font_size]),
                    });
                    x += r.x_advance;
                }
                text_engine::RecordClass::Ordinary => {
                    glyphs.push(Glyph {
                        path: r.path.clone(),
                        position: (x, y),
                        font_size: r.font_size,
                        units_per_em: r.units_per_em,
                        first_character: Some(r.first_character),
                        x_advance: Some(r.x_advance),
                        style_id: Some(style_id_at(data, r.first_character)),
                        emoji_code_points: None,
                        emoji_rect: None,
                    });
                    x += r.x_advance;
                }
            }
        }
    }

    assemble_markers(data, layout, store, &mut glyphs);

    if layout.truncation.is_some() {
        if let (Some(baseline), Some(line)) =
            (layout.baselines.last(), layout.lines.last())
        {
            let style = data.style_at(baseline.first_character);
            let x = baseline.position.0 + line.paragraph_indent + line.width();
            push_text_glyphs(
                &ELLIPSIS.to_string(),
                &style,
                (x, baseline.position.1),
                store,
                &mut glyphs,
            );
        }
    }

    GlyphOutput { glyphs }
}

fn style_id_at(data: &TextData, offset: usize) -> StyleId {
    data.character_style_ids
        .get(offset)
        .copied()
        .unwrap_or(BASE_STYLE_ID)
}

fn assemble_markers(
    data: &TextData,
    layout: &BaselineLayout,
    store: &mut FontStore,
    glyphs: &mut Vec<Glyph>,
) {
    let starts = data.line_start_offsets();
    for (li, line_record) in data.lines.iter().enumerate() {
        if !line_record.kind.is_list() {
            continue;
        }
        let marker = match marker_content(data, li) {
            Some(marker) => marker,
            None => continue,
        };
        let head = list_head_line(data, li);
        let head_start = starts.get(head).copied().unwrap_or(0);
        let style = data.style_at(head_start);

        // The first baseline of this logical line carries the marker; a
        // trailing break's phantom line synthesizes its own geometry
        let slot = layout
            .lines
            .iter()
            .position(|l| l.logical_line == li && l.starts_paragraph);
        let (line_x, baseline_y) = match slot {
            Some(i) => {
                let b = &layout.baselines[i];
                (b.position.0, b.position.1)
            }
            None => {
                if !phantom_line_is(data, li) {
                    continue;
                }
                let bottom = layout
                    .baselines
                    .last()
                    .map(|b| b.line_y + b.line_height)
                    .unwrap_or(0.0);
                (
                    indentation_px(data, li),
                    bottom + style.font_size * 0.8,
                )
            }
        };

        let width = marker_width(&marker, &style, store);
        let x = line_x - width - style.font_size / 4.0;
        push_marker_glyphs(&marker, &style, (x, baseline_y), store, glyphs);
    }
}

/// Whether `li` is the empty trailing logical line after a final break
fn phantom_line_is(data: &TextData, li: usize) -> bool {
    data.characters.ends_with('\n') && li + 1 == data.lines.len()
}

fn marker_face(style: &TextStyle, store: &mut FontStore) -> Option<Arc<dyn FontFace>> {
    store.resolve_style_font(&style.font_name, &style.font_variations)
}

fn marker_width(marker: &str, style: &TextStyle, store: &mut FontStore) -> f32 {
    let face = marker_face(style, store);
    marker
        .chars()
        .map(|c| char_advance(c, face.as_deref(), style.font_size))
        .sum()
}

fn char_advance(c: char, face: Option<&dyn FontFace>, font_size: f32) -> f32 {
    if let Some(face) = face {
        if face.has_glyph(c) {
            let shaped = face.shape(&c.to_string(), &ShapeFeatures::default());
            let units: i32 = shaped.iter().map(|g| g.x_advance).sum();
            return text_engine::scale(units, face.units_per_em(), font_size);
        }
    }
    match marker_font::marker_glyph(c) {
        Some(g) => text_engine::scale(g.advance, MARKER_UNITS_PER_EM, font_size),
        None => 0.0,
    }
}

fn push_marker_glyphs(
    marker: &str,
    style: &TextStyle,
    origin: (f32, f32),
    store: &mut FontStore,
    out: &mut Vec<Glyph>,
) {
    let face = marker_face(style, store);
    let mut x = origin.0;
    for c in marker.chars() {
        let advance = char_advance(c, face.as_deref(), style.font_size);
        let covered = face.as_deref().map(|f| f.has_glyph(c)).unwrap_or(false);
        if covered {
            if let Some(face) = face.as_deref() {
                for g in face.shape(&c.to_string(), &ShapeFeatures::default()) {
                    out.push(Glyph::synthetic(
                        g.path,
                        (x, origin.1),
                        style.font_size,
                        face.units_per_em(),
                    ));
                }
            }
        } else if let Some(g) = marker_font::marker_glyph(c) {
            out.push(Glyph::synthetic(
                g.path.to_string(),
                (x, origin.1),
                style.font_size,
                MARKER_UNITS_PER_EM,
            ));
        } else {
            tracing::warn!(character = %c, "no glyph available for list marker");
        }
        x += advance;
    }
}

fn push_text_glyphs(
    text: &str,
    style: &TextStyle,
    origin: (f32, f32),
    store: &mut FontStore,
    out: &mut Vec<Glyph>,
) {
    let face = match store.resolve_style_font(&style.font_name, &style.font_variations) {
        Some(face) => face,
        None => return,
    };
    let mut x = origin.0;
    for g in face.shape(text, &ShapeFeatures::default()) {
        out.push(Glyph::synthetic(
            g.path,
            (x, origin.1),
            style.font_size,
            face.units_per_em(),
        ));
        x += text_engine::scale(g.x_advance, face.units_per_em(), style.font_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline;
    use crate::wrap::wrap;
    use text_engine::compute_metrics;
    use text_engine::testing::FakeFace;
    use text_model::{AutoResize, FontName, LineKind, Toggle};

    fn store() -> FontStore {
        let mut store = FontStore::new();
        store.install_face(
            FontName::new("Inter", "Regular").cache_key(),
            Arc::new(FakeFace::new()),
        );
        store
    }

    fn doc(text: &str) -> TextData {
        let mut style = TextStyle::default();
        style.font_size = 10.0;
        TextData::new(text, style)
    }

    fn run(data: &TextData, w: Option<f32>, h: Option<f32>) -> GlyphOutput {
        let mut s = store();
        let metrics = compute_metrics(data, &mut s);
        let lines = wrap(data, &metrics, w);
        let layout = baseline::compute(data, lines, w, h);
        assemble(data, &layout, &mut s)
    }

    #[test]
    fn one_glyph_per_visible_character() {
        let out = run(&doc("ab cd"), None, None);
        // Spaces emit no glyph
        assert_eq!(out.glyphs.len(), 4);
        assert_eq!(out.glyphs[0].first_character, Some(0));
        assert_eq!(out.glyphs[2].first_character, Some(3));
        // Third visible glyph starts after "ab " = 18px
        assert!((out.glyphs[2].position.0 - 18.0).abs() < 1e-4);
        assert!(!out.glyphs[0].path.is_empty());
    }

    #[test]
    fn emoji_get_rect_and_codepoints() {
        let out = run(&doc("a\u{1f600}"), None, None);
        assert_eq!(out.glyphs.len(), 2);
        let emoji = &out.glyphs[1];
        assert_eq!(emoji.emoji_code_points.as_deref(), Some(&[0x1f600u32][..]));
        let rect = emoji.emoji_rect.unwrap();
        assert!((rect[0] - 6.0).abs() < 1e-4);
        assert!((rect[2] - 10.0).abs() < 1e-4);
        assert!(emoji.path.is_empty());
    }

    #[test]
    fn unordered_list_emits_bullet_marker() {
        let mut data = doc("item");
        data.lines[0].kind = LineKind::UnorderedList;
        data.lines[0].indentation_level = 1;
        data.fix_lines();
        let out = run(&data, None, None);
        // 4 text glyphs + 1 bullet
        assert_eq!(out.glyphs.len(), 5);
        let marker = out
            .glyphs
            .iter()
            .find(|g| g.first_character.is_none())
            .unwrap();
        // Marker sits left of the indented line start (15px)
        assert!(marker.position.0 < 15.0);
    }

    #[test]
    fn ordered_markers_render_ordinals() {
        let mut data = doc("a\nb\nc");
        for line in data.lines.iter_mut() {
            line.kind = LineKind::OrderedList;
            line.indentation_level = 1;
        }
        data.fix_lines();
        let out = run(&data, None, None);
        // 3 text glyphs + 3 markers of "N." = 2 glyphs each
        let markers: Vec<&Glyph> = out
            .glyphs
            .iter()
            .filter(|g| g.first_character.is_none())
            .collect();
        assert_eq!(markers.len(), 6);
    }

    #[test]
    fn phantom_trailing_list_line_gets_marker() {
        let mut data = doc("a\n");
        for line in data.lines.iter_mut() {
            line.kind = LineKind::UnorderedList;
            line.indentation_level = 1;
        }
        data.fix_lines();
        let out = run(&data, None, None);
        let markers: Vec<&Glyph> = out
            .glyphs
            .iter()
            .filter(|g| g.first_character.is_none())
            .collect();
        assert_eq!(markers.len(), 2);
        // The phantom marker sits one line below the first
        assert!(markers[1].position.1 > markers[0].position.1);
    }

    #[test]
    fn truncation_appends_ellipsis() {
        let mut data = doc("aaa\nbbb\nccc");
        data.style.text_auto_resize = AutoResize::None;
        data.style.text_truncation = Toggle::Enable;
        data.style.max_lines = 1;
        let out = run(&data, Some(100.0), Some(100.0));
        // 3 glyphs for "aaa" + ellipsis
        assert_eq!(out.glyphs.len(), 4);
        let ellipsis = out.glyphs.last().unwrap();
        assert!(ellipsis.first_character.is_none());
        assert!((ellipsis.position.0 - 18.0).abs() < 1e-4);
    }
}
