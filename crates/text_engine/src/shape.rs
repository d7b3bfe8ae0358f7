//! The shaping pipeline: buffer + styles -> ordered metrics records
//!
//! Tokenization isolates explicit breaks and emoji clusters and groups the
//! rest into runs of uniform style id. Each run resolves its font through
//! the store; characters the style font cannot cover re-resolve through the
//! script-detected fallback chain. Fonts that are not loaded yet produce
//! placeholder records and enqueue asynchronous requests; the caller re-runs
//! the pipeline when the data arrives.

use crate::emoji::is_emoji_grapheme;
use crate::font::{scale, FontFace, ShapeFeatures};
use crate::metrics::{MetricsRecord, RecordClass};
use crate::store::FontStore;
use std::collections::HashMap;
use text_model::tokenize::{graphemes, Grapheme};
use text_model::{case, FontPosition, StyleId, TextData, TextStyle, Toggle, BASE_STYLE_ID};

/// Width estimate for a character whose font is unavailable, as a fraction
/// of the em
const ESTIMATED_ADVANCE_RATIO: f32 = 0.6;

/// Compute the full metrics-record sequence for a document
pub fn compute_metrics(data: &TextData, store: &mut FontStore) -> Vec<MetricsRecord> {
    // Resolve each distinct style id once
    let mut styles: HashMap<StyleId, TextStyle> = HashMap::new();
    styles.insert(BASE_STYLE_ID, data.style.clone());
    for (&id, over) in &data.style_overrides {
        styles.insert(id, data.style.with_override(over));
    }
    let style_of = |offset: usize| -> &TextStyle {
        let id = data
            .character_style_ids
            .get(offset)
            .copied()
            .unwrap_or(BASE_STYLE_ID);
        styles.get(&id).unwrap_or(&data.style)
    };

    let transformed = case::apply_case(&data.characters, |i| style_of(i).text_case);

    let mut records = Vec::new();
    let clusters = graphemes(&transformed);
    let mut i = 0;
    while i < clusters.len() {
        let g = clusters[i];
        if g.text == "\n" {
            records.push(break_record(g.start, style_of(g.start), store));
            i += 1;
            continue;
        }
        if is_emoji_grapheme(g.text) {
            records.push(emoji_record(&g, style_of(g.start)));
            i += 1;
            continue;
        }

        // A run: consecutive non-break non-emoji graphemes with one style id
        let run_id = id_at(data, g.start);
        let run_start = i;
        let mut run_end = i + 1;
        while run_end < clusters.len() {
            let next = clusters[run_end];
            if next.text == "\n"
                || is_emoji_grapheme(next.text)
                || id_at(data, next.start) != run_id
            {
                break;
            }
            run_end += 1;
        }
        let style = style_of(g.start).clone();
        shape_run(
            &clusters[run_start..run_end],
            &style,
            store,
            &mut records,
        );
        i = run_end;
    }
    records
}

fn id_at(data: &TextData, offset: usize) -> StyleId {
    data.character_style_ids
        .get(offset)
        .copied()
        .unwrap_or(BASE_STYLE_ID)
}

fn features_for(style: &TextStyle) -> ShapeFeatures {
    ShapeFeatures {
        ligatures_disabled: style.font_ligatures == Toggle::Disable,
        superscript: style.font_position == FontPosition::Super,
        subscript: style.font_position == FontPosition::Sub,
        fractions: style.font_numeric_fraction == Toggle::Enable,
    }
}

fn break_record(offset: usize, style: &TextStyle, store: &mut FontStore) -> MetricsRecord {
    let (ascent, cap_height, height) =
        match store.resolve_style_font(&style.font_name, &style.font_variations) {
            Some(face) => vertical_metrics(face.as_ref(), style.font_size),
            None => estimated_vertical_metrics(style.font_size),
        };
    MetricsRecord {
        class: RecordClass::Break,
        code_points: vec!['\n' as u32],
        path: String::new(),
        x_advance: 0.0,
        ascent,
        cap_height,
        height,
        font_size: style.font_size,
        units_per_em: 1000,
        letter_spacing: 0.0,
        first_character: offset,
        is_ligature: false,
    }
}

fn emoji_record(g: &Grapheme<'_>, style: &TextStyle) -> MetricsRecord {
    // Emoji occupy a square cell sized by the font
    MetricsRecord {
        class: RecordClass::Emoji,
        code_points: g.text.chars().map(|c| c as u32).collect(),
        path: String::new(),
        x_advance: style.font_size + style.letter_spacing_px(),
        ascent: style.font_size,
        cap_height: style.font_size,
        height: style.font_size,
        font_size: style.font_size,
        units_per_em: 1000,
        letter_spacing: style.letter_spacing_px(),
        first_character: g.start,
        is_ligature: false,
    }
}

fn shape_run(
    run: &[Grapheme<'_>],
    style: &TextStyle,
    store: &mut FontStore,
    out: &mut Vec<MetricsRecord>,
) {
    let face = store.resolve_style_font(&style.font_name, &style.font_variations);
    let face = match face {
        Some(face) => face,
        None => {
            // Zero-advance placeholders until the font arrives
            for g in run {
                let mut record = MetricsRecord::placeholder(
                    g.start,
                    g.text.chars().map(|c| c as u32).collect(),
                    style.font_size,
                );
                if g.text == " " {
                    record.class = RecordClass::Space;
                }
                out.push(record);
            }
            return;
        }
    };

    // Partition by coverage so uncovered characters go through fallback
    let mut segment: Vec<Grapheme<'_>> = Vec::new();
    for &g in run {
        let covered = g.text.chars().all(|c| face.has_glyph(c));
        if covered {
            segment.push(g);
            continue;
        }
        flush_segment(&segment, face.as_ref(), style, out);
        segment.clear();
        shape_uncovered(&g, style, store, out);
    }
    flush_segment(&segment, face.as_ref(), style, out);
}

fn shape_uncovered(
    g: &Grapheme<'_>,
    style: &TextStyle,
    store: &mut FontStore,
    out: &mut Vec<MetricsRecord>,
) {
    let first = match g.text.chars().next() {
        Some(c) => c,
        None => return,
    };
    match store.resolve_fallback(first, style) {
        Some(fallback) => flush_segment(&[*g], fallback.as_ref(), style, out),
        None => {
            // Keep the advance so surrounding layout is stable, but render
            // nothing until the fallback arrives
            let per_char = style.font_size * ESTIMATED_ADVANCE_RATIO;
            let (ascent, cap_height, height) = estimated_vertical_metrics(style.font_size);
            out.push(MetricsRecord {
                class: RecordClass::Ordinary,
                code_points: g.text.chars().map(|c| c as u32).collect(),
                path: String::new(),
                x_advance: per_char * (g.end - g.start) as f32 + style.letter_spacing_px(),
                ascent,
                cap_height,
                height,
                font_size: style.font_size,
                units_per_em: 1000,
                letter_spacing: style.letter_spacing_px(),
                first_character: g.start,
                is_ligature: false,
            });
        }
    }
}

fn flush_segment(
    segment: &[Grapheme<'_>],
    face: &dyn FontFace,
    style: &TextStyle,
    out: &mut Vec<MetricsRecord>,
) {
    if segment.is_empty() {
        return;
    }
    let global_start = segment[0].start;
    let text: String = segment.iter().map(|g| g.text).collect();
    let chars: Vec<char> = text.chars().collect();
    let glyphs = face.shape(&text, &features_for(style));
    let upem = face.units_per_em();
    let (ascent, cap_height, height) = vertical_metrics(face, style.font_size);
    let spacing = style.letter_spacing_px();

    let mut gi = 0;
    while gi < glyphs.len() {
        let glyph = &glyphs[gi];
        // Glyphs sharing a cluster belong to one record; the cluster span
        // runs to the next distinct cluster value
        let cluster = glyph.cluster;
        let mut advance = glyph.x_advance;
        let mut path = glyph.path.clone();
        let mut gj = gi + 1;
        while gj < glyphs.len() && glyphs[gj].cluster == cluster {
            advance += glyphs[gj].x_advance;
            path.push_str(&glyphs[gj].path);
            gj += 1;
        }
        let span_end = if gj < glyphs.len() {
            glyphs[gj].cluster
        } else {
            chars.len()
        };
        let lo = cluster.min(chars.len().saturating_sub(1));
        let hi = span_end.min(chars.len()).max(lo + 1);
        let span = &chars[lo..hi];
        let is_space = span.len() == 1 && span[0] == ' ';

        out.push(MetricsRecord {
            class: if is_space {
                RecordClass::Space
            } else {
                RecordClass::Ordinary
            },
            code_points: span.iter().map(|&c| c as u32).collect(),
            path,
            x_advance: scale(advance, upem, style.font_size) + spacing,
            ascent,
            cap_height,
            height,
            font_size: style.font_size,
            units_per_em: upem,
            letter_spacing: spacing,
            first_character: global_start + cluster,
            is_ligature: span_end.saturating_sub(cluster) > 1,
        });
        gi = gj;
    }
}

fn vertical_metrics(face: &dyn FontFace, font_size: f32) -> (f32, f32, f32) {
    let m = face.metrics();
    let upem = face.units_per_em();
    let ascent = scale(m.ascent as i32, upem, font_size);
    let cap_height = scale(m.cap_height as i32, upem, font_size);
    let height = scale(m.ascent as i32 - m.descent as i32, upem, font_size);
    (ascent, cap_height, height)
}

fn estimated_vertical_metrics(font_size: f32) -> (f32, f32, f32) {
    (font_size * 0.8, font_size * 0.7, font_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFace;
    use proptest::prelude::*;
    use std::sync::Arc;
    use text_model::FontName;

    fn store_with_default_font() -> FontStore {
        let mut store = FontStore::new();
        let key = FontName::new("Inter", "Regular").cache_key();
        store.install_face(key, Arc::new(FakeFace::new()));
        store
    }

    fn doc(text: &str) -> TextData {
        let mut style = TextStyle::default();
        style.font_size = 10.0;
        TextData::new(text, style)
    }

    #[test]
    fn one_record_per_character_with_fixed_advance() {
        let mut store = store_with_default_font();
        let records = compute_metrics(&doc("ab cd"), &mut store);
        assert_eq!(records.len(), 5);
        for r in &records {
            assert!((r.x_advance - 6.0).abs() < 1e-4);
        }
        assert_eq!(records[2].class, RecordClass::Space);
        assert_eq!(records[3].first_character, 3);
        assert!((records[0].ascent - 8.0).abs() < 1e-4);
        assert!((records[0].height - 10.0).abs() < 1e-4);
    }

    #[test]
    fn breaks_are_isolated_zero_advance() {
        let mut store = store_with_default_font();
        let records = compute_metrics(&doc("a\nb"), &mut store);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].class, RecordClass::Break);
        assert_eq!(records[1].x_advance, 0.0);
        assert_eq!(records[1].first_character, 1);
    }

    #[test]
    fn emoji_collapse_to_square_cell() {
        let mut store = store_with_default_font();
        let family = "\u{1f468}\u{200d}\u{1f469}\u{200d}\u{1f466}";
        let records = compute_metrics(&doc(&format!("a{family}b")), &mut store);
        assert_eq!(records.len(), 3);
        let emoji = &records[1];
        assert_eq!(emoji.class, RecordClass::Emoji);
        assert_eq!(emoji.code_points.len(), 5);
        assert!((emoji.x_advance - 10.0).abs() < 1e-4);
        assert!(emoji.path.is_empty());
        // The character after the cluster keeps its buffer offset
        assert_eq!(records[2].first_character, 6);
    }

    #[test]
    fn missing_font_yields_placeholders_and_request() {
        let mut store = FontStore::new();
        let records = compute_metrics(&doc("ab"), &mut store);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].x_advance, 0.0);
        assert!(records[0].path.is_empty());
        let requests = store.take_pending_font_requests();
        assert_eq!(requests.len(), 1);
    }

    #[test]
    fn uncovered_character_keeps_estimated_advance() {
        let mut store = FontStore::new();
        let key = FontName::new("Inter", "Regular").cache_key();
        store.install_face(key, Arc::new(FakeFace::with_missing(['\u{d55c}'])));

        let records = compute_metrics(&doc("a\u{d55c}b"), &mut store);
        assert_eq!(records.len(), 3);
        // Fallback not loaded: path suppressed, advance estimated
        assert!(records[1].path.is_empty());
        assert!((records[1].x_advance - 6.0).abs() < 1e-4);
        // And the korean fallback resource was requested
        let requests = store.take_pending_font_requests();
        assert!(requests.iter().any(|r| r.key == "noto-sans-cjk-kr"));
    }

    #[test]
    fn letter_spacing_adds_to_each_advance() {
        let mut store = store_with_default_font();
        let mut data = doc("ab");
        data.style.letter_spacing = text_model::LetterSpacing {
            value: 10.0,
            unit: text_model::SpacingUnit::Percent,
        };
        let records = compute_metrics(&data, &mut store);
        // 6.0 shape advance + 1.0 spacing at size 10
        assert!((records[0].x_advance - 7.0).abs() < 1e-4);
    }

    #[test]
    fn override_splits_shaping_runs() {
        let mut store = store_with_default_font();
        let mut data = doc("abcd");
        let mut over = text_model::StyleOverride::new();
        over.font_size = Some(20.0);
        text_model::override_store::apply_style(&mut data, 0, 2, &over);

        let records = compute_metrics(&data, &mut store);
        assert_eq!(records.len(), 4);
        assert!((records[0].x_advance - 12.0).abs() < 1e-4);
        assert!((records[2].x_advance - 6.0).abs() < 1e-4);
    }

    #[test]
    fn text_case_transform_feeds_shaping() {
        let mut store = store_with_default_font();
        let mut data = doc("ab");
        data.style.text_case = text_model::TextCase::Upper;
        let records = compute_metrics(&data, &mut store);
        assert_eq!(records[0].code_points, vec!['A' as u32]);
        assert_eq!(records[1].code_points, vec!['B' as u32]);
    }

    proptest! {
        #[test]
        fn records_cover_the_buffer_in_order(text in "[a-z \n]{1,40}") {
            let mut store = store_with_default_font();
            let records = compute_metrics(&doc(&text), &mut store);
            prop_assert_eq!(records.len(), text.chars().count());
            for (i, r) in records.iter().enumerate() {
                prop_assert_eq!(r.first_character, i);
            }
            let breaks = records.iter().filter(|r| r.is_break()).count();
            prop_assert_eq!(breaks, text.matches('\n').count());
        }
    }
}
