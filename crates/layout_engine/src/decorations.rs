//! Text-decoration geometry
//!
//! Underline and strikethrough rectangles in element-local coordinates,
//! one per run of adjacent same-decoration records on a physical line.
//! Underlines sit a tenth of an em below the baseline, strikethroughs
//! three tenths above it; both are one twenty-fourth of the line height
//! thick.

use crate::baseline::{Baseline, BaselineLayout};
use text_model::{TextData, TextDecoration};

/// Assemble decoration rectangles for a computed baseline layout
pub fn compute(data: &TextData, layout: &BaselineLayout) -> Vec<[f32; 4]> {
    let mut rects = Vec::new();
    for (baseline, line) in layout.baselines.iter().zip(layout.lines.iter()) {
        let mut x = baseline.position.0 + line.paragraph_indent;
        let mut run: Option<Run> = None;
        for r in &line.records {
            if r.is_break() {
                continue;
            }
            let decoration = data.style_at(r.first_character).text_decoration;
            match run.as_mut() {
                Some(open) if open.decoration == decoration && open.font_size == r.font_size => {
                    open.x1 = x + r.x_advance;
                }
                _ => {
                    flush(&mut rects, run.take(), baseline);
                    run = Some(Run {
                        x0: x,
                        x1: x + r.x_advance,
                        decoration,
                        font_size: r.font_size,
                    });
                }
            }
            x += r.x_advance;
        }
        flush(&mut rects, run.take(), baseline);
    }
    rects
}

struct Run {
    x0: f32,
    x1: f32,
    decoration: TextDecoration,
    font_size: f32,
}

fn flush(out: &mut Vec<[f32; 4]>, run: Option<Run>, baseline: &Baseline) {
    let run = match run {
        Some(run) => run,
        None => return,
    };
    let y = match run.decoration {
        TextDecoration::None => return,
        TextDecoration::Underline => baseline.position.1 + run.font_size * 0.1,
        TextDecoration::Strikethrough => baseline.position.1 - run.font_size * 0.3,
    };
    out.push([
        run.x0,
        y,
        run.x1 - run.x0,
        baseline.line_height / 24.0,
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline;
    use crate::wrap::wrap;
    use std::sync::Arc;
    use text_engine::testing::FakeFace;
    use text_engine::{compute_metrics, FontStore};
    use text_model::{override_store, FontName, StyleOverride, TextStyle};

    fn rects_for(data: &TextData) -> Vec<[f32; 4]> {
        let mut store = FontStore::new();
        store.install_face(
            FontName::new("Inter", "Regular").cache_key(),
            Arc::new(FakeFace::new()),
        );
        let metrics = compute_metrics(data, &mut store);
        let lines = wrap(data, &metrics, None);
        let layout = baseline::compute(data, lines, None, None);
        compute(data, &layout)
    }

    fn doc(text: &str) -> TextData {
        let mut style = TextStyle::default();
        style.font_size = 10.0;
        TextData::new(text, style)
    }

    fn decorate(data: &mut TextData, start: usize, end: usize, decoration: TextDecoration) {
        let mut over = StyleOverride::new();
        over.text_decoration = Some(decoration);
        override_store::apply_style(data, start, end, &over);
    }

    #[test]
    fn undecorated_text_has_no_rects() {
        assert!(rects_for(&doc("abc")).is_empty());
    }

    #[test]
    fn underline_run_spans_its_characters() {
        let mut data = doc("abcd");
        decorate(&mut data, 1, 3, TextDecoration::Underline);
        let rects = rects_for(&data);
        assert_eq!(rects.len(), 1);
        // Characters 1..3 at 6px each, a tenth of an em below baseline y 8
        assert!((rects[0][0] - 6.0).abs() < 1e-4);
        assert!((rects[0][1] - 9.0).abs() < 1e-4);
        assert!((rects[0][2] - 12.0).abs() < 1e-4);
        assert!((rects[0][3] - 10.0 / 24.0).abs() < 1e-4);
    }

    #[test]
    fn strikethrough_sits_above_the_baseline() {
        let mut data = doc("ab");
        decorate(&mut data, 0, 2, TextDecoration::Strikethrough);
        let rects = rects_for(&data);
        assert_eq!(rects.len(), 1);
        assert!((rects[0][1] - 5.0).abs() < 1e-4);
    }

    #[test]
    fn adjacent_records_merge_and_spaces_carry_through() {
        let mut data = doc("ab cd");
        decorate(&mut data, 0, 5, TextDecoration::Underline);
        let rects = rects_for(&data);
        assert_eq!(rects.len(), 1);
        assert!((rects[0][2] - 30.0).abs() < 1e-4);
    }

    #[test]
    fn mixed_decorations_split_runs() {
        let mut data = doc("abcd");
        decorate(&mut data, 0, 2, TextDecoration::Underline);
        decorate(&mut data, 2, 4, TextDecoration::Strikethrough);
        let rects = rects_for(&data);
        assert_eq!(rects.len(), 2);
        assert!((rects[0][0] - 0.0).abs() < 1e-4);
        assert!((rects[1][0] - 12.0).abs() < 1e-4);
        assert!(rects[0][1] > rects[1][1]);
    }

    #[test]
    fn each_wrapped_line_gets_its_own_rect() {
        let mut data = doc("aaa\nbbb");
        decorate(&mut data, 0, 7, TextDecoration::Underline);
        let rects = rects_for(&data);
        assert_eq!(rects.len(), 2);
        assert!((rects[1][1] - rects[0][1] - 10.0).abs() < 1e-4);
    }
}
