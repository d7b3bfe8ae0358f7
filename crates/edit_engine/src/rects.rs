//! Caret and selection rectangle geometry
//!
//! A collapsed selection yields a 1px caret sized to the line's ascent
//! plus half the gap between ascent and cap height. A ranged selection
//! yields one rect per touched baseline: partial on the anchor and focus
//! lines, full width in between. The phantom line after a trailing break
//! gets a zero-width slab so multi-line highlights reach it.

use crate::editor::Editor;

/// `[x, y, width, height]` in element-local pixels
pub type Rect = [f32; 4];

const CARET_WIDTH: f32 = 1.0;

impl Editor {
    pub fn get_selection_rects(&self) -> Vec<Rect> {
        if !self.selection.has_selection() {
            return Vec::new();
        }
        let selection = self.selection.normalized();
        if selection.is_collapsed() {
            return vec![self.caret_rect(selection.focus as usize, selection.focus_offset as usize)];
        }

        let (a_b, a_o) = (selection.anchor as usize, selection.anchor_offset as usize);
        let (f_b, f_o) = (selection.focus as usize, selection.focus_offset as usize);
        let count = self.derived.baselines.len();

        if a_b == f_b && a_b < count {
            let b = &self.derived.baselines[a_b];
            let x0 = self.caret_x(a_b, a_o);
            let x1 = self.caret_x(f_b, f_o);
            return vec![[x0, b.line_y, (x1 - x0).max(0.0), b.line_height]];
        }

        let mut rects = Vec::new();
        if a_b < count {
            let b = &self.derived.baselines[a_b];
            let x0 = self.caret_x(a_b, a_o);
            let right = b.position.0 + b.width;
            rects.push([x0, b.line_y, (right - x0).max(0.0), b.line_height]);
        }
        for i in (a_b + 1)..f_b.min(count) {
            let b = &self.derived.baselines[i];
            rects.push([b.position.0, b.line_y, b.width, b.line_height]);
        }
        if f_b < count {
            let b = &self.derived.baselines[f_b];
            let x1 = self.caret_x(f_b, f_o);
            rects.push([
                b.position.0,
                b.line_y,
                (x1 - b.position.0).max(0.0),
                b.line_height,
            ]);
        } else {
            let (x, top, height) = self.phantom_caret_geometry();
            rects.push([x, top, 0.0, height]);
        }
        rects
    }

    fn caret_rect(&self, baseline: usize, offset: usize) -> Rect {
        if baseline >= self.derived.baselines.len() {
            let (x, top, height) = self.phantom_caret_geometry();
            return [x, top, CARET_WIDTH, height];
        }
        let b = &self.derived.baselines[baseline];
        let x = self.caret_x(baseline, offset);
        let correction = (b.ascent - b.cap_height).max(0.0) / 2.0;
        [
            x,
            b.position.1 - b.ascent,
            CARET_WIDTH,
            b.ascent + correction,
        ]
    }

    /// Geometry for a caret on the empty line after a trailing break
    fn phantom_caret_geometry(&self) -> (f32, f32, f32) {
        let style = self.data.style_at(self.data.char_len());
        let bottom = self
            .derived
            .baselines
            .last()
            .map(|b| b.line_y + b.line_height)
            .unwrap_or(0.0);
        let ascent = style.font_size * 0.8;
        let cap_height = style.font_size * 0.7;
        let x = layout_engine::indentation_px(&self.data, self.data.lines.len().saturating_sub(1));
        (x, bottom, ascent + (ascent - cap_height) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::editor;
    use text_model::SelectionUpdate;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn no_selection_no_rects() {
        let editor = editor("ab");
        assert!(editor.get_selection_rects().is_empty());
    }

    #[test]
    fn collapsed_caret_rect() {
        let mut editor = editor("ab");
        editor.set_caret(1);
        let rects = editor.get_selection_rects();
        assert_eq!(rects.len(), 1);
        let [x, y, w, h] = rects[0];
        assert!(close(x, 6.0));
        // Baseline 8, ascent 8: the caret top is the line top
        assert!(close(y, 0.0));
        assert!(close(w, 1.0));
        // Ascent plus half the ascent/cap-height gap
        assert!(close(h, 8.5));
    }

    #[test]
    fn single_line_range_rect() {
        let mut editor = editor("abcd");
        editor.set_selection(SelectionUpdate::range(0, 1, 0, 3));
        let rects = editor.get_selection_rects();
        assert_eq!(rects.len(), 1);
        let [x, y, w, h] = rects[0];
        assert!(close(x, 6.0));
        assert!(close(y, 0.0));
        assert!(close(w, 12.0));
        assert!(close(h, 10.0));
    }

    #[test]
    fn reversed_selection_produces_the_same_rect() {
        let mut editor = editor("abcd");
        editor.set_selection(SelectionUpdate::range(0, 3, 0, 1));
        let rects = editor.get_selection_rects();
        assert_eq!(rects.len(), 1);
        assert!(close(rects[0][0], 6.0));
        assert!(close(rects[0][2], 12.0));
    }

    #[test]
    fn multi_line_rects() {
        let mut editor = editor("abc\nde\nfgh");
        editor.select_abs_range(1, 9);
        let rects = editor.get_selection_rects();
        assert_eq!(rects.len(), 3);
        // Anchor line: from x=6 to the line's right edge (18)
        assert!(close(rects[0][0], 6.0));
        assert!(close(rects[0][2], 12.0));
        // Interior line: full width
        assert!(close(rects[1][0], 0.0));
        assert!(close(rects[1][2], 12.0));
        assert!(close(rects[1][1], 10.0));
        // Focus line: from the line start to the caret after "fg"
        assert!(close(rects[2][0], 0.0));
        assert!(close(rects[2][2], 12.0));
    }

    #[test]
    fn phantom_line_caret_sits_below_content() {
        let mut editor = editor("ab\n");
        editor.select_for_character_offset(3);
        let rects = editor.get_selection_rects();
        assert_eq!(rects.len(), 1);
        assert!(close(rects[0][1], 10.0));
        assert!(close(rects[0][0], 0.0));
    }
}
