//! Selection state and pointer hit testing
//!
//! Selections are `(baseline, offset)` pairs over the current layout.
//! Pointer input maps through the baseline geometry and the per-character
//! offset table: one click collapses, two select the word, three the
//! logical line, four or more the whole document. Shift extends from the
//! existing anchor and dragging moves only the focus.

use crate::editor::Editor;
use crate::events::EditorEvent;
use serde::{Deserialize, Serialize};
use text_model::{tokenize, Selection, SelectionUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointModifiers {
    pub shift: bool,
    pub click_count: u32,
    /// Pointer moved with the button held: only the focus follows
    pub dragging: bool,
}

impl Default for PointModifiers {
    fn default() -> Self {
        Self {
            shift: false,
            click_count: 1,
            dragging: false,
        }
    }
}

impl Editor {
    /// Merge a partial update into the selection
    pub fn set_selection(&mut self, update: SelectionUpdate) {
        self.selection.merge(update);
        self.clamp_selection();
        self.events.emit(EditorEvent::SelectionChanged);
    }

    /// The selection with anchor before focus in reading order
    pub fn get_selection(&self) -> Selection {
        self.selection.normalized()
    }

    /// Clear the selection and any pending style
    pub fn deselect(&mut self) {
        self.selection = Selection::NONE;
        self.pending_style = None;
        self.events.emit(EditorEvent::SelectionChanged);
    }

    pub fn select_all(&mut self) {
        let update = if self.has_phantom_line() {
            SelectionUpdate::range(0, 0, self.derived.baselines.len() as i32, 0)
        } else if let Some(last) = self.derived.baselines.len().checked_sub(1) {
            let b = &self.derived.baselines[last];
            SelectionUpdate::range(
                0,
                0,
                last as i32,
                (b.end_character - b.first_character) as i32,
            )
        } else {
            SelectionUpdate::collapsed(0, 0)
        };
        self.selection = Selection::NONE;
        self.selection.merge(update);
        self.events.emit(EditorEvent::SelectionChanged);
    }

    /// Pointer input in element-local coordinates
    pub fn select_for_point(&mut self, x: f32, y: f32, modifiers: PointModifiers) {
        if self.derived.baselines.is_empty() {
            return;
        }
        if modifiers.click_count >= 4 {
            self.select_all();
            return;
        }

        let baseline = self.baseline_for_y(y);
        let offset = if baseline >= self.derived.baselines.len() {
            0
        } else {
            self.offset_for_x(baseline, x)
        };
        let abs = self.abs_offset(baseline as i32, offset as i32);

        match modifiers.click_count {
            2 => self.select_word_at(abs),
            3 => self.select_line_at(abs),
            _ => {
                if modifiers.shift || modifiers.dragging {
                    self.selection.merge(SelectionUpdate {
                        focus: Some(baseline as i32),
                        focus_offset: Some(offset as i32),
                        ..Default::default()
                    });
                    if !self.selection.has_selection() {
                        // No prior anchor to extend from
                        self.selection.anchor = baseline as i32;
                        self.selection.anchor_offset = offset as i32;
                    }
                } else {
                    self.selection = Selection::NONE;
                    self.selection
                        .merge(SelectionUpdate::collapsed(baseline as i32, offset as i32));
                }
            }
        }
        self.events.emit(EditorEvent::SelectionChanged);
    }

    /// Collapse at an absolute character offset
    pub fn select_for_character_offset(&mut self, offset: usize) {
        let update = self.update_for_offset(offset);
        self.selection = Selection::NONE;
        self.selection.merge(update);
        self.events.emit(EditorEvent::SelectionChanged);
    }

    /// The focus as an absolute character offset
    pub fn get_select_character_offset(&self) -> Option<usize> {
        if !self.selection.has_selection() {
            return None;
        }
        Some(self.focus_abs())
    }

    // =========================================================================
    // Hit testing
    // =========================================================================

    /// The baseline whose line box contains `y`; past the last box this is
    /// the phantom line (for a trailing break) or the last baseline
    fn baseline_for_y(&self, y: f32) -> usize {
        let baselines = &self.derived.baselines;
        if let Some(last) = baselines.last() {
            if self.has_phantom_line() && y >= last.line_y + last.line_height {
                return baselines.len();
            }
        }
        baselines
            .iter()
            .position(|b| y < b.line_y + b.line_height)
            .unwrap_or_else(|| baselines.len().saturating_sub(1))
    }

    /// The caret slot nearest to `x` on a baseline
    pub(crate) fn offset_for_x(&self, baseline: usize, x: f32) -> usize {
        let slots = self.caret_slots(baseline);
        let mut best = 0;
        let mut best_distance = f32::INFINITY;
        for offset in 0..=slots {
            let distance = (self.caret_x(baseline, offset) - x).abs();
            if distance < best_distance {
                best_distance = distance;
                best = offset;
            }
        }
        best
    }

    fn select_word_at(&mut self, abs: usize) {
        let line_index = self.data.line_index_for_character(abs);
        let (start, end) = self.data.line_char_range(line_index);
        if start == end {
            self.selection = Selection::NONE;
            let update = self.update_for_offset(start);
            self.selection.merge(update);
            return;
        }
        let text: String = self
            .data
            .chars()
            .get(start..end)
            .map(|chars| chars.iter().collect())
            .unwrap_or_default();
        let rel = abs.saturating_sub(start).min(end - start);
        if let Some((from, to)) = tokenize::word_range_at(&text, rel) {
            self.select_abs_range(start + from, start + to);
        }
    }

    fn select_line_at(&mut self, abs: usize) {
        let line_index = self.data.line_index_for_character(abs);
        let (start, end) = self.data.line_char_range(line_index);
        self.select_abs_range(start, end);
    }

    pub(crate) fn select_abs_range(&mut self, start: usize, end: usize) {
        let anchor = self.update_for_offset(start);
        let focus = self.update_for_offset(end);
        self.selection = Selection::NONE;
        self.selection.merge(SelectionUpdate::range(
            anchor.anchor.unwrap_or(0),
            anchor.anchor_offset.unwrap_or(0),
            focus.focus.unwrap_or(0),
            focus.focus_offset.unwrap_or(0),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::editor;

    #[test]
    fn get_selection_normalizes_reversed_pairs() {
        let mut editor = editor("ab\ncd");
        editor.set_selection(SelectionUpdate::range(1, 1, 0, 1));
        let selection = editor.get_selection();
        assert_eq!(selection.anchor, 0);
        assert_eq!(selection.anchor_offset, 1);
        assert_eq!(selection.focus, 1);
        assert_eq!(selection.focus_offset, 1);
        // The stored selection keeps its direction
        assert_eq!(editor.selection.anchor, 1);
    }

    #[test]
    fn select_all_spans_the_document() {
        let mut editor = editor("ab\ncd");
        editor.select_all();
        assert_eq!(editor.get_select_character_offset(), Some(5));
        let selection = editor.get_selection();
        assert_eq!(selection.anchor, 0);
        assert_eq!(selection.anchor_offset, 0);
    }

    #[test]
    fn single_click_collapses_at_nearest_slot() {
        let mut editor = editor("ab\ncd");
        editor.select_for_point(7.0, 5.0, PointModifiers::default());
        assert!(editor.selection.is_collapsed());
        assert_eq!(editor.focus_abs(), 1);

        // Second line box spans y 10..20
        editor.select_for_point(100.0, 15.0, PointModifiers::default());
        assert_eq!(editor.focus_abs(), 5);
    }

    #[test]
    fn click_below_trailing_break_hits_phantom_line() {
        let mut editor = editor("ab\n");
        editor.select_for_point(0.0, 50.0, PointModifiers::default());
        assert_eq!(editor.selection.focus, 1);
        assert_eq!(editor.focus_abs(), 3);
    }

    #[test]
    fn double_click_selects_word() {
        let mut editor = editor("one two");
        editor.select_for_point(30.0, 5.0, PointModifiers {
            click_count: 2,
            ..Default::default()
        });
        let (start, end) = editor.selection_range().unwrap();
        assert_eq!((start, end), (4, 7));
    }

    #[test]
    fn triple_click_selects_line() {
        let mut editor = editor("ab cd\nef");
        editor.select_for_point(10.0, 5.0, PointModifiers {
            click_count: 3,
            ..Default::default()
        });
        let (start, end) = editor.selection_range().unwrap();
        assert_eq!((start, end), (0, 5));
    }

    #[test]
    fn shift_click_extends_and_drag_moves_focus() {
        let mut editor = editor("abcdef");
        editor.select_for_point(0.0, 5.0, PointModifiers::default());
        editor.select_for_point(12.0, 5.0, PointModifiers {
            shift: true,
            ..Default::default()
        });
        assert_eq!(editor.selection_range(), Some((0, 2)));

        editor.select_for_point(24.0, 5.0, PointModifiers {
            dragging: true,
            ..Default::default()
        });
        assert_eq!(editor.selection_range(), Some((0, 4)));
    }

    #[test]
    fn quadruple_click_selects_all() {
        let mut editor = editor("ab\ncd");
        editor.select_for_point(0.0, 0.0, PointModifiers {
            click_count: 4,
            ..Default::default()
        });
        assert_eq!(editor.selection_range(), Some((0, 5)));
    }

    #[test]
    fn character_offset_roundtrip_through_phantom() {
        let mut editor = editor("ab\n");
        editor.select_for_character_offset(3);
        assert_eq!(editor.selection.focus, 1);
        assert_eq!(editor.get_select_character_offset(), Some(3));
    }

    #[test]
    fn deselect_clears_selection_and_pending_style() {
        let mut editor = editor("ab");
        editor.set_caret(1);
        let mut over = text_model::StyleOverride::new();
        over.font_size = Some(20.0);
        editor.apply_style(&over);
        assert!(editor.pending_style.is_some());

        editor.deselect();
        assert!(!editor.selection.has_selection());
        assert!(editor.pending_style.is_none());
        assert_eq!(editor.get_select_character_offset(), None);
    }
}
