//! Keyboard arrow navigation
//!
//! Horizontal moves step by grapheme cluster; vertical moves keep the
//! caret's x position and land on the nearest slot of the adjacent
//! baseline. Command jumps to the line edge (left/right) or the document
//! edge (up/down). Shift moves only the focus; without it a non-collapsed
//! selection first collapses to the edge in the direction of travel.

use crate::editor::Editor;
use crate::events::EditorEvent;
use serde::{Deserialize, Serialize};
use text_model::{Selection, SelectionUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrowDirection {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowModifiers {
    pub shift: bool,
    pub command: bool,
}

impl Editor {
    pub fn arrow_move(&mut self, direction: ArrowDirection, modifiers: ArrowModifiers) {
        if !self.selection.has_selection() {
            return;
        }
        let target = self.arrow_target(direction, modifiers);
        if modifiers.shift {
            self.selection.merge(SelectionUpdate {
                focus: Some(target.0),
                focus_offset: Some(target.1),
                ..Default::default()
            });
        } else {
            self.selection = Selection::NONE;
            self.selection
                .merge(SelectionUpdate::collapsed(target.0, target.1));
        }
        self.events.emit(EditorEvent::SelectionChanged);
    }

    fn arrow_target(&self, direction: ArrowDirection, modifiers: ArrowModifiers) -> (i32, i32) {
        let focus_b = self.selection.focus.max(0) as usize;
        let focus_o = self.selection.focus_offset.max(0) as usize;

        if modifiers.command {
            return match direction {
                ArrowDirection::Left => (focus_b as i32, 0),
                ArrowDirection::Right => (focus_b as i32, self.caret_slots(focus_b) as i32),
                ArrowDirection::Up => self.pair_for_offset(0),
                ArrowDirection::Down => self.pair_for_offset(self.data.char_len()),
            };
        }

        // A ranged selection collapses to its edge before moving
        if !self.selection.is_collapsed() && !modifiers.shift {
            if let Some((start, end)) = self.selection_range() {
                let edge = match direction {
                    ArrowDirection::Left | ArrowDirection::Up => start,
                    ArrowDirection::Right | ArrowDirection::Down => end,
                };
                let pair = self.pair_for_offset(edge);
                return match direction {
                    ArrowDirection::Left | ArrowDirection::Right => pair,
                    ArrowDirection::Up => self.vertical_target(pair.0 as usize, pair.1 as usize, -1),
                    ArrowDirection::Down => self.vertical_target(pair.0 as usize, pair.1 as usize, 1),
                };
            }
        }

        match direction {
            ArrowDirection::Left => {
                let abs = self.focus_abs();
                if abs == 0 {
                    (focus_b as i32, focus_o as i32)
                } else {
                    self.pair_for_offset(self.prev_boundary(abs))
                }
            }
            ArrowDirection::Right => {
                let abs = self.focus_abs();
                if abs >= self.data.char_len() {
                    (focus_b as i32, focus_o as i32)
                } else {
                    self.pair_for_offset(self.next_boundary(abs))
                }
            }
            ArrowDirection::Up => self.vertical_target(focus_b, focus_o, -1),
            ArrowDirection::Down => self.vertical_target(focus_b, focus_o, 1),
        }
    }

    fn pair_for_offset(&self, abs: usize) -> (i32, i32) {
        let update = self.update_for_offset(abs);
        (update.focus.unwrap_or(0), update.focus_offset.unwrap_or(0))
    }

    /// The slot nearest the caret's x on the baseline `delta` lines away;
    /// past the first/last line the caret jumps to the document edge
    fn vertical_target(&self, baseline: usize, offset: usize, delta: i32) -> (i32, i32) {
        let count = self.derived.baselines.len() as i32;
        let max_index = if self.has_phantom_line() { count } else { count - 1 };
        let target = baseline as i32 + delta;
        if target < 0 {
            return (0, 0);
        }
        if target > max_index {
            return self.pair_for_offset(self.data.char_len());
        }
        if target == count {
            return (count, 0);
        }
        let x = self.caret_x(baseline, offset);
        (target, self.offset_for_x(target as usize, x) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::editor;

    #[test]
    fn left_and_right_step_across_lines() {
        let mut editor = editor("ab\ncd");
        editor.set_caret(3);
        editor.arrow_move(ArrowDirection::Left, ArrowModifiers::default());
        // Back onto the first line, before the break
        assert_eq!(editor.selection.focus, 0);
        assert_eq!(editor.selection.focus_offset, 2);

        editor.arrow_move(ArrowDirection::Right, ArrowModifiers::default());
        assert_eq!(editor.selection.focus, 1);
        assert_eq!(editor.selection.focus_offset, 0);
    }

    #[test]
    fn right_steps_over_emoji_cluster() {
        let family = "\u{1f468}\u{200d}\u{1f469}\u{200d}\u{1f466}";
        let mut editor = editor(&format!("a{family}b"));
        editor.set_caret(1);
        editor.arrow_move(ArrowDirection::Right, ArrowModifiers::default());
        assert_eq!(editor.focus_abs(), 6);
    }

    #[test]
    fn shift_extends_focus_only() {
        let mut editor = editor("abcd");
        editor.set_caret(1);
        editor.arrow_move(
            ArrowDirection::Right,
            ArrowModifiers {
                shift: true,
                ..Default::default()
            },
        );
        assert_eq!(editor.selection_range(), Some((1, 2)));
        assert_eq!(editor.selection.anchor_offset, 1);
    }

    #[test]
    fn ranged_selection_collapses_to_edge() {
        let mut editor = editor("abcd");
        editor.select_abs_range(1, 3);
        editor.arrow_move(ArrowDirection::Left, ArrowModifiers::default());
        assert!(editor.selection.is_collapsed());
        assert_eq!(editor.focus_abs(), 1);

        editor.select_abs_range(1, 3);
        editor.arrow_move(ArrowDirection::Right, ArrowModifiers::default());
        assert_eq!(editor.focus_abs(), 3);
    }

    #[test]
    fn vertical_moves_keep_x() {
        let mut editor = editor("abc\ndef");
        editor.set_caret(2);
        editor.arrow_move(ArrowDirection::Down, ArrowModifiers::default());
        assert_eq!(editor.selection.focus, 1);
        assert_eq!(editor.selection.focus_offset, 2);

        editor.arrow_move(ArrowDirection::Up, ArrowModifiers::default());
        assert_eq!(editor.selection.focus, 0);
        assert_eq!(editor.selection.focus_offset, 2);
    }

    #[test]
    fn down_past_last_line_goes_to_document_end() {
        let mut editor = editor("abc\nde");
        editor.set_caret(5);
        editor.arrow_move(ArrowDirection::Down, ArrowModifiers::default());
        assert_eq!(editor.focus_abs(), 6);
    }

    #[test]
    fn command_jumps_to_line_and_document_edges() {
        let mut editor = editor("abc\ndef");
        editor.set_caret(5);
        editor.arrow_move(
            ArrowDirection::Left,
            ArrowModifiers {
                command: true,
                ..Default::default()
            },
        );
        assert_eq!(editor.focus_abs(), 4);

        editor.arrow_move(
            ArrowDirection::Right,
            ArrowModifiers {
                command: true,
                ..Default::default()
            },
        );
        assert_eq!(editor.focus_abs(), 7);

        editor.arrow_move(
            ArrowDirection::Up,
            ArrowModifiers {
                command: true,
                ..Default::default()
            },
        );
        assert_eq!(editor.focus_abs(), 0);

        editor.arrow_move(
            ArrowDirection::Down,
            ArrowModifiers {
                command: true,
                ..Default::default()
            },
        );
        assert_eq!(editor.focus_abs(), 7);
    }

    #[test]
    fn command_shift_selects_to_line_start() {
        let mut editor = editor("abcd");
        editor.set_caret(3);
        editor.arrow_move(
            ArrowDirection::Left,
            ArrowModifiers {
                shift: true,
                command: true,
            },
        );
        assert_eq!(editor.selection_range(), Some((0, 3)));
    }
}
