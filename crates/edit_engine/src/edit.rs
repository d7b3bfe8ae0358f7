//! Text insertion and deletion, including list autoformat
//!
//! Insertion replaces any non-collapsed selection, inherits the style id
//! of the left neighbor (or the right one across a break), and consumes
//! any pending style set at a collapsed selection. Typing a space after a
//! short list prefix at a line start converts the line into a list; Enter
//! on an empty list line and Backspace at a list line's start step the
//! line out of the list instead of editing the buffer.

use crate::editor::Editor;
use serde::{Deserialize, Serialize};
use text_model::{
    override_store, tokenize, InvalidationTier, LineKind, Selection, SelectionUpdate, StyleId,
    MIN_LIST_INDENT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteDirection {
    Backward,
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteGranularity {
    Character,
    Word,
    /// To the start (backward) or end (forward) of the logical line
    LineEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOptions {
    pub direction: DeleteDirection,
    pub granularity: DeleteGranularity,
}

impl Default for DeleteOptions {
    fn default() -> Self {
        Self {
            direction: DeleteDirection::Backward,
            granularity: DeleteGranularity::Character,
        }
    }
}

/// Longest list prefix (before the typed space) that still autoformats
const MAX_LIST_PREFIX: usize = 3;

impl Editor {
    /// Insert at the selection, replacing it when non-collapsed. With no
    /// selection the text is appended.
    pub fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let caret = match self.selection_range() {
            Some((start, end)) => {
                self.data.remove_chars(start, end);
                override_store::canonicalize(&mut self.data);
                start
            }
            None => {
                if self.selection.has_selection() {
                    self.focus_abs()
                } else {
                    self.data.char_len()
                }
            }
        };

        if text == "\n" && self.step_out_on_empty_list_line(caret) {
            self.invalidate(InvalidationTier::Metrics);
            self.apply();
            self.set_caret(caret);
            return;
        }

        let style_id = self.inherited_style_id(caret);
        self.data.insert_chars(caret, text, style_id);
        let inserted = text.chars().count();
        if let Some(pending) = self.pending_style.take() {
            override_store::apply_style(&mut self.data, caret, caret + inserted, &pending);
        }

        let mut new_caret = caret + inserted;
        if text == " " {
            if let Some(after) = self.try_list_autoformat(caret) {
                new_caret = after;
            }
        }

        self.invalidate(InvalidationTier::All);
        self.apply();
        self.set_caret(new_caret);
    }

    /// Delete per the options. A non-collapsed selection is deleted as-is
    /// regardless of direction or granularity.
    pub fn delete_text(&mut self, options: DeleteOptions) {
        if let Some((start, end)) = self.selection_range() {
            self.data.remove_chars(start, end);
            override_store::canonicalize(&mut self.data);
            self.invalidate(InvalidationTier::All);
            self.apply();
            self.set_caret(start);
            return;
        }
        if !self.selection.has_selection() {
            return;
        }
        let caret = self.focus_abs();
        let line_index = self.data.line_index_for_character(caret);
        let (line_start, line_end) = self.data.line_char_range(line_index);

        if options.direction == DeleteDirection::Backward
            && caret == line_start
            && self
                .data
                .lines
                .get(line_index)
                .map(|l| l.kind.is_list())
                .unwrap_or(false)
        {
            self.step_list_out(line_index);
            self.invalidate(InvalidationTier::Metrics);
            self.apply();
            self.set_caret(caret);
            return;
        }

        let range = self.delete_range(caret, line_start, line_end, options);
        let (start, end) = match range {
            Some((start, end)) if start < end => (start, end),
            _ => return,
        };
        self.data.remove_chars(start, end);
        override_store::canonicalize(&mut self.data);
        self.invalidate(InvalidationTier::All);
        self.apply();
        self.set_caret(start);
    }

    /// Replace the selection, or the whole document when nothing is selected
    pub fn replace_text(&mut self, text: &str) {
        if self.selection_range().is_none() {
            self.data.remove_chars(0, self.data.char_len());
            override_store::canonicalize(&mut self.data);
            self.selection = Selection::NONE;
            self.selection.merge(SelectionUpdate::collapsed(0, 0));
        }
        if text.is_empty() {
            if let Some((start, end)) = self.selection_range() {
                self.data.remove_chars(start, end);
                override_store::canonicalize(&mut self.data);
                self.invalidate(InvalidationTier::All);
                self.apply();
                self.set_caret(start);
            }
            return;
        }
        self.insert_text(text);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Inserted characters continue the run to their left; at a line start
    /// (or the buffer start) they take the style of the character to the
    /// right instead
    fn inherited_style_id(&self, caret: usize) -> StyleId {
        let chars = self.data.chars();
        if caret > 0 && chars.get(caret - 1).copied() != Some('\n') {
            self.style_id_at(caret - 1)
        } else {
            self.style_id_at(caret)
        }
    }

    fn delete_range(
        &self,
        caret: usize,
        line_start: usize,
        line_end: usize,
        options: DeleteOptions,
    ) -> Option<(usize, usize)> {
        let len = self.data.char_len();
        match (options.direction, options.granularity) {
            (DeleteDirection::Backward, DeleteGranularity::Character) => {
                if caret == 0 {
                    None
                } else {
                    Some((self.prev_boundary(caret), caret))
                }
            }
            (DeleteDirection::Forward, DeleteGranularity::Character) => {
                if caret >= len {
                    None
                } else {
                    Some((caret, self.next_boundary(caret)))
                }
            }
            (DeleteDirection::Backward, DeleteGranularity::Word) => {
                if caret == line_start {
                    // Nothing on this line: remove the break before it
                    return Some((caret.saturating_sub(1), caret));
                }
                let text = self.line_text(line_start, line_end);
                let rel = caret - line_start;
                let token = tokenize::word_tokenize(&text)
                    .into_iter()
                    .rev()
                    .find(|t| t.start < rel)?;
                Some((line_start + token.start, caret))
            }
            (DeleteDirection::Forward, DeleteGranularity::Word) => {
                if caret >= line_end {
                    return Some((caret, (caret + 1).min(len)));
                }
                let text = self.line_text(line_start, line_end);
                let rel = caret - line_start;
                let token = tokenize::word_tokenize(&text)
                    .into_iter()
                    .find(|t| t.end > rel)?;
                Some((caret, line_start + token.end))
            }
            (DeleteDirection::Backward, DeleteGranularity::LineEnd) => {
                if caret == line_start {
                    Some((caret.saturating_sub(1), caret))
                } else {
                    Some((line_start, caret))
                }
            }
            (DeleteDirection::Forward, DeleteGranularity::LineEnd) => {
                if caret >= line_end {
                    Some((caret, (caret + 1).min(len)))
                } else {
                    Some((caret, line_end))
                }
            }
        }
    }

    fn line_text(&self, start: usize, end: usize) -> String {
        self.data
            .chars()
            .get(start..end)
            .map(|chars| chars.iter().collect())
            .unwrap_or_default()
    }

    pub(crate) fn prev_boundary(&self, caret: usize) -> usize {
        tokenize::graphemes(&self.data.characters)
            .iter()
            .rev()
            .find(|g| g.start < caret)
            .map(|g| g.start)
            .unwrap_or(0)
    }

    pub(crate) fn next_boundary(&self, caret: usize) -> usize {
        tokenize::graphemes(&self.data.characters)
            .iter()
            .find(|g| g.end > caret)
            .map(|g| g.end)
            .unwrap_or_else(|| self.data.char_len())
    }

    /// Enter on an empty list line reduces its level (or leaves the list)
    /// instead of inserting a break
    fn step_out_on_empty_list_line(&mut self, caret: usize) -> bool {
        let line_index = self.data.line_index_for_character(caret);
        let (start, end) = self.data.line_char_range(line_index);
        if start != end {
            return false;
        }
        self.step_list_out(line_index)
    }

    pub(crate) fn step_list_out(&mut self, line_index: usize) -> bool {
        let line = match self.data.lines.get_mut(line_index) {
            Some(line) if line.kind.is_list() => line,
            _ => return false,
        };
        if line.indentation_level > MIN_LIST_INDENT {
            line.indentation_level -= 1;
        } else {
            line.kind = LineKind::Plain;
            line.indentation_level = 0;
        }
        self.data.fix_lines();
        true
    }

    /// Convert a plain line whose content before the typed space (at
    /// `space_offset`) is a list prefix. Returns the caret after conversion.
    fn try_list_autoformat(&mut self, space_offset: usize) -> Option<usize> {
        let line_index = self.data.line_index_for_character(space_offset);
        let line = self.data.lines.get(line_index)?;
        if line.kind.is_list() {
            return None;
        }
        let (start, _) = self.data.line_char_range(line_index);
        if space_offset <= start || space_offset - start > MAX_LIST_PREFIX {
            return None;
        }
        let prefix = self.line_text(start, space_offset);
        let (kind, list_start_offset) = parse_list_prefix(&prefix)?;

        self.data.remove_chars(start, space_offset + 1);
        override_store::canonicalize(&mut self.data);
        if let Some(line) = self.data.lines.get_mut(line_index) {
            line.kind = kind;
            line.indentation_level = line.indentation_level.max(MIN_LIST_INDENT);
            line.is_first_line_of_list = true;
            line.list_start_offset = list_start_offset;
        }
        self.data.fix_lines();
        Some(start)
    }
}

/// "-" and "*" start an unordered list; digits or ASCII letters followed
/// by "." or ")" start an ordered list. Digit prefixes number from the
/// parsed ordinal, letter prefixes always from the first entry.
fn parse_list_prefix(prefix: &str) -> Option<(LineKind, u32)> {
    if prefix == "-" || prefix == "*" {
        return Some((LineKind::UnorderedList, 0));
    }
    let terminator = prefix.chars().last()?;
    if terminator != '.' && terminator != ')' {
        return None;
    }
    let body = &prefix[..prefix.len() - terminator.len_utf8()];
    if body.is_empty() {
        return None;
    }
    if body.chars().all(|c| c.is_ascii_digit()) {
        let n: u32 = body.parse().ok()?;
        return Some((LineKind::OrderedList, n.saturating_sub(1)));
    }
    if body.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some((LineKind::OrderedList, 0));
    }
    None
}
