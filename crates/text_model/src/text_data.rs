//! Persistent text state - the character buffer and its parallel tables
//!
//! `TextData` is the single persistent source of truth for a text element.
//! All indices in the engine are character offsets into `characters`.
//! The logical-line table has exactly `newline count + 1` entries; the
//! style-id array has one entry per character. `fix_lines` repairs both
//! invariants after structural edits instead of failing.

use crate::style::{StyleOverride, TextStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type StyleId = u32;

/// Style id 0 always refers to the base style.
pub const BASE_STYLE_ID: StyleId = 0;

/// Classification of a logical line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    Plain,
    OrderedList,
    UnorderedList,
}

impl LineKind {
    pub fn is_list(self) -> bool {
        !matches!(self, LineKind::Plain)
    }
}

/// Per-logical-line metadata
///
/// `list_start_offset` shifts ordered-list numbering and is only meaningful
/// on the first line of a list. `paragraph_spacing` is extra vertical space
/// inserted *after* this line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub kind: LineKind,
    pub indentation_level: u32,
    pub is_first_line_of_list: bool,
    pub list_start_offset: u32,
    pub paragraph_spacing: f32,
}

impl Default for LineRecord {
    fn default() -> Self {
        Self {
            kind: LineKind::Plain,
            indentation_level: 0,
            is_first_line_of_list: false,
            list_start_offset: 0,
            paragraph_spacing: 0.0,
        }
    }
}

/// Indentation bounds per line kind
pub const MAX_PLAIN_INDENT: u32 = 5;
pub const MIN_LIST_INDENT: u32 = 1;
pub const MAX_LIST_INDENT: u32 = 6;

impl LineRecord {
    /// Clamp the indentation level into the range valid for this kind
    pub fn clamp_indentation(&mut self) {
        if self.kind.is_list() {
            self.indentation_level = self
                .indentation_level
                .clamp(MIN_LIST_INDENT, MAX_LIST_INDENT);
        } else {
            self.indentation_level = self.indentation_level.min(MAX_PLAIN_INDENT);
        }
    }
}

/// The persistent state of a text element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub characters: String,
    pub lines: Vec<LineRecord>,
    pub character_style_ids: Vec<StyleId>,
    /// Sparse override table; absent when no character diverges from base.
    /// `BTreeMap` keeps id iteration deterministic.
    pub style_overrides: BTreeMap<StyleId, StyleOverride>,
    pub style: TextStyle,
}

impl Default for TextData {
    fn default() -> Self {
        Self {
            characters: String::new(),
            lines: vec![LineRecord::default()],
            character_style_ids: Vec::new(),
            style_overrides: BTreeMap::new(),
            style: TextStyle::default(),
        }
    }
}

impl TextData {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        let characters: String = text.into();
        let line_count = characters.chars().filter(|&c| c == '\n').count() + 1;
        Self {
            characters,
            lines: vec![LineRecord::default(); line_count],
            // Empty = every character inherits the base style
            character_style_ids: Vec::new(),
            style_overrides: BTreeMap::new(),
            style,
        }
    }

    /// Number of characters in the buffer
    pub fn char_len(&self) -> usize {
        self.characters.chars().count()
    }

    /// The buffer as a character vector (offsets in the engine are
    /// character offsets, not byte offsets)
    pub fn chars(&self) -> Vec<char> {
        self.characters.chars().collect()
    }

    /// Character offset of the start of each logical line
    pub fn line_start_offsets(&self) -> Vec<usize> {
        let mut starts = vec![0];
        for (i, c) in self.characters.chars().enumerate() {
            if c == '\n' {
                starts.push(i + 1);
            }
        }
        starts
    }

    /// Index of the logical line containing the character offset
    ///
    /// An offset past the end maps to the last line; the offset of a `\n`
    /// itself belongs to the line it terminates.
    pub fn line_index_for_character(&self, offset: usize) -> usize {
        let starts = self.line_start_offsets();
        match starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        }
    }

    /// Character range `[start, end)` of a logical line, excluding the
    /// terminating newline
    pub fn line_char_range(&self, line_index: usize) -> (usize, usize) {
        let starts = self.line_start_offsets();
        let line_index = line_index.min(starts.len().saturating_sub(1));
        let start = starts[line_index];
        let end = if line_index + 1 < starts.len() {
            starts[line_index + 1] - 1
        } else {
            self.char_len()
        };
        (start, end)
    }

    /// Effective style for a single character offset
    pub fn style_at(&self, offset: usize) -> TextStyle {
        let id = self
            .character_style_ids
            .get(offset)
            .copied()
            .unwrap_or(BASE_STYLE_ID);
        self.style_for_id(id)
    }

    /// Resolve a style id against the base style
    pub fn style_for_id(&self, id: StyleId) -> TextStyle {
        if id == BASE_STYLE_ID {
            return self.style.clone();
        }
        match self.style_overrides.get(&id) {
            Some(over) => self.style.with_override(over),
            None => self.style.clone(),
        }
    }

    /// Splice characters into the buffer at a character offset, assigning
    /// `style_id` to every inserted character and splitting the line table
    /// at inserted newlines
    ///
    /// The style-id array may be shorter than the buffer (trailing base-style
    /// runs are kept truncated); inserting base-style text past its end
    /// leaves it untouched.
    pub fn insert_chars(&mut self, offset: usize, text: &str, style_id: StyleId) {
        let offset = offset.min(self.char_len());
        let byte_offset = char_to_byte(&self.characters, offset);
        self.characters.insert_str(byte_offset, text);

        if style_id != BASE_STYLE_ID || offset < self.character_style_ids.len() {
            while self.character_style_ids.len() < offset {
                self.character_style_ids.push(BASE_STYLE_ID);
            }
            let inserted: Vec<StyleId> = text.chars().map(|_| style_id).collect();
            self.character_style_ids.splice(offset..offset, inserted);
        }

        let newline_count = text.chars().filter(|&c| c == '\n').count();
        if newline_count > 0 {
            let line_index = self.line_index_for_insert(offset);
            // Continuation lines clone the split line's record but never
            // start a new list themselves
            let mut template = self
                .lines
                .get(line_index)
                .cloned()
                .unwrap_or_default();
            template.is_first_line_of_list = false;
            template.list_start_offset = 0;
            let clones = vec![template; newline_count];
            let at = (line_index + 1).min(self.lines.len());
            self.lines.splice(at..at, clones);
        }
        self.fix_lines();
    }

    /// Remove the character range `[start, end)`, merging line records when
    /// newlines are deleted
    pub fn remove_chars(&mut self, start: usize, end: usize) {
        let len = self.char_len();
        let start = start.min(len);
        let end = end.min(len);
        if start >= end {
            return;
        }

        let removed_newlines = self
            .characters
            .chars()
            .skip(start)
            .take(end - start)
            .filter(|&c| c == '\n')
            .count();
        let first_line = self.line_index_for_character(start);

        let byte_start = char_to_byte(&self.characters, start);
        let byte_end = char_to_byte(&self.characters, end);
        self.characters.replace_range(byte_start..byte_end, "");
        let id_start = start.min(self.character_style_ids.len());
        let id_end = end.min(self.character_style_ids.len());
        self.character_style_ids.drain(id_start..id_end);

        if removed_newlines > 0 {
            // The surviving merged line keeps the first line's record
            let drain_from = first_line + 1;
            let drain_to = (drain_from + removed_newlines).min(self.lines.len());
            if drain_from < self.lines.len() {
                self.lines.drain(drain_from..drain_to);
            }
        }
        self.fix_lines();
    }

    fn line_index_for_insert(&self, offset: usize) -> usize {
        // For insertion, an offset right after a '\n' belongs to the next line,
        // which is what line_index_for_character already returns for starts.
        self.line_index_for_character(offset)
    }

    /// Repair the line table invariants
    ///
    /// Guarantees after this call: the table length equals newline count + 1,
    /// indentation levels are within bounds for each kind, non-list lines
    /// carry no list metadata, and a list line whose predecessor is not a
    /// compatible sibling is marked as a list head.
    pub fn fix_lines(&mut self) {
        let wanted = self.characters.chars().filter(|&c| c == '\n').count() + 1;
        if self.lines.len() != wanted {
            tracing::warn!(
                have = self.lines.len(),
                wanted,
                "line table out of sync, repairing"
            );
            if self.lines.len() > wanted {
                self.lines.truncate(wanted);
            } else {
                let template = self.lines.last().cloned().unwrap_or_default();
                let mut template = template;
                template.is_first_line_of_list = false;
                template.list_start_offset = 0;
                while self.lines.len() < wanted {
                    self.lines.push(template.clone());
                }
            }
        }

        for i in 0..self.lines.len() {
            self.lines[i].clamp_indentation();
            if !self.lines[i].kind.is_list() {
                self.lines[i].is_first_line_of_list = false;
                self.lines[i].list_start_offset = 0;
                continue;
            }
            let head = match i.checked_sub(1).and_then(|p| self.lines.get(p)) {
                Some(prev) => {
                    prev.kind != self.lines[i].kind
                        || prev.indentation_level < self.lines[i].indentation_level
                }
                None => true,
            };
            if head {
                self.lines[i].is_first_line_of_list = true;
            }
        }
    }
}

/// Convert a character offset to a byte offset
fn char_to_byte(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}
