//! Style application over selections, list conversion, and indentation
//!
//! Overridable fields route through the override table for a ranged
//! selection, become a pending style at a collapsed caret, and mutate the
//! base style when nothing is selected. Element-wide fields go through
//! [`BaseStyleUpdate`] regardless of selection. Every path computes the
//! tightest invalidation tier from the touched fields.

use crate::editor::Editor;
use crate::events::EditorEvent;
use layout_engine::cache::tier_for;
use text_model::{
    override_store, AlignHorizontal, AlignVertical, AutoResize, InvalidationTier, LeadingTrim,
    LineKind, StyleField, StyleOverride, TextStyle, Toggle, MAX_PLAIN_INDENT, MIN_LIST_INDENT,
};

/// A partial update to the element-wide (non-overridable) style fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseStyleUpdate {
    pub text_auto_resize: Option<AutoResize>,
    pub text_align_horizontal: Option<AlignHorizontal>,
    pub text_align_vertical: Option<AlignVertical>,
    pub paragraph_indent: Option<f32>,
    pub text_truncation: Option<Toggle>,
    pub max_lines: Option<usize>,
    pub leading_trim: Option<LeadingTrim>,
}

impl BaseStyleUpdate {
    fn touched(&self) -> Vec<StyleField> {
        let mut fields = Vec::new();
        if self.text_auto_resize.is_some() {
            fields.push(StyleField::TextAutoResize);
        }
        if self.text_align_horizontal.is_some() {
            fields.push(StyleField::TextAlignHorizontal);
        }
        if self.text_align_vertical.is_some() {
            fields.push(StyleField::TextAlignVertical);
        }
        if self.paragraph_indent.is_some() {
            fields.push(StyleField::ParagraphIndent);
        }
        if self.text_truncation.is_some() {
            fields.push(StyleField::TextTruncation);
        }
        if self.max_lines.is_some() {
            fields.push(StyleField::MaxLines);
        }
        if self.leading_trim.is_some() {
            fields.push(StyleField::LeadingTrim);
        }
        fields
    }
}

/// The distinct resolved styles a selection touches, for inspector UIs.
/// A field is "mixed" when `uniform` returns `None` for its accessor.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionStyles {
    pub styles: Vec<TextStyle>,
}

impl SelectionStyles {
    pub fn uniform<T, F>(&self, get: F) -> Option<T>
    where
        T: PartialEq,
        F: Fn(&TextStyle) -> T,
    {
        let mut values = self.styles.iter().map(get);
        let first = values.next()?;
        for value in values {
            if value != first {
                return None;
            }
        }
        Some(first)
    }
}

impl Editor {
    /// Apply an overridable partial style to the selection. A collapsed
    /// caret stashes it for the next insertion; no selection restyles the
    /// whole element.
    pub fn apply_style(&mut self, partial: &StyleOverride) {
        if partial.is_empty() {
            return;
        }
        let fields = partial.set_fields();
        match self.selection_range() {
            Some((start, end)) => {
                override_store::apply_style(&mut self.data, start, end, partial);
            }
            None if self.selection.has_selection() && self.data.char_len() > 0 => {
                let merged = self
                    .pending_style
                    .take()
                    .unwrap_or_default()
                    .merged_with(partial);
                self.pending_style = Some(merged);
                self.events.emit(EditorEvent::StyleChanged);
                return;
            }
            None => {
                let len = self.data.char_len();
                override_store::apply_style(&mut self.data, 0, len, partial);
            }
        }
        self.invalidate(tier_for(&fields));
        self.apply();
        self.events.emit(EditorEvent::StyleChanged);
    }

    /// Mutate element-wide style fields
    pub fn set_base_style(&mut self, update: &BaseStyleUpdate) {
        let fields = update.touched();
        if fields.is_empty() {
            return;
        }
        let style = &mut self.data.style;
        if let Some(mode) = update.text_auto_resize {
            style.text_auto_resize = mode;
        }
        if let Some(align) = update.text_align_horizontal {
            style.text_align_horizontal = align;
        }
        if let Some(align) = update.text_align_vertical {
            style.text_align_vertical = align;
        }
        if let Some(indent) = update.paragraph_indent {
            style.paragraph_indent = indent;
        }
        if let Some(truncation) = update.text_truncation {
            style.text_truncation = truncation;
        }
        if let Some(max_lines) = update.max_lines {
            style.max_lines = max_lines;
        }
        if let Some(trim) = update.leading_trim {
            style.leading_trim = trim;
        }
        self.invalidate(tier_for(&fields));
        self.apply();
        self.events.emit(EditorEvent::StyleChanged);
    }

    /// The resolved styles the selection touches: one per distinct run for
    /// a range, the caret's style (pending style included) when collapsed,
    /// the base style when nothing is selected
    pub fn styles_for_selection(&self) -> SelectionStyles {
        match self.selection_range() {
            Some((start, end)) => {
                let ids = override_store::ids_in_range(&self.data, start, end);
                SelectionStyles {
                    styles: ids.iter().map(|&id| self.data.style_for_id(id)).collect(),
                }
            }
            None if self.selection.has_selection() => {
                let caret = self.focus_abs();
                let id = if caret > 0 {
                    self.style_id_at(caret - 1)
                } else {
                    self.style_id_at(caret)
                };
                let mut style = self.data.style_for_id(id);
                if let Some(pending) = &self.pending_style {
                    style = style.with_override(pending);
                }
                SelectionStyles {
                    styles: vec![style],
                }
            }
            None => SelectionStyles {
                styles: vec![self.data.style.clone()],
            },
        }
    }

    // =========================================================================
    // Per-line properties
    // =========================================================================

    /// Extra spacing after every selected logical line
    pub fn set_paragraph_spacing(&mut self, spacing: f32) {
        let (first, last) = self.selected_line_range();
        for line in self.data.lines[first..=last].iter_mut() {
            line.paragraph_spacing = spacing;
        }
        self.invalidate(InvalidationTier::Metrics);
        self.apply();
        self.events.emit(EditorEvent::StyleChanged);
    }

    /// The common paragraph spacing of the selected lines, `None` when mixed
    pub fn paragraph_spacing(&self) -> Option<f32> {
        let (first, last) = self.selected_line_range();
        let mut values = self.data.lines[first..=last].iter().map(|l| l.paragraph_spacing);
        let head = values.next()?;
        values.all(|v| v == head).then_some(head)
    }

    /// Convert the selected lines to the given list kind (or back to plain).
    /// `start_offset` shifts the numbering of the run's first line.
    pub fn set_list_kind(&mut self, kind: LineKind, start_offset: Option<u32>) {
        let (first, last) = self.selected_line_range();
        for line in self.data.lines[first..=last].iter_mut() {
            line.kind = kind;
            if kind.is_list() {
                line.indentation_level = line.indentation_level.max(MIN_LIST_INDENT);
            } else {
                line.indentation_level = line.indentation_level.min(MAX_PLAIN_INDENT);
                line.is_first_line_of_list = false;
                line.list_start_offset = 0;
            }
        }
        if kind.is_list() {
            let head = &mut self.data.lines[first];
            head.is_first_line_of_list = true;
            if let Some(offset) = start_offset {
                head.list_start_offset = offset;
            }
        }
        self.data.fix_lines();
        self.invalidate(InvalidationTier::Metrics);
        self.apply();
        self.events.emit(EditorEvent::StyleChanged);
    }

    pub fn add_indent(&mut self) {
        self.shift_indent(1);
    }

    pub fn reduce_indent(&mut self) {
        self.shift_indent(-1);
    }

    fn shift_indent(&mut self, delta: i32) {
        let (first, last) = self.selected_line_range();
        for line in self.data.lines[first..=last].iter_mut() {
            let level = (line.indentation_level as i32 + delta).max(0);
            line.indentation_level = level as u32;
            line.clamp_indentation();
        }
        self.data.fix_lines();
        self.invalidate(InvalidationTier::Metrics);
        self.apply();
        self.events.emit(EditorEvent::StyleChanged);
    }

    /// Inclusive logical-line range the selection covers; every line when
    /// nothing is selected
    fn selected_line_range(&self) -> (usize, usize) {
        let last_line = self.data.lines.len().saturating_sub(1);
        if !self.selection.has_selection() {
            return (0, last_line);
        }
        match self.selection_range() {
            Some((start, end)) => {
                let first = self.data.line_index_for_character(start);
                let last = self
                    .data
                    .line_index_for_character(end.saturating_sub(1).max(start));
                (first.min(last_line), last.min(last_line))
            }
            None => {
                let line = self.data.line_index_for_character(self.focus_abs());
                (line.min(last_line), line.min(last_line))
            }
        }
    }
}
