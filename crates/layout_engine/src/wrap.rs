//! Word grouping and greedy line wrapping
//!
//! Wrap units: a maximal run of ordinary ASCII-printable records is one
//! word, every other record stands alone. The wrapper is greedy per
//! physical line against a budget of `available width - indentation`, with
//! three special rules: a trailing space never forces a wrap, a word wider
//! than the whole budget is hard-split record by record, and an explicit
//! break always closes its line. A paragraph indent wider than the budget
//! pushes the paragraph's first line down instead of overflowing.

use text_engine::{MetricsRecord, RecordClass};
use text_model::{LineKind, TextData};

/// Indentation multiplier: pixels = level * font_size * this
const INDENT_EM_FACTOR: f32 = 1.5;

/// One physical (wrapped) line
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub records: Vec<MetricsRecord>,
    /// Index of the logical line this physical line belongs to
    pub logical_line: usize,
    /// First physical line of its logical line
    pub starts_paragraph: bool,
    /// Closed by an explicit break (the break record is included)
    pub ends_with_break: bool,
    /// Horizontal offset consumed by the paragraph indent
    pub paragraph_indent: f32,
    pub first_character: usize,
    pub end_character: usize,
}

impl WrappedLine {
    /// Sum of record advances, excluding the trailing letter-spacing of the
    /// last visible record
    pub fn width(&self) -> f32 {
        let total: f32 = self.records.iter().map(|r| r.x_advance).sum();
        let correction = self
            .records
            .iter()
            .rev()
            .find(|r| !r.is_break())
            .map(|r| r.letter_spacing)
            .unwrap_or(0.0);
        (total - correction).max(0.0)
    }

    /// Width excluding trailing spaces, used by justification and
    /// right/center alignment
    pub fn width_sans_trailing_spaces(&self) -> f32 {
        let trailing: f32 = self
            .records
            .iter()
            .rev()
            .skip_while(|r| r.is_break())
            .take_while(|r| r.is_space())
            .map(|r| r.x_advance)
            .sum();
        (self.width() - trailing).max(0.0)
    }
}

/// Indentation pixels for a logical line. List lines measure against the
/// style at their list head so sibling markers line up.
pub fn indentation_px(data: &TextData, line_index: usize) -> f32 {
    let line = match data.lines.get(line_index) {
        Some(line) => line,
        None => return 0.0,
    };
    if line.indentation_level == 0 {
        return 0.0;
    }
    let style_line = if line.kind.is_list() {
        list_head_line(data, line_index)
    } else {
        line_index
    };
    let starts = data.line_start_offsets();
    let start = starts.get(style_line).copied().unwrap_or(0);
    let font_size = data.style_at(start).font_size;
    line.indentation_level as f32 * font_size * INDENT_EM_FACTOR
}

/// The line index where this line's list run starts
pub fn list_head_line(data: &TextData, line_index: usize) -> usize {
    let line = match data.lines.get(line_index) {
        Some(line) if line.kind.is_list() => line,
        _ => return line_index,
    };
    let mut head = line_index;
    for j in (0..line_index).rev() {
        let prev = &data.lines[j];
        if prev.kind != line.kind || prev.indentation_level < line.indentation_level {
            break;
        }
        if prev.indentation_level == line.indentation_level {
            head = j;
            if prev.is_first_line_of_list {
                break;
            }
        }
    }
    if data.lines[line_index].is_first_line_of_list {
        line_index
    } else {
        head
    }
}

enum Token<'a> {
    Word(&'a [MetricsRecord]),
    Space(&'a MetricsRecord),
    Break(&'a MetricsRecord),
}

fn is_ascii_word_record(r: &MetricsRecord) -> bool {
    r.class == RecordClass::Ordinary
        && !r.code_points.is_empty()
        && r.code_points.iter().all(|&cp| (0x21..=0x7e).contains(&cp))
}

fn tokenize(records: &[MetricsRecord]) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < records.len() {
        match records[i].class {
            RecordClass::Break => {
                out.push(Token::Break(&records[i]));
                i += 1;
            }
            RecordClass::Space => {
                out.push(Token::Space(&records[i]));
                i += 1;
            }
            _ => {
                if is_ascii_word_record(&records[i]) {
                    let start = i;
                    while i < records.len() && is_ascii_word_record(&records[i]) {
                        i += 1;
                    }
                    out.push(Token::Word(&records[start..i]));
                } else {
                    out.push(Token::Word(&records[i..i + 1]));
                    i += 1;
                }
            }
        }
    }
    out
}

struct LineBuilder {
    lines: Vec<WrappedLine>,
    current: Vec<MetricsRecord>,
    current_width: f32,
    logical_line: usize,
    paragraph_indent: f32,
    emitted_for_logical: bool,
    cursor: usize,
}

impl LineBuilder {
    fn close(&mut self, ends_with_break: bool) {
        let first_character = self
            .current
            .first()
            .map(|r| r.first_character)
            .unwrap_or(self.cursor);
        let end_character = self
            .current
            .last()
            .map(|r| r.first_character + r.code_points.len().max(1))
            .unwrap_or(first_character);
        self.lines.push(WrappedLine {
            records: std::mem::take(&mut self.current),
            logical_line: self.logical_line,
            starts_paragraph: !self.emitted_for_logical,
            ends_with_break,
            paragraph_indent: self.paragraph_indent,
            first_character,
            end_character,
        });
        self.cursor = end_character;
        self.current_width = 0.0;
        self.paragraph_indent = 0.0;
        self.emitted_for_logical = true;
    }

    fn push(&mut self, r: &MetricsRecord) {
        self.current_width += r.x_advance;
        self.current.push(r.clone());
    }
}

/// Wrap the metrics sequence into physical lines. `available_width` of
/// `None` means auto width: only explicit breaks wrap.
pub fn wrap(
    data: &TextData,
    metrics: &[MetricsRecord],
    available_width: Option<f32>,
) -> Vec<WrappedLine> {
    let mut builder = LineBuilder {
        lines: Vec::new(),
        current: Vec::new(),
        current_width: 0.0,
        logical_line: 0,
        paragraph_indent: 0.0,
        emitted_for_logical: false,
        cursor: 0,
    };

    // Split records into logical lines at break records (the break closes
    // its line and stays with it)
    let mut logical_slices: Vec<&[MetricsRecord]> = Vec::new();
    let mut start = 0;
    for (i, r) in metrics.iter().enumerate() {
        if r.is_break() {
            logical_slices.push(&metrics[start..=i]);
            start = i + 1;
        }
    }
    logical_slices.push(&metrics[start..]);

    for (line_index, slice) in logical_slices.iter().enumerate() {
        builder.logical_line = line_index;
        builder.emitted_for_logical = false;

        let indent_px = indentation_px(data, line_index);
        let budget = available_width.map(|w| (w - indent_px).max(0.0));

        // Paragraph indent applies to the paragraph's first physical line
        let paragraph_indent = paragraph_indent_for(data, line_index);
        if paragraph_indent > 0.0 {
            match budget {
                Some(b) if paragraph_indent >= b => {
                    // Indent consumes the whole line: push the text down
                    builder.close(false);
                }
                Some(b) => builder.paragraph_indent = paragraph_indent.min(b),
                None => builder.paragraph_indent = paragraph_indent,
            }
        }

        for token in tokenize(slice) {
            match token {
                Token::Break(r) => {
                    builder.push(r);
                    builder.close(true);
                }
                Token::Space(r) => {
                    // Spaces never force a wrap
                    builder.push(r);
                }
                Token::Word(word) => {
                    let word_width: f32 = word.iter().map(|r| r.x_advance).sum();
                    match budget {
                        None => {
                            for r in word {
                                builder.push(r);
                            }
                        }
                        Some(b) => {
                            let used = builder.current_width + builder.paragraph_indent;
                            if word_width > b {
                                // Hard split record by record
                                for r in word {
                                    let used =
                                        builder.current_width + builder.paragraph_indent;
                                    if !builder.current.is_empty()
                                        && used + r.x_advance > b
                                    {
                                        builder.close(false);
                                    }
                                    builder.push(r);
                                }
                            } else if !builder.current.is_empty() && used + word_width > b {
                                builder.close(false);
                                for r in word {
                                    builder.push(r);
                                }
                            } else {
                                for r in word {
                                    builder.push(r);
                                }
                            }
                        }
                    }
                }
            }
        }

        // Flush the logical line's tail (or an empty trailing line)
        if !builder.current.is_empty() || !builder.emitted_for_logical {
            builder.close(false);
        }
    }

    builder.lines
}

fn paragraph_indent_for(data: &TextData, line_index: usize) -> f32 {
    let starts = data.line_start_offsets();
    let start = starts.get(line_index).copied().unwrap_or(0);
    let style = data.style_at(start);
    // Indent is a plain-paragraph affordance; list lines indent via level
    match data.lines.get(line_index) {
        Some(line) if line.kind == LineKind::Plain => style.paragraph_indent.max(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use text_engine::testing::FakeFace;
    use text_engine::{compute_metrics, FontStore};
    use text_model::{FontName, TextStyle};

    fn fixture(text: &str) -> (TextData, Vec<MetricsRecord>) {
        let mut style = TextStyle::default();
        style.font_size = 10.0; // 6.0 px per character
        let data = TextData::new(text, style);
        let mut store = FontStore::new();
        store.install_face(
            FontName::new("Inter", "Regular").cache_key(),
            Arc::new(FakeFace::new()),
        );
        let metrics = compute_metrics(&data, &mut store);
        (data, metrics)
    }

    fn ranges(lines: &[WrappedLine]) -> Vec<(usize, usize)> {
        lines
            .iter()
            .map(|l| (l.first_character, l.end_character))
            .collect()
    }

    #[test]
    fn unconstrained_width_only_breaks_wrap() {
        let (data, metrics) = fixture("ab\ncd");
        let lines = wrap(&data, &metrics, None);
        assert_eq!(ranges(&lines), vec![(0, 3), (3, 5)]);
        assert!(lines[0].ends_with_break);
        assert!(!lines[1].ends_with_break);
    }

    #[test]
    fn greedy_wrap_at_budget() {
        // "aaa bbb" at 6px/char; width 40 fits "aaa " (24) but not "aaa bbb"
        let (data, metrics) = fixture("aaa bbb");
        let lines = wrap(&data, &metrics, Some(40.0));
        assert_eq!(lines.len(), 2);
        assert_eq!(ranges(&lines), vec![(0, 4), (4, 7)]);
    }

    #[test]
    fn trailing_space_never_wraps() {
        // "aaaa" = 24px exactly fills width 24; the following space overflows
        // but must stay on the line
        let (data, metrics) = fixture("aaaa b");
        let lines = wrap(&data, &metrics, Some(24.0));
        assert_eq!(ranges(&lines)[0], (0, 5));
        assert_eq!(ranges(&lines)[1], (5, 6));
    }

    #[test]
    fn oversized_word_hard_splits() {
        let (data, metrics) = fixture("abcdefgh");
        let lines = wrap(&data, &metrics, Some(18.0)); // 3 chars per line
        assert_eq!(ranges(&lines), vec![(0, 3), (3, 6), (6, 8)]);
    }

    #[test]
    fn consecutive_breaks_make_empty_line() {
        let (data, metrics) = fixture("a\n\nb");
        let lines = wrap(&data, &metrics, None);
        assert_eq!(ranges(&lines), vec![(0, 2), (2, 3), (3, 4)]);
        assert_eq!(lines[1].records.len(), 1);
        assert!(lines[1].ends_with_break);
    }

    #[test]
    fn trailing_break_leaves_no_extra_line() {
        // The phantom line after a trailing break is a baseline-stage
        // concern; the wrapper ends at the break
        let (data, metrics) = fixture("ab\n");
        let lines = wrap(&data, &metrics, None);
        assert_eq!(ranges(&lines), vec![(0, 3)]);
    }

    #[test]
    fn empty_buffer_yields_one_empty_line() {
        let (data, metrics) = fixture("");
        let lines = wrap(&data, &metrics, Some(100.0));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].records.is_empty());
        assert_eq!(ranges(&lines), vec![(0, 0)]);
    }

    #[test]
    fn non_ascii_characters_wrap_individually() {
        // CJK: every character is its own wrap unit
        let (data, metrics) = fixture("\u{4e00}\u{4e01}\u{4e02}");
        let lines = wrap(&data, &metrics, Some(13.0)); // 2 chars of 6px
        assert_eq!(lines.len(), 2);
        assert_eq!(ranges(&lines), vec![(0, 2), (2, 3)]);
    }

    #[test]
    fn paragraph_indent_offsets_first_line() {
        let (mut data, _) = fixture("aaa bbb");
        data.style.paragraph_indent = 10.0;
        let mut store = FontStore::new();
        store.install_face(
            FontName::new("Inter", "Regular").cache_key(),
            Arc::new(FakeFace::new()),
        );
        let metrics = compute_metrics(&data, &mut store);
        // Budget 40: indent 10 + "aaa " (24) = 34 fits, "bbb" would overflow
        let lines = wrap(&data, &metrics, Some(40.0));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].paragraph_indent, 10.0);
        assert_eq!(lines[1].paragraph_indent, 0.0);
    }

    #[test]
    fn huge_paragraph_indent_pushes_line_down() {
        let (mut data, _) = fixture("ab");
        data.style.paragraph_indent = 100.0;
        let mut store = FontStore::new();
        store.install_face(
            FontName::new("Inter", "Regular").cache_key(),
            Arc::new(FakeFace::new()),
        );
        let metrics = compute_metrics(&data, &mut store);
        let lines = wrap(&data, &metrics, Some(50.0));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].records.is_empty());
        assert_eq!(lines[1].first_character, 0);
    }

    #[test]
    fn wrap_is_deterministic() {
        let (data, metrics) = fixture("the quick brown fox jumps");
        let a = wrap(&data, &metrics, Some(60.0));
        let b = wrap(&data, &metrics, Some(60.0));
        assert_eq!(a, b);
    }

    #[test]
    fn character_ranges_tile_the_buffer() {
        let (data, metrics) = fixture("the quick brown fox");
        let lines = wrap(&data, &metrics, Some(40.0));
        let mut cursor = 0;
        for line in &lines {
            assert_eq!(line.first_character, cursor);
            cursor = line.end_character;
        }
        assert_eq!(cursor, data.char_len());
    }

    proptest! {
        #[test]
        fn wrapping_partitions_the_text(text in "[a-z ]{1,60}", width in 10f32..80.0) {
            let (data, metrics) = fixture(&text);
            let lines = wrap(&data, &metrics, Some(width));
            let mut next = 0;
            for line in &lines {
                prop_assert_eq!(line.first_character, next);
                prop_assert!(line.end_character > line.first_character);
                next = line.end_character;
            }
            prop_assert_eq!(next, text.chars().count());
        }
    }
}
