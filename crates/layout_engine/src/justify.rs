//! Slack redistribution for justified alignment
//!
//! Only lines that wrapped (not a paragraph's final physical line), contain
//! more than one word, and lay out against a fixed width are justified.
//! The unused width is spread evenly across every justified record: a
//! single-codepoint record outside the printable ASCII range that is not an
//! emoji, which covers spaces and CJK characters. Trailing spaces are
//! excluded from both the width and the gap set.

use crate::wrap::{indentation_px, WrappedLine};
use text_engine::{MetricsRecord, RecordClass};
use text_model::TextData;

fn is_justified_record(r: &MetricsRecord) -> bool {
    r.class != RecordClass::Emoji
        && r.class != RecordClass::Break
        && r.code_points.len() == 1
        && !(0x21..=0x7e).contains(&r.code_points[0])
}

fn word_count(line: &WrappedLine) -> usize {
    let mut count = 0;
    let mut in_word = false;
    for r in &line.records {
        let is_word = r.class == RecordClass::Ordinary || r.class == RecordClass::Emoji;
        if is_word && !in_word {
            count += 1;
        }
        in_word = is_word;
    }
    count
}

fn is_eligible(lines: &[WrappedLine], index: usize) -> bool {
    let line = &lines[index];
    if line.ends_with_break {
        return false;
    }
    // The paragraph's final physical line is left ragged
    let continues = lines
        .get(index + 1)
        .map(|next| next.logical_line == line.logical_line)
        .unwrap_or(false);
    continues && word_count(line) > 1
}

/// Redistribute slack on every eligible line, mutating record advances in
/// place. Call between wrapping and baseline placement.
pub fn apply(data: &TextData, lines: &mut [WrappedLine], available_width: f32) {
    for index in 0..lines.len() {
        if !is_eligible(lines, index) {
            continue;
        }
        let budget =
            (available_width - indentation_px(data, lines[index].logical_line)).max(0.0);
        let line = &mut lines[index];
        let natural = line.width_sans_trailing_spaces() + line.paragraph_indent;
        let slack = budget - natural;
        if slack <= 0.0 {
            continue;
        }

        // Trailing spaces are outside the justified region
        let visible_end = line
            .records
            .iter()
            .rposition(|r| !r.is_space())
            .map(|i| i + 1)
            .unwrap_or(0);
        let gaps: Vec<usize> = line.records[..visible_end]
            .iter()
            .enumerate()
            .filter(|(_, r)| is_justified_record(r))
            .map(|(i, _)| i)
            .collect();
        if gaps.is_empty() {
            continue;
        }
        let per_gap = slack / gaps.len() as f32;
        for i in gaps {
            line.records[i].x_advance += per_gap;
        }
    }
}
