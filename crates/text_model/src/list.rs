//! List marker text generation
//!
//! Ordered lists cycle numeral / letter / roman forms by indentation level
//! (1 and 4 are arabic, 2 and 5 are letters, 3 and 6 are romans); letters
//! and romans are always lowercase. Unordered lists render a bullet at
//! every level. The ordinal of a line is found by walking backward through
//! same-kind siblings at the same indentation level until the list head.

use crate::text_data::{LineKind, TextData};

pub const BULLET: &str = "\u{2022}";

/// Marker text for a logical line, `None` for plain lines.
/// Ordered markers include the trailing period ("1.", "b.", "iii.").
pub fn marker_content(data: &TextData, line_index: usize) -> Option<String> {
    let line = data.lines.get(line_index)?;
    match line.kind {
        LineKind::Plain => None,
        LineKind::UnorderedList => Some(BULLET.to_string()),
        LineKind::OrderedList => {
            let ordinal = ordinal_for_line(data, line_index);
            Some(format!(
                "{}.",
                format_ordinal(line.indentation_level, ordinal)
            ))
        }
    }
}

/// 1-based ordinal of an ordered-list line, including the head's start
/// offset. Lines that are not ordered-list lines report 1.
pub fn ordinal_for_line(data: &TextData, line_index: usize) -> u32 {
    let line = match data.lines.get(line_index) {
        Some(line) if line.kind == LineKind::OrderedList => line,
        _ => return 1,
    };
    if line.is_first_line_of_list {
        return line.list_start_offset + 1;
    }

    let level = line.indentation_level;
    let mut count: u32 = 0;
    let mut start_offset: u32 = 0;
    for j in (0..line_index).rev() {
        let prev = &data.lines[j];
        if prev.kind != LineKind::OrderedList || prev.indentation_level < level {
            break;
        }
        if prev.indentation_level == level {
            count += 1;
            if prev.is_first_line_of_list {
                start_offset = prev.list_start_offset;
                break;
            }
        }
        // Deeper sublist lines are skipped without counting
    }
    start_offset + count + 1
}

/// Ordinal rendered in the form used at this indentation level
pub fn format_ordinal(level: u32, ordinal: u32) -> String {
    match (level.max(1) - 1) % 3 {
        0 => ordinal.to_string(),
        1 => format_letter(ordinal),
        _ => format_roman(ordinal),
    }
}

/// 1 -> "a", 26 -> "z", 27 -> "aa"
pub fn format_letter(mut n: u32) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Lowercase roman numerals; 0 renders empty
pub fn format_roman(mut n: u32) -> String {
    const TABLE: &[(u32, &str)] = &[
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for &(value, digits) in TABLE {
        while n >= value {
            out.push_str(digits);
            n -= value;
        }
    }
    out
}
