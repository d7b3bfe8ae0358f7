//! Text-case transforms applied to the buffer before shaping
//!
//! The transform is per character so that overrides can change case over a
//! sub-range, and it must preserve the character count (derived tables are
//! indexed by character offset). Mappings that would expand (e.g. sharp s)
//! keep only their first scalar value.

use crate::style::TextCase;

/// Transform `text` character by character; `case_at` resolves the
/// effective text case for each character offset.
pub fn apply_case(text: &str, case_at: impl Fn(usize) -> TextCase) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for (i, c) in text.chars().enumerate() {
        let mapped = match case_at(i) {
            TextCase::None => c,
            TextCase::Upper => first_scalar(c.to_uppercase(), c),
            TextCase::Lower => first_scalar(c.to_lowercase(), c),
            TextCase::Title => {
                let at_word_start = prev.map(|p| !p.is_alphanumeric()).unwrap_or(true);
                if at_word_start {
                    first_scalar(c.to_uppercase(), c)
                } else {
                    first_scalar(c.to_lowercase(), c)
                }
            }
        };
        out.push(mapped);
        prev = Some(c);
    }
    out
}

fn first_scalar(mut iter: impl Iterator<Item = char>, fallback: char) -> char {
    iter.next().unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_and_lower() {
        assert_eq!(apply_case("Hello", |_| TextCase::Upper), "HELLO");
        assert_eq!(apply_case("Hello", |_| TextCase::Lower), "hello");
        assert_eq!(apply_case("Hello", |_| TextCase::None), "Hello");
    }

    #[test]
    fn title_uppercases_word_starts() {
        assert_eq!(
            apply_case("hello world, ONE", |_| TextCase::Title),
            "Hello World, One"
        );
    }

    #[test]
    fn mixed_cases_by_offset() {
        // Upper for [0,2), none beyond
        let out = apply_case("abcd", |i| {
            if i < 2 {
                TextCase::Upper
            } else {
                TextCase::None
            }
        });
        assert_eq!(out, "ABcd");
    }

    #[test]
    fn character_count_is_preserved() {
        let input = "stra\u{df}e 本";
        let out = apply_case(input, |_| TextCase::Upper);
        assert_eq!(out.chars().count(), input.chars().count());
    }
}
