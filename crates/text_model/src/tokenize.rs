//! Grapheme segmentation and the double-click word tokenizer
//!
//! Both operate on character (not byte) offsets and produce half-open
//! ranges. [`graphemes`] feeds shaping and caret stepping;
//! [`word_tokenize`] classifies graphemes as space / symbol / word and
//! groups them by class for word selection and word deletion.

use unicode_segmentation::UnicodeSegmentation;

/// A grapheme with its half-open character-offset range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grapheme<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Split into grapheme clusters, tracking character (not byte) offsets
pub fn graphemes(text: &str) -> Vec<Grapheme<'_>> {
    let mut out = Vec::new();
    let mut offset = 0;
    for g in text.graphemes(true) {
        let len = g.chars().count();
        out.push(Grapheme {
            text: g,
            start: offset,
            end: offset + len,
        });
        offset += len;
    }
    out
}

// =============================================================================
// Word tokenization (selection units)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordTokenKind {
    Space,
    Symbol,
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordToken {
    pub kind: WordTokenKind,
    pub start: usize,
    pub end: usize,
}

fn is_printable_ascii(c: char) -> bool {
    ('\u{21}'..='\u{7e}').contains(&c)
}

fn is_symbol_char(c: char) -> bool {
    // ASCII punctuation plus CJK punctuation and fullwidth forms
    (is_printable_ascii(c) && !c.is_ascii_alphanumeric())
        || ('\u{3000}'..='\u{303f}').contains(&c)
        || ('\u{ff01}'..='\u{ff0f}').contains(&c)
        || ('\u{ff1a}'..='\u{ff20}').contains(&c)
        || ('\u{ff3b}'..='\u{ff40}').contains(&c)
        || ('\u{ff5b}'..='\u{ff65}').contains(&c)
}

fn classify_word_grapheme(g: &str) -> WordTokenKind {
    let mut chars = g.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return WordTokenKind::Space,
    };
    if g.chars().count() == 1 {
        if first.is_whitespace() {
            return WordTokenKind::Space;
        }
        if is_symbol_char(first) {
            return WordTokenKind::Symbol;
        }
    }
    WordTokenKind::Word
}

/// Selection units: consecutive graphemes of the same class group together
pub fn word_tokenize(text: &str) -> Vec<WordToken> {
    let mut out: Vec<WordToken> = Vec::new();
    for g in graphemes(text) {
        let kind = classify_word_grapheme(g.text);
        match out.last_mut() {
            Some(last) if last.kind == kind && last.end == g.start => {
                last.end = g.end;
            }
            _ => out.push(WordToken {
                kind,
                start: g.start,
                end: g.end,
            }),
        }
    }
    out
}

/// The word-token range containing `offset`, for double-click selection.
/// Offsets at or past the end map to the last token.
pub fn word_range_at(text: &str, offset: usize) -> Option<(usize, usize)> {
    let tokens = word_tokenize(text);
    let token = tokens
        .iter()
        .find(|t| t.start <= offset && offset < t.end)
        .or_else(|| tokens.last())?;
    Some((token.start, token.end))
}
