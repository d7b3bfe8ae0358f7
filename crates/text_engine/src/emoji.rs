//! Emoji cluster detection
//!
//! Emoji graphemes are collapsed into one atomic metrics record with a
//! square advance, so the pipeline needs to recognize them up front: ZWJ
//! sequences, variation-selector-16 presentation, keycaps, flags, and the
//! pictographic blocks.

pub const ZWJ: char = '\u{200d}';
pub const VARIATION_SELECTOR_16: char = '\u{fe0f}';
const COMBINING_ENCLOSING_KEYCAP: char = '\u{20e3}';

/// Whether a codepoint sits in an emoji-presentation block
pub fn is_emoji_codepoint(c: char) -> bool {
    matches!(c,
        '\u{1f300}'..='\u{1f5ff}'   // symbols & pictographs
        | '\u{1f600}'..='\u{1f64f}' // emoticons
        | '\u{1f680}'..='\u{1f6ff}' // transport
        | '\u{1f900}'..='\u{1f9ff}' // supplemental symbols
        | '\u{1fa70}'..='\u{1faff}' // extended-a
        | '\u{1f1e6}'..='\u{1f1ff}' // regional indicators
        | '\u{2600}'..='\u{26ff}'   // miscellaneous symbols
        | '\u{2700}'..='\u{27bf}'   // dingbats
        | '\u{2b00}'..='\u{2bff}'   // arrows & symbols
        | '\u{1f0cf}'
        | '\u{2139}'
        | '\u{2049}'
        | '\u{203c}')
}

/// Whether a grapheme cluster renders as an emoji
pub fn is_emoji_grapheme(grapheme: &str) -> bool {
    let mut chars = grapheme.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if grapheme.contains(ZWJ) || grapheme.contains(COMBINING_ENCLOSING_KEYCAP) {
        return true;
    }
    // "1" is not an emoji, "1" + VS16 (+ keycap) is
    if grapheme.contains(VARIATION_SELECTOR_16) {
        return true;
    }
    is_emoji_codepoint(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_emoji() {
        assert!(!is_emoji_grapheme("a"));
        assert!(!is_emoji_grapheme("1"));
        assert!(!is_emoji_grapheme("#"));
        assert!(!is_emoji_grapheme("\u{4e2d}"));
    }

    #[test]
    fn pictographs_are_emoji() {
        assert!(is_emoji_grapheme("\u{1f600}"));
        assert!(is_emoji_grapheme("\u{2764}\u{fe0f}"));
    }

    #[test]
    fn zwj_sequences_are_emoji() {
        let family = "\u{1f468}\u{200d}\u{1f469}\u{200d}\u{1f466}";
        assert!(is_emoji_grapheme(family));
    }

    #[test]
    fn keycaps_and_flags_are_emoji() {
        assert!(is_emoji_grapheme("1\u{fe0f}\u{20e3}"));
        assert!(is_emoji_grapheme("\u{1f1ef}\u{1f1f5}"));
    }
}
