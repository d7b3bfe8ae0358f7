//! Embedded minimal glyph set for list markers
//!
//! List markers only ever need the bullet, the period, digits, and
//! lowercase letters. When the resolved font lacks coverage for a marker
//! character this table supplies a last-resort glyph: a correct advance
//! plus a schematic outline (markers must keep occupying their horizontal
//! slot even when the real outline is unavailable).
//!
//! All values are in a 1000 units-per-em space with ascent 800.

pub const MARKER_UNITS_PER_EM: u16 = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerGlyph {
    /// Horizontal advance in font units
    pub advance: i32,
    /// Schematic outline in font units
    pub path: &'static str,
}

// Filled disc centered on the lowercase body, for "•"
const BULLET_PATH: &str =
    "M150 350Q150 480 280 480Q410 480 410 350Q410 220 280 220Q150 220 150 350Z";
// Small square sitting on the baseline, for "."
const PERIOD_PATH: &str = "M80 0L80 120L200 120L200 0Z";
// Hollow box spanning the cap height, for digits
const DIGIT_PATH: &str = "M80 0L80 700L520 700L520 0ZM140 60L460 60L460 640L140 640Z";
// Hollow box spanning the x-height, for lowercase letters
const LETTER_PATH: &str = "M70 0L70 500L450 500L450 0ZM130 60L390 60L390 440L130 440Z";

/// The embedded glyph for a marker character, `None` for characters the
/// marker set does not carry
pub fn marker_glyph(c: char) -> Option<MarkerGlyph> {
    match c {
        '\u{2022}' => Some(MarkerGlyph {
            advance: 560,
            path: BULLET_PATH,
        }),
        '.' => Some(MarkerGlyph {
            advance: 280,
            path: PERIOD_PATH,
        }),
        '0'..='9' => Some(MarkerGlyph {
            advance: 600,
            path: DIGIT_PATH,
        }),
        'i' | 'l' => Some(MarkerGlyph {
            advance: 260,
            path: LETTER_PATH,
        }),
        'j' | 'f' | 't' | 'r' => Some(MarkerGlyph {
            advance: 360,
            path: LETTER_PATH,
        }),
        'm' | 'w' => Some(MarkerGlyph {
            advance: 840,
            path: LETTER_PATH,
        }),
        'a'..='z' => Some(MarkerGlyph {
            advance: 540,
            path: LETTER_PATH,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_marker_alphabet() {
        for c in "\u{2022}.0123456789abcdefghijklmnopqrstuvwxyz".chars() {
            assert!(marker_glyph(c).is_some(), "missing marker glyph for {c:?}");
        }
    }

    #[test]
    fn rejects_other_characters() {
        assert!(marker_glyph('A').is_none());
        assert!(marker_glyph(' ').is_none());
        assert!(marker_glyph('\u{4e2d}').is_none());
    }

    #[test]
    fn narrow_letters_advance_less() {
        let narrow = marker_glyph('i').unwrap().advance;
        let wide = marker_glyph('m').unwrap().advance;
        assert!(narrow < wide);
    }
}
