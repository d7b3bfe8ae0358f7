//! Per-character script detection for fallback font selection
//!
//! Detection is range-based for the unambiguous blocks (kana, hangul) and
//! falls back to whatlang with a small language allowlist for Han
//! ideographs, which are shared between Chinese and Japanese.

use whatlang::{Detector, Lang};

/// Scripts the fallback chain can resolve a font for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackScript {
    Latin,
    SimplifiedChinese,
    Japanese,
    Korean,
}

impl FallbackScript {
    /// Cache key and download URL of the fallback font resource.
    /// Latin has no dedicated resource; it resolves to the store default.
    pub fn resource(self) -> Option<(&'static str, &'static str)> {
        match self {
            FallbackScript::Latin => None,
            FallbackScript::SimplifiedChinese => Some((
                "noto-sans-cjk-sc",
                "https://cdn.jsdelivr.net/gh/notofonts/noto-cjk@main/Sans/OTF/SimplifiedChinese/NotoSansCJKsc-Regular.otf",
            )),
            FallbackScript::Japanese => Some((
                "noto-sans-cjk-jp",
                "https://cdn.jsdelivr.net/gh/notofonts/noto-cjk@main/Sans/OTF/Japanese/NotoSansCJKjp-Regular.otf",
            )),
            FallbackScript::Korean => Some((
                "noto-sans-cjk-kr",
                "https://cdn.jsdelivr.net/gh/notofonts/noto-cjk@main/Sans/OTF/Korean/NotoSansCJKkr-Regular.otf",
            )),
        }
    }
}

pub trait ScriptDetector: Send + Sync {
    fn detect(&self, c: char) -> Option<FallbackScript>;
}

pub struct WhatlangDetector {
    detector: Detector,
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self {
            detector: Detector::with_allowlist(vec![Lang::Eng, Lang::Cmn, Lang::Jpn, Lang::Kor]),
        }
    }
}

impl WhatlangDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScriptDetector for WhatlangDetector {
    fn detect(&self, c: char) -> Option<FallbackScript> {
        if c.is_ascii() {
            return Some(FallbackScript::Latin);
        }
        // Kana and hangul are unambiguous by range
        if ('\u{3040}'..='\u{30ff}').contains(&c) || ('\u{31f0}'..='\u{31ff}').contains(&c) {
            return Some(FallbackScript::Japanese);
        }
        if ('\u{ac00}'..='\u{d7af}').contains(&c)
            || ('\u{1100}'..='\u{11ff}').contains(&c)
            || ('\u{3130}'..='\u{318f}').contains(&c)
        {
            return Some(FallbackScript::Korean);
        }
        let is_han = ('\u{4e00}'..='\u{9fff}').contains(&c)
            || ('\u{3400}'..='\u{4dbf}').contains(&c)
            || ('\u{f900}'..='\u{faff}').contains(&c);
        if is_han {
            let tagged = match self.detector.detect_lang(&c.to_string()) {
                Some(Lang::Jpn) => FallbackScript::Japanese,
                Some(Lang::Kor) => FallbackScript::Korean,
                _ => FallbackScript::SimplifiedChinese,
            };
            return Some(tagged);
        }
        match self.detector.detect_lang(&c.to_string()) {
            Some(Lang::Cmn) => Some(FallbackScript::SimplifiedChinese),
            Some(Lang::Jpn) => Some(FallbackScript::Japanese),
            Some(Lang::Kor) => Some(FallbackScript::Korean),
            Some(Lang::Eng) => Some(FallbackScript::Latin),
            _ => Some(FallbackScript::Latin),
        }
    }
}
