//! Loaded-font registry with asynchronous acquisition bookkeeping
//!
//! The store never blocks: a font that is not yet available yields `None`
//! and enqueues a [`FontRequest`] exactly once (deduplicated by the pending
//! set). The host drains requests with `take_pending_font_requests`,
//! fetches the bytes however it likes, and hands them back through
//! `install_font_data`, which is a no-op for keys that are no longer
//! pending.

use crate::error::{Result, TextEngineError};
use crate::font::FontFace;
use crate::harf::HarfFace;
use crate::script::{ScriptDetector, WhatlangDetector};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use text_model::{FontName, TextStyle};

/// A font resource the host should fetch. `url` is set for fallback
/// resources with a known download location; style fonts are identified to
/// the host by key alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRequest {
    pub key: String,
    pub url: Option<String>,
}

/// Cache-or-fetch persistence for font binaries
pub trait ResourceCache: Send + Sync {
    fn read(&self, key: &str, url: &str) -> Result<Vec<u8>>;
    fn write(&self, key: &str, bytes: &[u8]);
}

pub struct FontStore {
    faces: HashMap<String, Arc<dyn FontFace>>,
    pending: HashSet<String>,
    queue: Vec<FontRequest>,
    detector: Box<dyn ScriptDetector>,
}

impl Default for FontStore {
    fn default() -> Self {
        Self {
            faces: HashMap::new(),
            pending: HashSet::new(),
            queue: Vec::new(),
            detector: Box::new(WhatlangDetector::new()),
        }
    }
}

impl FontStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detector(detector: Box<dyn ScriptDetector>) -> Self {
        Self {
            detector,
            ..Self::default()
        }
    }

    /// Register an already-loaded face under a resource key
    pub fn install_face(&mut self, key: impl Into<String>, face: Arc<dyn FontFace>) {
        let key = key.into();
        self.pending.remove(&key);
        self.queue.retain(|r| r.key != key);
        self.faces.insert(key, face);
    }

    pub fn has_face(&self, key: &str) -> bool {
        self.faces.contains_key(key)
    }

    /// Requests enqueued since the last call; the keys stay pending so
    /// repeated layout passes do not re-request them
    pub fn take_pending_font_requests(&mut self) -> Vec<FontRequest> {
        std::mem::take(&mut self.queue)
    }

    /// Deliver fetched font bytes. `Ok(true)` means the data was installed
    /// and the caller should re-run layout once; deliveries for keys that
    /// are no longer pending are ignored with `Ok(false)`.
    pub fn install_font_data(&mut self, key: &str, bytes: Vec<u8>) -> Result<bool> {
        if !self.pending.remove(key) {
            tracing::debug!(key, "ignoring font data for non-pending key");
            return Ok(false);
        }
        let (family, style) = split_key(key);
        let face = HarfFace::from_bytes(family, style, bytes).map_err(|err| {
            tracing::warn!(key, error = %err, "dropping unparsable font data");
            err
        })?;
        tracing::debug!(key, "font installed");
        self.faces.insert(key.to_string(), Arc::new(face));
        Ok(true)
    }

    /// The face for a style's font, with its variation axes applied.
    /// Missing fonts enqueue a request and yield `None`.
    pub fn resolve_style_font(
        &mut self,
        font_name: &FontName,
        variations: &BTreeMap<String, f32>,
    ) -> Option<Arc<dyn FontFace>> {
        let key = font_name.cache_key();
        match self.faces.get(&key) {
            Some(face) => {
                let face = Arc::clone(face);
                if variations.is_empty() {
                    Some(face)
                } else {
                    Some(face.variation(variations).unwrap_or(face))
                }
            }
            None => {
                self.request(key, None);
                None
            }
        }
    }

    /// A fallback face for a character the style font cannot render,
    /// preferring a variation-axis match to the requesting style, then a
    /// named-style match, then the fallback's default instance
    pub fn resolve_fallback(&mut self, c: char, style: &TextStyle) -> Option<Arc<dyn FontFace>> {
        let script = self.detector.detect(c)?;
        let (key, url) = match script.resource() {
            Some((key, url)) => (key, url),
            // Latin falls back to the style font itself; a miss there means
            // there is nothing better to offer
            None => return None,
        };
        match self.faces.get(key) {
            Some(face) => {
                let face = Arc::clone(face);
                if !style.font_variations.is_empty() {
                    if let Some(varied) = face.variation(&style.font_variations) {
                        return Some(varied);
                    }
                }
                if let Some(named) = face.named_instance(&style.font_name.style) {
                    return Some(named);
                }
                Some(face)
            }
            None => {
                self.request(key.to_string(), Some(url.to_string()));
                None
            }
        }
    }

    fn request(&mut self, key: String, url: Option<String>) {
        if self.pending.insert(key.clone()) {
            tracing::debug!(key = %key, "font requested");
            self.queue.push(FontRequest { key, url });
        }
    }
}

/// Seed the store from a resource cache (e.g. at startup for fonts that
/// were persisted by an earlier session)
pub fn preload(
    store: &mut FontStore,
    cache: &dyn ResourceCache,
    entries: &[(String, String)],
) -> Result<()> {
    for (key, url) in entries {
        let bytes = cache.read(key, url)?;
        let (family, style) = split_key(key);
        let face =
            HarfFace::from_bytes(family, style, bytes).map_err(|_| {
                TextEngineError::InvalidFontData(format!("cached font {key} unparsable"))
            })?;
        store.install_face(key.clone(), Arc::new(face));
    }
    Ok(())
}

/// Style-font keys look like "family#style#postscript"; fallback keys are
/// plain resource names
fn split_key(key: &str) -> (String, String) {
    let mut parts = key.split('#');
    let family = parts.next().unwrap_or(key).to_string();
    let style = parts.next().unwrap_or("Regular").to_string();
    (family, style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFace;

    #[test]
    fn missing_font_is_requested_once() {
        let mut store = FontStore::new();
        let name = FontName::new("Inter", "Regular");
        let axes = BTreeMap::new();

        assert!(store.resolve_style_font(&name, &axes).is_none());
        assert!(store.resolve_style_font(&name, &axes).is_none());

        let requests = store.take_pending_font_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].key, name.cache_key());
        assert!(requests[0].url.is_none());

        // Still pending, so no re-enqueue
        assert!(store.resolve_style_font(&name, &axes).is_none());
        assert!(store.take_pending_font_requests().is_empty());
    }

    #[test]
    fn installed_face_resolves() {
        let mut store = FontStore::new();
        let name = FontName::new("Inter", "Regular");
        store.install_face(name.cache_key(), Arc::new(FakeFace::new()));
        let face = store.resolve_style_font(&name, &BTreeMap::new());
        assert!(face.is_some());
    }

    #[test]
    fn stale_delivery_is_ignored() {
        let mut store = FontStore::new();
        assert_eq!(
            store.install_font_data("never-requested", vec![0, 1, 2]).ok(),
            Some(false)
        );
    }

    #[test]
    fn cjk_fallback_is_requested_with_url() {
        let mut store = FontStore::new();
        let style = TextStyle::default();
        assert!(store.resolve_fallback('\u{d55c}', &style).is_none());
        let requests = store.take_pending_font_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].key, "noto-sans-cjk-kr");
        assert!(requests[0].url.is_some());
    }

    #[test]
    fn installed_fallback_resolves() {
        let mut store = FontStore::new();
        let style = TextStyle::default();
        store.install_face("noto-sans-cjk-kr", Arc::new(FakeFace::new()));
        assert!(store.resolve_fallback('\u{d55c}', &style).is_some());
    }
}
