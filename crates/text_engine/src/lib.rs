//! Text Engine - font resolution, shaping, and per-cluster metrics
//!
//! This crate turns the character buffer into the ordered metrics-record
//! sequence the layout engine consumes. Shaping is done with rustybuzz
//! behind the [`FontFace`] trait; fonts that are not yet available resolve
//! through a script-detected fallback chain and an asynchronous
//! pending-request set owned by the [`FontStore`].
//!
//! # Modules
//!
//! - `font`: the font/face abstraction and shaping feature flags
//! - `harf`: rustybuzz-backed production font face
//! - `store`: loaded-font registry, fallback resolution, pending requests
//! - `script`: per-character script detection for fallback selection
//! - `emoji`: emoji cluster detection
//! - `marker_font`: embedded minimal glyph subset for list markers
//! - `metrics`: the per-cluster metrics record
//! - `shape`: the shaping pipeline

mod error;
mod font;
mod metrics;

pub mod emoji;
pub mod harf;
pub mod marker_font;
pub mod script;
pub mod shape;
pub mod store;
pub mod testing;

pub use error::*;
pub use font::*;
pub use metrics::*;

pub use harf::HarfFace;
pub use script::{FallbackScript, ScriptDetector, WhatlangDetector};
pub use shape::compute_metrics;
pub use store::{FontRequest, FontStore, ResourceCache};
