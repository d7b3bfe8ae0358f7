//! Error types for text engine

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextEngineError {
    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Invalid font data: {0}")]
    InvalidFontData(String),

    #[error("Shaping failed: {0}")]
    ShapingFailed(String),
}

pub type Result<T> = std::result::Result<T, TextEngineError>;
