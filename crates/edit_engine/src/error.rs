//! Error types for editing

use text_engine::TextEngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Font(#[from] TextEngineError),
}

pub type Result<T> = std::result::Result<T, EditError>;
