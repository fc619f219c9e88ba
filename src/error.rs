//! Error types for voxmind.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("memo not found: {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("analysis gateway error: {0}")]
    Gateway(String),

    #[error("capture device unavailable: {0}")]
    Capture(String),

    #[error("nothing to capture")]
    EmptyInput,

    #[error("another capture is still being processed")]
    Busy,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
