//! Error types for wavedit

use crate::format::wav::ChunkId;
use thiserror::Error;

/// Result type alias for wavedit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wavedit
#[derive(Error, Debug)]
pub enum Error {
    /// IO error (open failures, truncated chunk bodies)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or incorrect RIFF magic / WAVE form id
    #[error("Format error: {0}")]
    Format(String),

    /// Inconsistent chunk schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// A value does not fit the width it was declared with
    #[error("Size error: {0}")]
    Size(String),

    /// Field value longer than its declared width
    #[error("Field '{field}' in chunk '{chunk}' holds {have} bytes but is declared with {width}")]
    FieldOverflow {
        chunk: ChunkId,
        field: String,
        width: u32,
        have: usize,
    },

    /// Chunk or field lookup miss
    #[error("Not found: {0}")]
    NotFound(String),

    /// A chunk every WAV file must carry is absent or about to be removed
    #[error("Required chunk '{0}' is missing or cannot be removed")]
    RequiredChunk(ChunkId),

    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a format error
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }

    /// Create a schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Error::Schema(msg.into())
    }

    /// Create a size error
    pub fn size<S: Into<String>>(msg: S) -> Self {
        Error::Size(msg.into())
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// True for both size error variants
    pub fn is_size(&self) -> bool {
        matches!(self, Error::Size(_) | Error::FieldOverflow { .. })
    }
}
