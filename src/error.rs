// File: src/error.rs

/// Every failure the engine reports as an error rather than a value.
///
/// Rejected word submissions and dictionary mutation misses are not here:
/// they are ordinary outcomes and come back as `SubmitOutcome` / `bool`.
#[derive(Debug, thiserror::Error)]
pub enum KkutuError {
    #[error("expected exactly one character, got {input:?}")]
    InvalidInput { input: String },

    #[error("no start character is available for the current setting")]
    CannotStart,

    #[error("candidate set is empty after filtering")]
    NoCandidate,

    #[error("file is {size} bytes, limit is {limit}")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("unsupported file extension: {name}")]
    UnsupportedExtension { name: String },

    #[error("no round is active")]
    NotActive,

    #[error("a round is already in progress")]
    RoundInProgress,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(String),
}

impl From<bincode::Error> for KkutuError {
    fn from(e: bincode::Error) -> Self {
        KkutuError::Codec(e.to_string())
    }
}

impl From<serde_json::Error> for KkutuError {
    fn from(e: serde_json::Error) -> Self {
        KkutuError::Codec(e.to_string())
    }
}

impl From<toml::de::Error> for KkutuError {
    fn from(e: toml::de::Error) -> Self {
        KkutuError::Codec(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KkutuError>;
