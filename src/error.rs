//! Error types for the curator.

use curator_sources::SourceError;

/// Top-level error type for curation and linking.
#[derive(Debug, thiserror::Error)]
pub enum CuratorError {
    /// Invalid linking configuration or relation rules.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error while reading a settings file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Discovery failed as a whole.
    #[error("sources error: {0}")]
    Sources(#[from] SourceError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, CuratorError>;
