//! Error types for the curator-sources crate.
//!
//! Per-source failures ([`SourceError::Timeout`], [`SourceError::Call`]) are
//! absorbed by the coordinator and surfaced only as data in the result's
//! performance metrics. [`SourceError::NoEnabledSources`] is the one
//! condition a discovery call returns to its caller.

/// Errors that can occur while registering, querying, or merging sources.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// A source did not answer within its configured timeout.
    #[error("source {source_id} timed out after {timeout_ms}ms")]
    Timeout {
        /// Registry identifier of the slow source.
        source_id: String,
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// A source call returned an error or its task panicked.
    #[error("source {source_id} failed: {message}")]
    Call {
        /// Registry identifier of the failing source.
        source_id: String,
        /// Description of the failure.
        message: String,
    },

    /// Raised by connector implementations for a hard failure.
    #[error("connector error: {0}")]
    Connector(String),

    /// No enabled source matched the request.
    #[error("no sources available")]
    NoEnabledSources,

    /// The requested source is not registered.
    #[error("unknown source: {0}")]
    UnknownSource(String),

    /// Invalid source or coordinator configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SourceError {
    /// Returns `true` for failures that are recorded per source instead of
    /// being returned from a discovery call.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Call { .. } | Self::Connector(_)
        )
    }
}

/// Convenience type alias for curator-sources results.
pub type Result<T> = std::result::Result<T, SourceError>;
