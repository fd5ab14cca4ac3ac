//! Unified error type for mediascope.
//!
//! Every library crate funnels its failures into [`Error`]. The streaming
//! driver only ever produces [`Error::SourceRead`], [`Error::Format`] and
//! [`Error::ReconciliationOverflow`]; the remaining variants come from the
//! engine loader, configuration and file plumbing.

/// Unified error type covering all failure modes in mediascope.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The chunk source failed to report its size or to deliver a chunk.
    #[error("Source read error: {source}")]
    SourceRead {
        /// The failure reported by the source.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The engine's two seek words combined into an offset outside `u64`.
    #[error("Seek target out of range (low={low}, high={high})")]
    ReconciliationOverflow {
        /// Low-order word as surfaced by the engine.
        low: i32,
        /// High-order word as surfaced by the engine.
        high: i32,
    },

    /// The report could not be parsed into structured data.
    #[error("Format error: {0}")]
    Format(#[from] serde_json::Error),

    /// The analysis engine could not be loaded or created.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Session options failed validation or could not be parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// Catch-all for broken internal invariants.
    #[error("Internal error: {0}")]
    Internal(String),

    /// An I/O operation failed outside a chunk source.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Convenience constructor for [`Error::SourceRead`].
    pub fn source_read(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::SourceRead {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::Engine`].
    pub fn engine(message: impl Into<String>) -> Self {
        Error::Engine(message.into())
    }

    /// Whether this error originated in the caller's chunk source.
    pub fn is_source_read(&self) -> bool {
        matches!(self, Error::SourceRead { .. })
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
