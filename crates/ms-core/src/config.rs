//! Session options.
//!
//! [`AnalyzeOptions`] is fixed when a session is created: the engine is
//! constructed with the matching output kind and detail flags, and the
//! streaming driver reads its chunk size from here. Every field defaults
//! sensibly so an empty `{}` document is valid.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::format::OutputFormat;
use crate::Error;

/// Default number of bytes requested per read: 256 KiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 256 * 1024;

/// Reads beyond this size are allowed but flagged by [`AnalyzeOptions::validate`].
const LARGE_CHUNK_WARNING: u64 = 64 * 1024 * 1024;

/// Options recognised by a streaming session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeOptions {
    /// Include embedded cover art in the report.
    #[serde(alias = "coverData")]
    pub cover_data: bool,
    /// Bytes requested from the source per read.
    #[serde(alias = "chunkSize")]
    pub chunk_size: u64,
    /// Shape of the delivered result.
    pub format: OutputFormat,
    /// Ask the engine for its exhaustive field set.
    pub full: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            cover_data: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            format: OutputFormat::default(),
            full: false,
        }
    }
}

impl AnalyzeOptions {
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_cover_data(mut self, cover_data: bool) -> Self {
        self.cover_data = cover_data;
        self
    }

    pub fn with_full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }

    /// Deserialize options from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json_str)
            .map_err(|e| Error::Config(format!("options parse error: {e}")))?;
        options.check()?;
        Ok(options)
    }

    /// Reject options a session cannot run with.
    pub fn check(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be positive".into()));
        }
        if usize::try_from(self.chunk_size).is_err() {
            return Err(Error::Config(format!(
                "chunk_size {} does not fit in memory on this platform",
                self.chunk_size
            )));
        }
        Ok(())
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Err(e) = self.check() {
            warnings.push(e.to_string());
        }

        if self.chunk_size > LARGE_CHUNK_WARNING {
            warnings.push(format!(
                "chunk_size {} is larger than {} bytes; each read is held in memory",
                self.chunk_size, LARGE_CHUNK_WARNING
            ));
        }

        if self.cover_data && matches!(self.format, OutputFormat::Html | OutputFormat::Text) {
            warnings.push(format!(
                "cover_data is enabled but the {} format does not carry embedded art",
                self.format
            ));
        }

        warnings
    }
}
