//! ms-core: shared error type, session options, output formats, and the
//! seek-position arithmetic used by the streaming driver.
//!
//! This crate is the foundational dependency for the other ms-* crates and
//! carries no async or FFI code.

pub mod config;
pub mod error;
pub mod format;
pub mod position;

// Re-export the most commonly used items at the crate root.
pub use config::AnalyzeOptions;
pub use error::{Error, Result};
pub use format::{EngineOutputKind, OutputFormat};
pub use position::SeekWords;
