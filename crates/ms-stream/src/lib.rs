//! # ms-stream
//!
//! Chunked streaming of arbitrarily large byte sources into a media
//! analysis engine.
//!
//! The engine is fed one bounded chunk at a time and may, after any chunk,
//! ask to continue sequentially or to jump to another offset (container
//! indexes often live at the end of a file). Nothing beyond the current
//! chunk is ever held in memory.
//!
//! ## Quick start
//!
//! ```no_run
//! use ms_core::{AnalyzeOptions, OutputFormat};
//! use ms_engine::NativeFactory;
//! use ms_stream::{analyze, source::FileSource};
//!
//! # async fn example() -> ms_core::Result<()> {
//! let factory = NativeFactory::load_default()?;
//! let mut source = FileSource::open("movie.mkv").await?;
//! let options = AnalyzeOptions::default().with_format(OutputFormat::Text);
//! let report = analyze(&factory, options, &mut source).await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod report;
pub mod session;
pub mod source;

// Re-export key types at crate root for convenience.
pub use controller::StreamController;
pub use report::{format_report, AnalysisOutput, MediaReport, Track};
pub use session::{analyze, Session};
pub use source::{ChunkSource, Immediate, SyncChunkSource};
