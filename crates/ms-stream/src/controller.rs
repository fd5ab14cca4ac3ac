//! The read/feed/seek loop.
//!
//! [`StreamController`] borrows an [`EngineAdapter`] for one session and
//! drives it through
//!
//! ```text
//! Sizing -> Initialized -> Reading <-> Seeking -> Finalizing -> Done
//! ```
//!
//! Any source failure ends the session with [`Error::SourceRead`]. The
//! engine is left as it was last observed; releasing it is the owner's job.
//!
//! The only suspension points are the size query and each chunk read, and
//! the next read is only issued once the previous chunk has been fed, so at
//! most one read and one feed are ever in flight.

use ms_core::{Error, OutputFormat, Result};
use ms_engine::{Engine, EngineAdapter};
use tokio::sync::oneshot;

use crate::report::{format_report, AnalysisOutput};
use crate::source::ChunkSource;

/// Position in the streaming state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Sizing,
    Initialized { length: u64 },
    Reading { length: u64, offset: u64 },
    Seeking { length: u64, offset: u64, fed: u64 },
    Finalizing,
}

/// Counters kept for the closing log line.
#[derive(Debug, Default, Clone, Copy)]
struct Progress {
    reads: u64,
    bytes: u64,
    seeks: u64,
}

/// Drives one engine through one source.
pub struct StreamController<'a, E: Engine> {
    engine: &'a mut EngineAdapter<E>,
    chunk_size: usize,
    format: OutputFormat,
}

impl<'a, E: Engine> StreamController<'a, E> {
    /// `chunk_size` is the largest read ever requested and must be positive.
    pub fn new(
        engine: &'a mut EngineAdapter<E>,
        chunk_size: usize,
        format: OutputFormat,
    ) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk_size must be positive".into()));
        }
        Ok(Self {
            engine,
            chunk_size,
            format,
        })
    }

    /// Run the session and hand the outcome to `callback`.
    ///
    /// `callback` is invoked exactly once: with the formatted result and
    /// `None`, or with an empty placeholder and the error.
    pub async fn run_with<S, F>(self, source: &mut S, callback: F)
    where
        S: ChunkSource + ?Sized,
        F: FnOnce(AnalysisOutput, Option<Error>),
    {
        match self.drive(source).await {
            Ok(output) => callback(output, None),
            Err(err) => {
                tracing::warn!(error = %err, "analysis failed");
                callback(AnalysisOutput::empty(), Some(err));
            }
        }
    }

    /// Run the session and return its outcome.
    ///
    /// Wraps a single [`run_with`](Self::run_with) whose callback completes
    /// the returned value.
    pub async fn run<S>(self, source: &mut S) -> Result<AnalysisOutput>
    where
        S: ChunkSource + ?Sized,
    {
        let (tx, rx) = oneshot::channel();
        self.run_with(source, move |output, err| {
            let outcome = match err {
                Some(err) => Err(err),
                None => Ok(output),
            };
            let _ = tx.send(outcome);
        })
        .await;

        rx.await.unwrap_or_else(|_| {
            Err(Error::Internal(
                "completion callback was never invoked".into(),
            ))
        })
    }

    async fn drive<S>(mut self, source: &mut S) -> Result<AnalysisOutput>
    where
        S: ChunkSource + ?Sized,
    {
        let mut progress = Progress::default();
        let mut state = State::Sizing;

        loop {
            tracing::trace!(?state, "stream state");
            state = match state {
                State::Sizing => {
                    let length = source.size().await.map_err(Error::source_read)?;
                    tracing::debug!(length, chunk_size = self.chunk_size, "source sized");
                    State::Initialized { length }
                }

                State::Initialized { length } => {
                    self.engine.initialize(length, 0);
                    State::Reading { length, offset: 0 }
                }

                State::Reading { length, offset } => {
                    // n <= chunk_size, so the cast back to usize is lossless
                    let n = (self.chunk_size as u64).min(length.saturating_sub(offset));
                    if n == 0 {
                        State::Finalizing
                    } else {
                        let chunk = source
                            .read_chunk(n as usize, offset)
                            .await
                            .map_err(Error::source_read)?;
                        progress.reads += 1;
                        progress.bytes += chunk.len() as u64;

                        if chunk.is_empty() {
                            tracing::debug!(offset, "source exhausted early");
                            State::Finalizing
                        } else if self.engine.feed(&chunk).is_finished() {
                            State::Finalizing
                        } else {
                            State::Seeking {
                                length,
                                offset,
                                fed: chunk.len() as u64,
                            }
                        }
                    }
                }

                State::Seeking { length, offset, fed } => match self.engine.pending_seek()? {
                    None => State::Reading {
                        length,
                        offset: offset.saturating_add(fed),
                    },
                    Some(target) => {
                        // Re-initialize even when target == offset; the
                        // engine may depend on the init call itself.
                        tracing::debug!(from = offset, to = target, "engine requested seek");
                        progress.seeks += 1;
                        self.engine.initialize(length, target);
                        State::Reading {
                            length,
                            offset: target,
                        }
                    }
                },

                State::Finalizing => {
                    self.engine.finalize();
                    let raw = self.engine.produce_report();
                    tracing::debug!(
                        reads = progress.reads,
                        bytes = progress.bytes,
                        seeks = progress.seeks,
                        report_len = raw.len(),
                        "analysis finished"
                    );
                    return format_report(raw, self.format);
                }
            };
        }
    }
}
