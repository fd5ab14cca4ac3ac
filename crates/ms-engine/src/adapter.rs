//! [`EngineAdapter`]: the driver-facing wrapper around one engine instance.

use std::fmt;

use ms_core::{Result, SeekWords};

use crate::engine::{status, Engine, EngineSettings};

/// Result of feeding one chunk.
///
/// Only [`FeedSignal::FINISHED`] (bit 0) carries meaning for the driver;
/// the remaining bits are reserved.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FeedSignal(u32);

impl FeedSignal {
    /// The engine wants more data.
    pub const CONTINUE: FeedSignal = FeedSignal(0);
    /// The engine has consumed enough data to produce its report.
    pub const FINISHED: FeedSignal = FeedSignal(1);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_finished(self) -> bool {
        self.0 & Self::FINISHED.0 != 0
    }

    /// Translate an engine status word (see [`status`]).
    pub const fn from_engine_status(raw: u32) -> Self {
        if raw & status::FINALIZED != 0 {
            Self::FINISHED
        } else {
            Self::CONTINUE
        }
    }
}

impl fmt::Debug for FeedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_finished() {
            write!(f, "FeedSignal(FINISHED)")
        } else {
            write!(f, "FeedSignal({:#x})", self.0)
        }
    }
}

/// Owns one engine instance for the duration of a session.
///
/// The adapter is the release guard for the instance: [`dispose`] closes it
/// exactly once, and dropping an adapter that was never disposed closes it
/// as well. The streaming driver only ever borrows the adapter.
///
/// [`dispose`]: EngineAdapter::dispose
pub struct EngineAdapter<E: Engine> {
    engine: E,
    settings: EngineSettings,
    disposed: bool,
}

impl<E: Engine> EngineAdapter<E> {
    pub fn new(engine: E, settings: EngineSettings) -> Self {
        Self {
            engine,
            settings,
            disposed: false,
        }
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Access the wrapped engine, e.g. to inspect a test double.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Declare the window `[offset, size)` the engine should expect next.
    pub fn initialize(&mut self, size: u64, offset: u64) {
        tracing::debug!(size, offset, "engine buffer init");
        self.engine.open_buffer_init(size, offset);
    }

    /// Feed one chunk.
    pub fn feed(&mut self, chunk: &[u8]) -> FeedSignal {
        let raw = self.engine.open_buffer_continue(chunk);
        let signal = FeedSignal::from_engine_status(raw);
        tracing::trace!(len = chunk.len(), raw, ?signal, "engine buffer continue");
        signal
    }

    /// Low word of the pending seek. Only meaningful right after a [`feed`]
    /// that did not finish.
    ///
    /// [`feed`]: EngineAdapter::feed
    pub fn pending_seek_low(&mut self) -> i32 {
        self.engine.open_buffer_continue_goto_get_lower()
    }

    /// High word of the pending seek.
    pub fn pending_seek_high(&mut self) -> i32 {
        self.engine.open_buffer_continue_goto_get_upper()
    }

    pub fn pending_seek_words(&mut self) -> SeekWords {
        let low = self.pending_seek_low();
        let high = self.pending_seek_high();
        SeekWords::new(low, high)
    }

    /// The pending seek as an absolute offset, or `None` to continue
    /// sequentially.
    pub fn pending_seek(&mut self) -> Result<Option<u64>> {
        self.pending_seek_words().reconcile()
    }

    pub fn finalize(&mut self) {
        tracing::debug!("engine buffer finalize");
        self.engine.open_buffer_finalize();
    }

    /// The raw report. Call after [`finalize`](EngineAdapter::finalize).
    pub fn produce_report(&mut self) -> String {
        self.engine.inform()
    }

    /// Release the engine instance.
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.disposed {
            self.disposed = true;
            tracing::debug!("engine disposed");
            self.engine.close();
        }
    }
}

impl<E: Engine> Drop for EngineAdapter<E> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<E: Engine> fmt::Debug for EngineAdapter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineAdapter")
            .field("settings", &self.settings)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
