//! The raw [`Engine`] boundary and the [`EngineFactory`] that produces it.

use ms_core::{AnalyzeOptions, EngineOutputKind};

/// Bits of the status word returned by [`Engine::open_buffer_continue`].
pub mod status {
    /// The engine recognised the container.
    pub const ACCEPTED: u32 = 0x01;
    /// Enough data was read to fill the basic fields.
    pub const FILLED: u32 = 0x02;
    /// Fields were updated by the last chunk.
    pub const UPDATED: u32 = 0x04;
    /// The engine has read everything it needs.
    pub const FINALIZED: u32 = 0x08;
}

/// Construction-time settings for an engine instance.
///
/// These are fixed for the lifetime of the instance; the report shape cannot
/// be changed mid-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub output_kind: EngineOutputKind,
    pub cover_data: bool,
    pub full: bool,
}

impl From<&AnalyzeOptions> for EngineSettings {
    fn from(options: &AnalyzeOptions) -> Self {
        Self {
            output_kind: options.format.engine_kind(),
            cover_data: options.cover_data,
            full: options.full,
        }
    }
}

/// One incremental analysis engine instance.
///
/// All calls are synchronous and mutate the instance. An instance is owned
/// by a single session and is never shared.
pub trait Engine: Send {
    /// Declare the logical window the engine should expect. Called again
    /// every time the driver jumps to a new offset.
    fn open_buffer_init(&mut self, size: u64, offset: u64);

    /// Hand the engine one chunk and return its status word (see [`status`]).
    fn open_buffer_continue(&mut self, data: &[u8]) -> u32;

    /// Low word of the pending "go to" offset, sign-extended.
    fn open_buffer_continue_goto_get_lower(&mut self) -> i32;

    /// High word of the pending "go to" offset, sign-extended.
    fn open_buffer_continue_goto_get_upper(&mut self) -> i32;

    /// Tell the engine no more data will arrive.
    fn open_buffer_finalize(&mut self);

    /// The report, in the output kind the instance was created with.
    fn inform(&mut self) -> String;

    /// Release the instance's internal state.
    fn close(&mut self);
}

/// Creates engine instances.
///
/// Destruction is the instance's `Drop`; [`Engine::close`] runs first.
pub trait EngineFactory {
    type Engine: Engine;

    /// Human-readable name of the backing engine.
    fn name(&self) -> &'static str;

    fn create(&self, settings: EngineSettings) -> ms_core::Result<Self::Engine>;
}
