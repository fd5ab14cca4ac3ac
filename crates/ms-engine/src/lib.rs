//! # ms-engine
//!
//! The boundary between the streaming driver and the media analysis engine.
//!
//! - [`Engine`] is the raw buffer API an engine instance exposes
//!   (`open_buffer_init`, `open_buffer_continue`, the two "go to" words,
//!   `open_buffer_finalize`, `inform`, `close`).
//! - [`EngineFactory`] creates instances for a given [`EngineSettings`].
//! - [`EngineAdapter`] wraps one instance, translates its status word into a
//!   [`FeedSignal`], reconciles seek targets, and releases the instance
//!   exactly once.
//! - [`NativeFactory`] loads MediaInfoLib at runtime; [`ScriptedEngine`] is
//!   a deterministic in-process engine for tests and benchmarks.

pub mod adapter;
pub mod engine;
pub mod native;
pub mod scripted;

// Re-export key types at crate root for convenience.
pub use adapter::{EngineAdapter, FeedSignal};
pub use engine::{status, Engine, EngineFactory, EngineSettings};
pub use native::{NativeEngine, NativeFactory};
pub use scripted::{CallLog, EngineCall, Script, ScriptedEngine, ScriptedFactory};
