//! Chunk sources: where the bytes being analysed come from.
//!
//! A [`ChunkSource`] answers two questions, the total size and "give me up to
//! `n` bytes at `offset`", and may answer either immediately or after
//! suspending. Both shapes go through the same `async` interface; a source
//! with synchronous answers is wrapped in [`Immediate`], whose futures are
//! ready on their first poll, so the driver has a single code path either way.
//!
//! Near the end of the data a source returns fewer bytes than asked for, and
//! an empty chunk signals exhaustion.

mod func;
#[cfg(feature = "http")]
mod http;
mod memory;
mod reader;

use async_trait::async_trait;
use bytes::Bytes;

pub use func::{DeferredFnSource, FnSource};
#[cfg(feature = "http")]
pub use http::HttpSource;
pub use memory::MemorySource;
pub use reader::{FileSource, ReaderSource};

/// Error type produced by sources. Anything boxable works; the driver wraps it
/// in [`ms_core::Error::SourceRead`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for source operations.
pub type SourceResult<T> = std::result::Result<T, BoxError>;

/// A byte source the driver can pull chunks from.
#[async_trait]
pub trait ChunkSource: Send {
    /// Total number of bytes in the source.
    async fn size(&mut self) -> SourceResult<u64>;

    /// Read at most `max_len` bytes starting at `offset`.
    ///
    /// Returns fewer bytes near the end of the source and an empty chunk
    /// once it is exhausted.
    async fn read_chunk(&mut self, max_len: usize, offset: u64) -> SourceResult<Bytes>;
}

/// A byte source that answers synchronously.
pub trait SyncChunkSource: Send {
    fn size(&mut self) -> SourceResult<u64>;

    fn read_chunk(&mut self, max_len: usize, offset: u64) -> SourceResult<Bytes>;
}

/// Adapts a [`SyncChunkSource`] to [`ChunkSource`] without any extra
/// suspension: each call completes on its first poll.
#[derive(Debug, Clone, Default)]
pub struct Immediate<S>(pub S);

impl<S> Immediate<S> {
    pub fn into_inner(self) -> S {
        self.0
    }
}

#[async_trait]
impl<S: SyncChunkSource> ChunkSource for Immediate<S> {
    async fn size(&mut self) -> SourceResult<u64> {
        self.0.size()
    }

    async fn read_chunk(&mut self, max_len: usize, offset: u64) -> SourceResult<Bytes> {
        self.0.read_chunk(max_len, offset)
    }
}

#[async_trait]
impl<S: ChunkSource + ?Sized> ChunkSource for &mut S {
    async fn size(&mut self) -> SourceResult<u64> {
        (**self).size().await
    }

    async fn read_chunk(&mut self, max_len: usize, offset: u64) -> SourceResult<Bytes> {
        (**self).read_chunk(max_len, offset).await
    }
}

#[async_trait]
impl<S: ChunkSource + ?Sized> ChunkSource for Box<S> {
    async fn size(&mut self) -> SourceResult<u64> {
        (**self).size().await
    }

    async fn read_chunk(&mut self, max_len: usize, offset: u64) -> SourceResult<Bytes> {
        (**self).read_chunk(max_len, offset).await
    }
}

/// Clamp a read of `max_len` bytes at `offset` to a source of `len` bytes.
pub(crate) fn clamp_range(len: u64, max_len: usize, offset: u64) -> std::ops::Range<u64> {
    let start = offset.min(len);
    let end = start.saturating_add(max_len as u64).min(len);
    start..end
}
