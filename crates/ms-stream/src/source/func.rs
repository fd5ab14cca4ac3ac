//! Sources built from a size accessor and a chunk reader closure.

use std::future::Future;

use async_trait::async_trait;
use bytes::Bytes;

use super::{ChunkSource, SourceResult, SyncChunkSource};

/// A source made of two synchronous closures.
///
/// ```
/// use ms_stream::source::{FnSource, Immediate};
///
/// let data = vec![0u8; 1024];
/// let len = data.len() as u64;
/// let source = Immediate(FnSource::new(
///     move || Ok(len),
///     move |n, offset| {
///         let start = (offset as usize).min(data.len());
///         let end = (start + n).min(data.len());
///         Ok(bytes::Bytes::copy_from_slice(&data[start..end]))
///     },
/// ));
/// # let _ = source;
/// ```
pub struct FnSource<G, R> {
    size: G,
    read: R,
}

impl<G, R> FnSource<G, R>
where
    G: FnMut() -> SourceResult<u64> + Send,
    R: FnMut(usize, u64) -> SourceResult<Bytes> + Send,
{
    pub fn new(size: G, read: R) -> Self {
        Self { size, read }
    }
}

impl<G, R> SyncChunkSource for FnSource<G, R>
where
    G: FnMut() -> SourceResult<u64> + Send,
    R: FnMut(usize, u64) -> SourceResult<Bytes> + Send,
{
    fn size(&mut self) -> SourceResult<u64> {
        (self.size)()
    }

    fn read_chunk(&mut self, max_len: usize, offset: u64) -> SourceResult<Bytes> {
        (self.read)(max_len, offset)
    }
}

/// A source made of two closures returning futures.
pub struct DeferredFnSource<G, R> {
    size: G,
    read: R,
}

impl<G, GF, R, RF> DeferredFnSource<G, R>
where
    G: FnMut() -> GF + Send,
    GF: Future<Output = SourceResult<u64>> + Send,
    R: FnMut(usize, u64) -> RF + Send,
    RF: Future<Output = SourceResult<Bytes>> + Send,
{
    pub fn new(size: G, read: R) -> Self {
        Self { size, read }
    }
}

#[async_trait]
impl<G, GF, R, RF> ChunkSource for DeferredFnSource<G, R>
where
    G: FnMut() -> GF + Send,
    GF: Future<Output = SourceResult<u64>> + Send,
    R: FnMut(usize, u64) -> RF + Send,
    RF: Future<Output = SourceResult<Bytes>> + Send,
{
    async fn size(&mut self) -> SourceResult<u64> {
        (self.size)().await
    }

    async fn read_chunk(&mut self, max_len: usize, offset: u64) -> SourceResult<Bytes> {
        (self.read)(max_len, offset).await
    }
}
