//! In-memory source.

use async_trait::async_trait;
use bytes::Bytes;

use super::{clamp_range, ChunkSource, SourceResult, SyncChunkSource};

/// Serves chunks out of a buffer already in memory. Slicing a [`Bytes`] is
/// reference-counted, so chunks are never copied.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    fn slice(&self, max_len: usize, offset: u64) -> Bytes {
        let range = clamp_range(self.data.len() as u64, max_len, offset);
        // both ends are bounded by data.len(), which is a usize
        self.data.slice(range.start as usize..range.end as usize)
    }
}

impl SyncChunkSource for MemorySource {
    fn size(&mut self) -> SourceResult<u64> {
        Ok(self.data.len() as u64)
    }

    fn read_chunk(&mut self, max_len: usize, offset: u64) -> SourceResult<Bytes> {
        Ok(self.slice(max_len, offset))
    }
}

#[async_trait]
impl ChunkSource for MemorySource {
    async fn size(&mut self) -> SourceResult<u64> {
        Ok(self.data.len() as u64)
    }

    async fn read_chunk(&mut self, max_len: usize, offset: u64) -> SourceResult<Bytes> {
        Ok(self.slice(max_len, offset))
    }
}
