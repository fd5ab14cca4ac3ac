//! Sources over seekable async readers, including files on disk.

use std::io::SeekFrom;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

use super::{ChunkSource, SourceResult};

/// Serves chunks from any `AsyncRead + AsyncSeek`.
///
/// The reader is only repositioned when a chunk is requested somewhere other
/// than where the previous one ended.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
    len: Option<u64>,
    position: Option<u64>,
}

/// A file on disk.
pub type FileSource = ReaderSource<File>;

impl<R> ReaderSource<R> {
    /// Wrap a reader; its length is discovered by seeking to the end.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            len: None,
            position: None,
        }
    }

    /// Wrap a reader whose length is already known.
    pub fn with_len(reader: R, len: u64) -> Self {
        Self {
            reader,
            len: Some(len),
            position: None,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl ReaderSource<File> {
    /// Open a file for analysis.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).await?;
        let len = file.metadata().await?.len();
        tracing::debug!(path = %path.display(), len, "opened file source");
        Ok(Self::with_len(file, len))
    }
}

#[async_trait]
impl<R> ChunkSource for ReaderSource<R>
where
    R: AsyncRead + AsyncSeek + Unpin + Send,
{
    async fn size(&mut self) -> SourceResult<u64> {
        if let Some(len) = self.len {
            return Ok(len);
        }
        let len = self.reader.seek(SeekFrom::End(0)).await?;
        self.len = Some(len);
        self.position = Some(len);
        Ok(len)
    }

    async fn read_chunk(&mut self, max_len: usize, offset: u64) -> SourceResult<Bytes> {
        if self.position != Some(offset) {
            self.reader.seek(SeekFrom::Start(offset)).await?;
            self.position = Some(offset);
        }

        let mut buf = vec![0u8; max_len];
        let mut filled = 0;
        while filled < max_len {
            let n = self.reader.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        buf.truncate(filled);

        self.position = Some(offset + filled as u64);
        Ok(Bytes::from(buf))
    }
}
