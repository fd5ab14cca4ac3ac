//! Shared fixtures for streaming integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use ms_stream::source::{ChunkSource, SourceResult};

/// Bytes whose value encodes their offset.
pub fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// How a [`RecordingSource`] answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Ready on first poll.
    Immediate,
    /// Sleeps before answering.
    Delayed(Duration),
}

/// An in-memory source that records every `(max_len, offset)` it is asked
/// for and can fail or go dry on a given read.
pub struct RecordingSource {
    data: Bytes,
    delivery: Delivery,
    fail_size: bool,
    fail_on_read: Option<usize>,
    empty_from_read: Option<usize>,
    reads: ReadLog,
}

impl RecordingSource {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Bytes::from(data),
            delivery: Delivery::Immediate,
            fail_size: false,
            fail_on_read: None,
            empty_from_read: None,
            reads: ReadLog::default(),
        }
    }

    pub fn delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn fail_size(mut self) -> Self {
        self.fail_size = true;
        self
    }

    /// Fail the `n`-th read (1-based).
    pub fn fail_on_read(mut self, n: usize) -> Self {
        self.fail_on_read = Some(n);
        self
    }

    /// Return empty chunks from the `n`-th read (1-based) on.
    pub fn empty_from_read(mut self, n: usize) -> Self {
        self.empty_from_read = Some(n);
        self
    }

    pub fn reads(&self) -> ReadLog {
        self.reads.clone()
    }

    async fn pause(&self) {
        if let Delivery::Delayed(d) = self.delivery {
            tokio::time::sleep(d).await;
        }
    }
}

#[async_trait]
impl ChunkSource for RecordingSource {
    async fn size(&mut self) -> SourceResult<u64> {
        self.pause().await;
        if self.fail_size {
            return Err("size unavailable".into());
        }
        Ok(self.data.len() as u64)
    }

    async fn read_chunk(&mut self, max_len: usize, offset: u64) -> SourceResult<Bytes> {
        let n = self.reads.push(max_len, offset);
        self.pause().await;

        if self.fail_on_read == Some(n) {
            return Err(format!("read {n} failed").into());
        }
        if self.empty_from_read.is_some_and(|from| n >= from) {
            return Ok(Bytes::new());
        }

        let start = (offset as usize).min(self.data.len());
        let end = (start + max_len).min(self.data.len());
        Ok(self.data.slice(start..end))
    }
}

/// Shared list of `(max_len, offset)` read requests.
#[derive(Debug, Clone, Default)]
pub struct ReadLog(Arc<Mutex<Vec<(usize, u64)>>>);

impl ReadLog {
    fn push(&self, max_len: usize, offset: u64) -> usize {
        let mut reads = self.0.lock().unwrap();
        reads.push((max_len, offset));
        reads.len()
    }

    pub fn all(&self) -> Vec<(usize, u64)> {
        self.0.lock().unwrap().clone()
    }

    pub fn lengths(&self) -> Vec<usize> {
        self.all().into_iter().map(|(len, _)| len).collect()
    }

    pub fn offsets(&self) -> Vec<u64> {
        self.all().into_iter().map(|(_, off)| off).collect()
    }
}
