//! Remote files fetched with HTTP range requests.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE, RANGE};
use reqwest::{Client, Response, StatusCode};

use super::{ChunkSource, SourceResult};

/// Reads a remote resource one `Range` request per chunk.
///
/// The server must support byte ranges; a `200 OK` to a ranged request is
/// only accepted for the first chunk. Bodies are read incrementally and the
/// transfer is dropped once the requested length has arrived, so a server
/// that ignores `Range` never causes more than one chunk to be buffered.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
    len: Option<u64>,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            len: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn probe_len(&self) -> SourceResult<u64> {
        let resp = self.client.head(&self.url).send().await?.error_for_status()?;
        // Zero or missing: fall back to a one-byte range request.
        let len = header_u64(resp.headers().get(CONTENT_LENGTH));
        if let Some(len) = len.filter(|&len| len > 0) {
            return Ok(len);
        }

        // 206 carries `bytes 0-0/<total>`, 416 carries `bytes */<total>`.
        let resp = self
            .client
            .get(&self.url)
            .header(RANGE, "bytes=0-0")
            .send()
            .await?;
        let status = resp.status();
        resp.headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| format!("{} did not report its length ({status})", self.url).into())
    }
}

#[async_trait]
impl ChunkSource for HttpSource {
    async fn size(&mut self) -> SourceResult<u64> {
        if let Some(len) = self.len {
            return Ok(len);
        }
        let len = self.probe_len().await?;
        tracing::debug!(url = %self.url, len, "remote source length");
        self.len = Some(len);
        Ok(len)
    }

    async fn read_chunk(&mut self, max_len: usize, offset: u64) -> SourceResult<Bytes> {
        if max_len == 0 {
            return Ok(Bytes::new());
        }
        let last = offset + max_len as u64 - 1;
        let resp = self
            .client
            .get(&self.url)
            .header(RANGE, format!("bytes={offset}-{last}"))
            .send()
            .await?;

        match resp.status() {
            StatusCode::PARTIAL_CONTENT => read_at_most(resp, max_len).await,
            StatusCode::RANGE_NOT_SATISFIABLE => Ok(Bytes::new()),
            StatusCode::OK if offset == 0 => read_at_most(resp, max_len).await,
            status => Err(format!(
                "{}: unexpected status {status} for range {offset}-{last}",
                self.url
            )
            .into()),
        }
    }
}

/// Collect at most `max_len` body bytes, then drop the response to abort
/// whatever the server still has to send.
async fn read_at_most(mut resp: Response, max_len: usize) -> SourceResult<Bytes> {
    let mut buf = BytesMut::with_capacity(max_len);
    while buf.len() < max_len {
        match resp.chunk().await? {
            Some(part) => {
                let take = part.len().min(max_len - buf.len());
                buf.extend_from_slice(&part[..take]);
            }
            None => break,
        }
    }
    Ok(buf.freeze())
}

fn header_u64(value: Option<&reqwest::header::HeaderValue>) -> Option<u64> {
    value?.to_str().ok()?.trim().parse().ok()
}

/// Extract the total from `bytes 0-0/12345`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}
