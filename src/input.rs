//! Turning a command-line input into a chunk source.

use anyhow::{Context, Result};
use ms_stream::source::FileSource;
use ms_stream::ChunkSource;
use std::path::Path;

/// Whether `input` names a remote resource rather than a local path.
pub fn is_remote(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Open `input` as a boxed source: a local file, or an http(s) URL read with
/// range requests when built with the `http` feature.
pub async fn open_source(input: &str) -> Result<Box<dyn ChunkSource>> {
    if is_remote(input) {
        return open_remote(input);
    }

    let path = Path::new(input);
    if !path.exists() {
        anyhow::bail!("Input file does not exist: {:?}", path);
    }

    let source = FileSource::open(path)
        .await
        .with_context(|| format!("Failed to open input file: {:?}", path))?;
    Ok(Box::new(source))
}

#[cfg(feature = "http")]
fn open_remote(url: &str) -> Result<Box<dyn ChunkSource>> {
    Ok(Box::new(ms_stream::source::HttpSource::new(url)))
}

#[cfg(not(feature = "http"))]
fn open_remote(url: &str) -> Result<Box<dyn ChunkSource>> {
    anyhow::bail!(
        "Cannot analyze {}: mediascope was built without http support (enable the `http` feature)",
        url
    )
}
