//! Streaming downloads with incremental SHA256.

use std::io::Write;
use std::path::Path;

use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::retry::Transient;
use kvm_schema::Sha256Digest;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Transient for DownloadError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_transient(),
            Self::Io(_) => false,
        }
    }
}

/// What a finished download produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    pub sha256: Sha256Digest,
    pub size: u64,
}

/// Stream `url` into `dest`, hashing as bytes arrive.
///
/// `dest` is truncated first, so a retried call never appends to the bytes
/// of a failed attempt. The file is flushed and synced before returning.
pub async fn download_to<F>(
    client: &Client,
    url: &str,
    dest: &Path,
    progress: F,
) -> Result<Downloaded, DownloadError>
where
    F: Fn(u64, Option<u64>),
{
    let response = client.get(url).send().await?.error_for_status()?;
    let total_size = response.content_length();
    progress(0, total_size);

    let mut file = File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut hasher = Sha256::new();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        hasher.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        progress(downloaded, total_size);
    }

    file.flush().await?;
    file.sync_all().await?;

    Ok(Downloaded {
        sha256: Sha256Digest::from_hasher(hasher),
        size: downloaded,
    })
}

/// Fetch a small text document (checksum files, version markers).
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, reqwest::Error> {
    client.get(url).send().await?.error_for_status()?.text().await
}
