//! Artifact fetcher: download, verify and cache one release binary.
//!
//! Bytes only reach the cache through a staging file in `tmp/` (same volume
//! as `cache/`). The staged file is hashed while it streams, compared with
//! the declared digest, and renamed into place only on a match; the state
//! entry is written last. An interrupted fetch therefore leaves at most a
//! `.kvm-staging-*` orphan and never a registered, unverified artifact.

use std::path::PathBuf;

use chrono::Utc;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::ErrorKind;
use crate::io::download::{DownloadError, download_to, fetch_text};
use crate::io::fs::{STAGING_PREFIX, set_executable};
use crate::paths::KvmPaths;
use crate::reporter::Reporter;
use crate::retry::RetryPolicy;
use crate::state::{StateError, StateStore};
use kvm_schema::{CacheEntry, Checksum, KubeVersion, Platform, ReleaseDescriptor, Sha256Digest};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to download {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid checksum published at {url}: {reason}")]
    ChecksumSource { url: String, reason: String },

    #[error("Checksum mismatch for {version} ({platform}): expected {expected}, got {actual}")]
    ChecksumMismatch {
        version: KubeVersion,
        platform: Platform,
        expected: Sha256Digest,
        actual: Sha256Digest,
    },

    #[error("{version} has no build for {platform}")]
    PlatformUnsupported {
        version: KubeVersion,
        platform: Platform,
    },

    #[error("Failed to write cache: {0}")]
    DiskWrite(#[from] std::io::Error),

    #[error(transparent)]
    State(#[from] StateError),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::NetworkUnavailable,
            Self::ChecksumSource { .. } => ErrorKind::MalformedCatalog,
            Self::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            Self::PlatformUnsupported { .. } => ErrorKind::PlatformUnsupported,
            Self::DiskWrite(_) | Self::State(_) => ErrorKind::DiskWrite,
        }
    }

    fn from_download(url: &str, err: DownloadError) -> Self {
        match err {
            DownloadError::Http(source) => Self::Network {
                url: url.to_string(),
                source,
            },
            DownloadError::Io(e) => Self::DiskWrite(e),
        }
    }
}

#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    paths: KvmPaths,
    store: StateStore,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, paths: KvmPaths, retry: RetryPolicy) -> Self {
        let store = StateStore::new(paths.clone());
        Self {
            client,
            paths,
            store,
            retry,
        }
    }

    /// A cache entry whose artifact is still on disk.
    ///
    /// An entry whose file has disappeared is dropped, so the next
    /// [`Fetcher::ensure_installed`] downloads it again.
    pub fn cached(&self, version: &KubeVersion, platform: Platform) -> Option<CacheEntry> {
        let entry = self.store.get(version, platform)?;
        if entry.path.is_file() {
            return Some(entry);
        }
        warn!(%version, %platform, path = %entry.path.display(), "Cached artifact missing, forgetting entry");
        if let Err(e) = self.store.remove(version, platform) {
            warn!(error = %e, "Failed to drop dangling cache entry");
        }
        None
    }

    /// Make sure `release` is cached for `platform`, downloading it at most once.
    pub async fn ensure_installed<R: Reporter + ?Sized>(
        &self,
        release: &ReleaseDescriptor,
        platform: Platform,
        reporter: &R,
    ) -> Result<CacheEntry, FetchError> {
        let version = &release.version;
        if let Some(entry) = self.cached(version, platform) {
            debug!(%version, %platform, "Cache hit");
            return Ok(entry);
        }

        let artifact = release
            .artifact(platform)
            .ok_or_else(|| FetchError::PlatformUnsupported {
                version: version.clone(),
                platform,
            })?;

        let expected = self.expected_digest(&artifact.checksum).await?;

        let tmp_dir = self.paths.tmp_dir();
        tokio::fs::create_dir_all(&tmp_dir).await?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(&tmp_dir)?
            .into_temp_path();

        info!(%version, %platform, url = %artifact.url, "Downloading");
        let downloaded = self
            .retry
            .run("artifact download", || {
                download_to(&self.client, &artifact.url, &staging, move |current, total| {
                    reporter.downloading(version, current, total);
                })
            })
            .await
            .map_err(|e| FetchError::from_download(&artifact.url, e))?;

        reporter.verifying(version, platform);
        if downloaded.sha256 != expected {
            reporter.failed(version, "checksum mismatch");
            // Dropping `staging` deletes the unverified bytes.
            return Err(FetchError::ChecksumMismatch {
                version: version.clone(),
                platform,
                expected,
                actual: downloaded.sha256,
            });
        }

        set_executable(&staging)?;
        let final_path = self.paths.artifact_path(version, platform);
        let final_dir = parent_dir(&final_path)?;
        tokio::fs::create_dir_all(&final_dir).await?;
        staging.persist(&final_path).map_err(|e| e.error)?;
        sync_dir(&final_dir)?;

        let entry = CacheEntry {
            version: version.clone(),
            platform,
            path: final_path,
            sha256: downloaded.sha256,
            size: downloaded.size,
            downloaded_at: Utc::now(),
        };
        self.store.put(&entry)?;

        reporter.done(version, "installed", Some(entry.size));
        Ok(entry)
    }

    /// Remove a cached artifact: the entry first, then the file.
    ///
    /// Returns whether anything was cached.
    pub fn evict(&self, version: &KubeVersion, platform: Platform) -> Result<bool, FetchError> {
        let existed = self.store.remove(version, platform)?;

        let path = self.paths.artifact_path(version, platform);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        // Prune now-empty `<slug>/` and `<version>/` directories.
        for dir in path.ancestors().skip(1).take(2) {
            if std::fs::remove_dir(dir).is_err() {
                break;
            }
        }
        Ok(existed)
    }

    async fn expected_digest(&self, checksum: &Checksum) -> Result<Sha256Digest, FetchError> {
        let url = match checksum {
            Checksum::Inline(digest) => return Ok(digest.clone()),
            Checksum::Remote(url) => url,
        };

        let body = self
            .retry
            .run("checksum", || fetch_text(&self.client, url))
            .await
            .map_err(|source| FetchError::Network {
                url: url.clone(),
                source,
            })?;

        Sha256Digest::from_checksum_file(&body).map_err(|e| FetchError::ChecksumSource {
            url: url.clone(),
            reason: e.to_string(),
        })
    }
}

fn parent_dir(path: &std::path::Path) -> std::io::Result<PathBuf> {
    path.parent()
        .map(std::path::Path::to_path_buf)
        .ok_or_else(|| std::io::Error::other(format!("{} has no parent", path.display())))
}

/// Persist the directory entry created by a rename.
fn sync_dir(dir: &std::path::Path) -> std::io::Result<()> {
    #[cfg(unix)]
    std::fs::File::open(dir)?.sync_all()?;
    #[cfg(not(unix))]
    let _ = dir;
    Ok(())
}
