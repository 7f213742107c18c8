//! Records owned by the local state store.
//!
//! Both records are forward-readable: unknown fields written by a newer kvm
//! are ignored on load.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{KubeVersion, Platform, Sha256Digest, Versioned};

/// A downloaded, verified artifact in the local cache.
///
/// One entry exists per (version, platform) pair, and only after the
/// artifact's digest matched the catalog and the file reached its final
/// cache path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cached release.
    pub version: KubeVersion,
    /// Platform the binary was built for.
    pub platform: Platform,
    /// Absolute path of the executable in the cache.
    pub path: PathBuf,
    /// Digest verified at download time.
    pub sha256: Sha256Digest,
    /// Size of the artifact in bytes.
    pub size: u64,
    /// When the download finished.
    pub downloaded_at: DateTime<Utc>,
}

impl Versioned for CacheEntry {
    fn version(&self) -> &KubeVersion {
        &self.version
    }
}

/// The version the managed command currently resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePointer {
    /// Active release.
    pub version: KubeVersion,
    /// Platform of the active artifact.
    pub platform: Platform,
    /// Cache path the managed command links to.
    pub target: PathBuf,
    /// When the switch happened.
    pub activated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_ignores_unknown_fields() {
        let json = r#"{
            "version": "v1.29.3",
            "platform": "linux/amd64",
            "path": "/tmp/kubectl",
            "sha256": "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
            "size": 11,
            "downloaded_at": "2024-03-15T10:00:00Z",
            "signature": "added-by-a-future-version"
        }"#;
        let entry: CacheEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.version, KubeVersion::new(1, 29, 3));
        assert_eq!(entry.platform.to_string(), "linux/amd64");
    }

    #[test]
    fn entry_rejects_bad_digest() {
        let json = r#"{
            "version": "v1.29.3",
            "platform": "linux/amd64",
            "path": "/tmp/kubectl",
            "sha256": "not-a-digest",
            "size": 11,
            "downloaded_at": "2024-03-15T10:00:00Z"
        }"#;
        assert!(serde_json::from_str::<CacheEntry>(json).is_err());
    }
}
