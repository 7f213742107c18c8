//! Catalog descriptors: what a remote index says a release provides.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{KubeVersion, Platform, Sha256Digest, Versioned};

/// Where the expected checksum of an artifact comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Checksum {
    /// The catalog carried the digest itself.
    Inline(Sha256Digest),
    /// The digest is published next to the artifact and fetched on demand.
    Remote(String),
}

/// Download location and expected digest for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformArtifact {
    /// Download URL of the binary.
    pub url: String,
    /// Expected SHA256 of the downloaded bytes.
    pub checksum: Checksum,
}

/// One upstream release as listed by a catalog.
///
/// Descriptors are immutable once fetched; a catalog snapshot is a plain
/// slice of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    /// Release version.
    pub version: KubeVersion,
    /// Publication time, when the catalog knows it.
    pub published_at: Option<DateTime<Utc>>,
    /// Marked as a pre-release by the catalog (independent of the version
    /// string, which may also carry a pre-release suffix).
    pub prerelease: bool,
    /// Per-platform downloads.
    pub artifacts: BTreeMap<Platform, PlatformArtifact>,
}

impl ReleaseDescriptor {
    /// The download for `platform`, if the release publishes one.
    pub fn artifact(&self, platform: Platform) -> Option<&PlatformArtifact> {
        self.artifacts.get(&platform)
    }
}

impl Versioned for ReleaseDescriptor {
    fn version(&self) -> &KubeVersion {
        &self.version
    }

    fn is_stable(&self) -> bool {
        !self.prerelease && !self.version.is_prerelease()
    }
}
