//! Activation manager: repoint the managed command at a cached artifact.
//!
//! `bin/kubectl` is a symlink into the cache. Switching creates the new
//! link under a temporary name in `bin/` and renames it over the old one,
//! so a concurrent reader resolves either the old target or the new one.
//! The active pointer in the state store is updated after the swap.
//!
//! The link is what the managed command actually runs, so it wins whenever
//! it and the pointer disagree. That happens when two activations race and
//! the one that swapped the link first writes its pointer last.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::io::fs::replace_link;
use crate::paths::KvmPaths;
use crate::state::{StateError, StateStore};
use kvm_schema::{
    ActivePointer, CacheEntry, KubeVersion, Platform, Sha256Digest, VersionSpecifier,
};

#[derive(Error, Debug)]
pub enum ActivationError {
    #[error("{version} ({platform}) is not installed: {reason}. Run `kvm install {version}` first")]
    NotCached {
        version: KubeVersion,
        platform: Platform,
        reason: String,
    },

    #[error("No installed version matches '{0}'. Run `kvm install {0}` first")]
    NoInstalledMatch(VersionSpecifier),

    #[error("No version is active. Run `kvm activate <version>` first")]
    NoneActive,

    #[error("Failed to link {path}: {source}")]
    Link {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    State(#[from] StateError),
}

#[derive(Debug)]
pub struct Activator {
    paths: KvmPaths,
    store: StateStore,
}

impl Activator {
    pub fn new(paths: KvmPaths) -> Self {
        let store = StateStore::new(paths.clone());
        Self { paths, store }
    }

    /// The version the managed command currently runs.
    ///
    /// A pointer that disagrees with the managed link is rebuilt from the
    /// cache entry the link targets and written back. Where the link is not
    /// a symlink (a copy on some Windows setups) the pointer is taken as is.
    pub fn current(&self) -> Option<ActivePointer> {
        let pointer = self.store.get_active();
        let Some(target) = self.linked_target() else {
            return pointer;
        };
        if pointer.as_ref().is_some_and(|p| p.target == target) {
            return pointer;
        }

        let Some(entry) = self.store.list().into_iter().find(|e| e.path == target) else {
            warn!(target = %target.display(), "Managed link targets no cache entry");
            return pointer;
        };
        warn!(version = %entry.version, platform = %entry.platform, "Active pointer disagrees with managed link, repairing");
        let repaired = ActivePointer {
            version: entry.version,
            platform: entry.platform,
            target: entry.path,
            activated_at: Utc::now(),
        };
        if let Err(e) = self.store.set_active(&repaired) {
            warn!(error = %e, "Failed to repair active pointer");
        }
        Some(repaired)
    }

    /// Whether the managed link currently resolves to `path`.
    pub fn links_to(&self, path: &Path) -> bool {
        self.linked_target().is_some_and(|target| target == path)
    }

    fn linked_target(&self) -> Option<PathBuf> {
        std::fs::read_link(self.paths.managed_link()).ok()
    }

    /// Make `(version, platform)` the active artifact.
    ///
    /// Never downloads. The cached file is re-hashed first; an entry whose
    /// artifact is gone or no longer matches its recorded digest is dropped
    /// and reported as [`ActivationError::NotCached`]. The entry of the
    /// active release is kept even then, so the pointer never references a
    /// release with no entry. On any error the previous link and pointer are
    /// left untouched.
    pub fn activate(
        &self,
        version: &KubeVersion,
        platform: Platform,
    ) -> Result<ActivePointer, ActivationError> {
        let entry = self.verified_entry(version, platform)?;

        let link = self.paths.managed_link();
        replace_link(&entry.path, &link).map_err(|source| ActivationError::Link {
            path: link.clone(),
            source,
        })?;
        debug!(link = %link.display(), target = %entry.path.display(), "Swapped managed link");

        let pointer = ActivePointer {
            version: entry.version,
            platform,
            target: entry.path,
            activated_at: Utc::now(),
        };
        self.store.set_active(&pointer)?;

        info!(%version, %platform, "Activated");
        Ok(pointer)
    }

    fn verified_entry(
        &self,
        version: &KubeVersion,
        platform: Platform,
    ) -> Result<CacheEntry, ActivationError> {
        let not_cached = |reason: &str| ActivationError::NotCached {
            version: version.clone(),
            platform,
            reason: reason.to_string(),
        };

        let entry = self
            .store
            .get(version, platform)
            .ok_or_else(|| not_cached("no cache entry"))?;

        let reason = match Sha256Digest::of_file(&entry.path) {
            Ok(actual) if actual == entry.sha256 => return Ok(entry),
            Ok(_) => "cached artifact is corrupt",
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => "cached artifact is missing",
            Err(e) => {
                warn!(path = %entry.path.display(), error = %e, "Failed to read cached artifact");
                "cached artifact is unreadable"
            }
        };

        if self.links_to(&entry.path) {
            warn!(%version, %platform, reason, "Active release failed verification, keeping its entry");
        } else {
            warn!(%version, %platform, reason, "Dropping cache entry");
            if let Err(e) = self.store.remove(version, platform) {
                warn!(error = %e, "Failed to drop cache entry");
            }
        }
        Err(not_cached(reason))
    }
}
