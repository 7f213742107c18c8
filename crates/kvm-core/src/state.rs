//! Local state store: the cache index and the active pointer.
//!
//! State is a directory of small JSON records rather than one shared file:
//! each cached (version, platform) owns `state/entries/<version>_<slug>.json`
//! and the active pointer lives in `state/active.json`. Concurrent installs
//! of different versions therefore never rewrite each other's records, and
//! writing the same key twice replaces the previous entry, so there is at
//! most one entry per pair.
//!
//! Every write goes through [`atomic_write`]. Reads fail closed: a record
//! that cannot be read or parsed is logged and treated as absent, which
//! makes the caller re-download or re-activate instead of trusting it.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::io::fs::atomic_write;
use crate::paths::KvmPaths;
use kvm_schema::{ActivePointer, CacheEntry, KubeVersion, Platform};

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode state record: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct StateStore {
    paths: KvmPaths,
}

impl StateStore {
    pub fn new(paths: KvmPaths) -> Self {
        Self { paths }
    }

    /// The cache entry for `(version, platform)`, if one was committed.
    pub fn get(&self, version: &KubeVersion, platform: Platform) -> Option<CacheEntry> {
        let path = self.paths.entry_record(version, platform);
        let entry: CacheEntry = read_record(&path)?;
        if entry.version != *version || entry.platform != platform {
            warn!(path = %path.display(), "State record does not match its key, ignoring");
            return None;
        }
        Some(entry)
    }

    /// Commit `entry`, replacing any previous entry for the same pair.
    pub fn put(&self, entry: &CacheEntry) -> Result<(), StateError> {
        let path = self.paths.entry_record(&entry.version, entry.platform);
        write_record(&path, entry)?;
        debug!(version = %entry.version, platform = %entry.platform, "Recorded cache entry");
        Ok(())
    }

    /// Drop the entry for `(version, platform)`. Returns whether one existed.
    pub fn remove(&self, version: &KubeVersion, platform: Platform) -> Result<bool, StateError> {
        let path = self.paths.entry_record(version, platform);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StateError::Write { path, source }),
        }
    }

    /// Every readable cache entry, ordered by version then platform.
    pub fn list(&self) -> Vec<CacheEntry> {
        let dir = self.paths.entries_dir();
        let Ok(read_dir) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut entries: Vec<CacheEntry> = read_dir
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|p| {
                let entry = read_record::<CacheEntry>(&p)?;
                (self.paths.entry_record(&entry.version, entry.platform) == p).then_some(entry)
            })
            .collect();
        entries.sort_by(|a, b| (&a.version, a.platform).cmp(&(&b.version, b.platform)));
        entries
    }

    /// Installed entries for one platform.
    pub fn list_for(&self, platform: Platform) -> Vec<CacheEntry> {
        self.list()
            .into_iter()
            .filter(|e| e.platform == platform)
            .collect()
    }

    pub fn get_active(&self) -> Option<ActivePointer> {
        read_record(&self.paths.active_record())
    }

    /// Overwrite the active pointer in one atomic step.
    pub fn set_active(&self, pointer: &ActivePointer) -> Result<(), StateError> {
        write_record(&self.paths.active_record(), pointer)
    }
}

fn read_record<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable state record, treating as absent");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Corrupt state record, treating as absent");
            None
        }
    }
}

fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<(), StateError> {
    let json = serde_json::to_vec_pretty(record)?;
    atomic_write(path, &json).map_err(|source| StateError::Write {
        path: path.to_path_buf(),
        source,
    })
}
