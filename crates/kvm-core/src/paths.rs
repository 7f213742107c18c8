use std::path::{Path, PathBuf};

use kvm_schema::{KubeVersion, MANAGED_COMMAND, Platform};

/// Every on-disk location kvm touches, rooted at one directory.
///
/// The root is `KVM_HOME`, or `~/.kvm` (see [`crate::Settings`]). Nothing
/// is created on construction; see [`KvmPaths::ensure_layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvmPaths {
    root: PathBuf,
}

impl KvmPaths {
    /// Root the layout at an explicit directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Managed command directory: ~/.kvm/bin
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    /// Artifact cache: ~/.kvm/cache
    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    /// State records: ~/.kvm/state
    pub fn state_dir(&self) -> PathBuf {
        self.root.join("state")
    }

    /// One JSON record per cached artifact: ~/.kvm/state/entries
    pub fn entries_dir(&self) -> PathBuf {
        self.state_dir().join("entries")
    }

    /// Active pointer: ~/.kvm/state/active.json
    pub fn active_record(&self) -> PathBuf {
        self.state_dir().join("active.json")
    }

    /// Download staging: ~/.kvm/tmp (same volume as the cache, so renames are atomic)
    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }

    /// Final cache location of one artifact.
    pub fn artifact_path(&self, version: &KubeVersion, platform: Platform) -> PathBuf {
        self.cache_dir()
            .join(version.to_string())
            .join(platform.slug())
            .join(platform.binary_name())
    }

    /// State record for one cached artifact.
    pub fn entry_record(&self, version: &KubeVersion, platform: Platform) -> PathBuf {
        self.entries_dir()
            .join(format!("{version}_{}.json", platform.slug()))
    }

    /// The managed command users put on their `PATH`.
    pub fn managed_link(&self) -> PathBuf {
        self.bin_dir().join(format!(
            "{MANAGED_COMMAND}{}",
            std::env::consts::EXE_SUFFIX
        ))
    }

    /// Create every directory kvm writes into.
    pub fn ensure_layout(&self) -> std::io::Result<()> {
        for dir in [
            self.bin_dir(),
            self.cache_dir(),
            self.entries_dir(),
            self.tmp_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
