//! Crash-safe filesystem primitives.
//!
//! Every write kvm makes goes to a prefixed sibling first and reaches its
//! final name through a single rename. A crash leaves at most an orphaned
//! prefixed file, which [`sweep_stale`] removes later.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

use crate::paths::KvmPaths;

/// Prefix of in-flight artifact downloads.
pub const STAGING_PREFIX: &str = ".kvm-staging-";

/// Prefix of in-flight state records and link swaps.
pub const TMP_PREFIX: &str = ".kvm-tmp-";

/// Age after which an orphaned staging file is considered abandoned.
pub const STALE_AFTER: Duration = Duration::from_secs(60 * 60);

fn parent_of(path: &Path) -> std::io::Result<&Path> {
    path.parent()
        .ok_or_else(|| std::io::Error::other(format!("{} has no parent", path.display())))
}

/// Write `content` to `path` so readers see either the old or the new bytes.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = parent_of(path)?;
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(TMP_PREFIX)
        .tempfile_in(parent)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Point `link` at `target`, replacing any existing link in one rename.
///
/// The new link is created under a temporary name next to `link`, so at
/// every instant `link` resolves to either the old target or the new one.
pub fn replace_link(target: &Path, link: &Path) -> std::io::Result<()> {
    let parent = parent_of(link)?;
    std::fs::create_dir_all(parent)?;

    let staged = parent.join(format!("{TMP_PREFIX}{:016x}", rand::random::<u64>()));
    create_link(target, &staged)?;

    if let Err(e) = std::fs::rename(&staged, link) {
        let _ = std::fs::remove_file(&staged);
        return Err(e);
    }
    Ok(())
}

#[cfg(unix)]
fn create_link(target: &Path, at: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, at)
}

#[cfg(windows)]
fn create_link(target: &Path, at: &Path) -> std::io::Result<()> {
    // Symlinks need developer mode or elevation on Windows.
    std::os::windows::fs::symlink_file(target, at)
        .or_else(|_| std::fs::hard_link(target, at))
        .or_else(|_| std::fs::copy(target, at).map(|_| ()))
}

/// Mark a file executable (no-op off Unix).
pub fn set_executable(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

fn is_staging_name(name: &str) -> bool {
    name.starts_with(STAGING_PREFIX) || name.starts_with(TMP_PREFIX)
}

/// Remove kvm staging files in `dir` whose last modification is older than
/// `max_age`. Younger files may belong to a concurrent invocation and are
/// left alone. A missing directory is not an error.
pub fn sweep_stale(dir: &Path, max_age: Duration) -> std::io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let now = SystemTime::now();
    let mut removed = Vec::new();

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_str().is_some_and(is_staging_name) {
            continue;
        }

        let path = entry.path();
        let meta = match std::fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(_) => continue,
        };
        let age = meta
            .modified()
            .ok()
            .and_then(|m| now.duration_since(m).ok())
            .unwrap_or_default();
        if age < max_age {
            debug!(path = %path.display(), "Leaving young staging file");
            continue;
        }

        let result = if meta.is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        match result {
            Ok(()) => removed.push(path),
            // Another sweeper got there first.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove stale file"),
        }
    }

    Ok(removed)
}

/// Sweep every directory kvm stages files in. Failures are logged, never
/// fatal: a leftover orphan only costs disk space.
pub fn sweep_orphans(paths: &KvmPaths, max_age: Duration) -> Vec<PathBuf> {
    let dirs = [
        paths.tmp_dir(),
        paths.entries_dir(),
        paths.state_dir(),
        paths.bin_dir(),
    ];
    let mut removed = Vec::new();
    for dir in dirs {
        match sweep_stale(&dir, max_age) {
            Ok(paths) => removed.extend(paths),
            Err(e) => warn!(dir = %dir.display(), error = %e, "Failed to sweep"),
        }
    }
    if !removed.is_empty() {
        debug!(count = removed.len(), "Removed orphaned staging files");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn age(path: &Path, by: Duration) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - by).unwrap();
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/record.json");

        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(TMP_PREFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_replace_link_swaps_target() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, "a").unwrap();
        std::fs::write(&b, "b").unwrap();
        let link = dir.path().join("bin/kubectl");

        replace_link(&a, &link).unwrap();
        assert_eq!(std::fs::read_to_string(&link).unwrap(), "a");
        replace_link(&b, &link).unwrap();
        assert_eq!(std::fs::read_to_string(&link).unwrap(), "b");
        assert_eq!(std::fs::read_link(&link).unwrap(), b);
    }

    #[test]
    fn test_sweep_only_removes_old_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join(format!("{STAGING_PREFIX}abc"));
        let fresh = dir.path().join(format!("{TMP_PREFIX}def"));
        let unrelated = dir.path().join("kubectl");
        for p in [&stale, &fresh, &unrelated] {
            std::fs::write(p, "x").unwrap();
        }
        age(&stale, Duration::from_secs(2 * 60 * 60));
        age(&unrelated, Duration::from_secs(2 * 60 * 60));

        let removed = sweep_stale(dir.path(), STALE_AFTER).unwrap();

        assert_eq!(removed, vec![stale.clone()]);
        assert!(!stale.exists());
        assert!(fresh.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_sweep_orphans_covers_layout() {
        let dir = tempfile::tempdir().unwrap();
        let paths = KvmPaths::at(dir.path());
        paths.ensure_layout().unwrap();
        let in_bin = paths.bin_dir().join(format!("{TMP_PREFIX}0123"));
        let in_entries = paths.entries_dir().join(format!("{TMP_PREFIX}4567"));
        for p in [&in_bin, &in_entries] {
            std::fs::write(p, "x").unwrap();
            age(p, 2 * STALE_AFTER);
        }

        let mut removed = sweep_orphans(&paths, STALE_AFTER);
        removed.sort();
        let mut expected = vec![in_bin, in_entries];
        expected.sort();
        assert_eq!(removed, expected);
    }

    #[test]
    fn test_sweep_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(sweep_stale(&dir.path().join("nope"), STALE_AFTER).unwrap().is_empty());
    }
}
