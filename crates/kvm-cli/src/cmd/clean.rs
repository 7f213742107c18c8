//! Clean command

use anyhow::Result;

use crate::ui::Output;
use kvm_core::Settings;
use kvm_core::io::fs::{STALE_AFTER, sweep_orphans};
use kvm_core::state::StateStore;

/// Remove staging files abandoned by interrupted runs and forget cache
/// entries whose artifact is gone.
pub fn clean(output: &Output) -> Result<()> {
    let settings = Settings::from_env()?;
    let paths = settings.paths;

    let removed = sweep_orphans(&paths, STALE_AFTER);
    for path in &removed {
        tracing::debug!(path = %path.display(), "Removed");
    }

    let store = StateStore::new(paths);
    let mut forgotten = 0;
    for entry in store.list() {
        if !entry.path.is_file() && store.remove(&entry.version, entry.platform)? {
            forgotten += 1;
        }
    }

    if removed.is_empty() && forgotten == 0 {
        output.success("Nothing to clean.");
    } else {
        output.success(&format!(
            "Removed {} staging file(s) and {forgotten} dangling cache record(s).",
            removed.len()
        ));
    }
    Ok(())
}
