//! Uninstall command

use anyhow::{Result, bail};

use crate::ops::remove::{Removal, uninstall as remove};
use crate::ops::resolve::parse_spec;
use crate::ui::Output;

/// Remove a cached release. The active release is never removed.
pub fn uninstall(spec: &str, platform: Option<&str>, output: &Output) -> Result<()> {
    let spec = parse_spec(spec)?;
    let ctx = super::context(platform, output)?;
    ctx.prepare()?;

    match remove(&ctx, &spec)? {
        Removal::Removed(entry) => {
            output.success(&format!(
                "Removed kubectl {} ({})",
                entry.version, entry.platform
            ));
            Ok(())
        }
        Removal::Active(entry) => bail!(
            "kubectl {} is active. Activate another version before removing it.",
            entry.version
        ),
    }
}
