//! List commands

use std::collections::BTreeSet;

use anyhow::Result;

use crate::ops::resolve::parse_spec;
use crate::ui::Output;
use crate::ui::list::{print_footer, print_installed, print_remote};
use kvm_core::resolver::{self, ResolveError};
use kvm_core::state::StateStore;
use kvm_core::{KvmError, Settings};
use kvm_schema::{KubeVersion, Platform, ReleaseDescriptor, VersionSpecifier};

/// List cached releases, newest first. Every platform is listed unless
/// `--platform` narrows it.
pub fn list_installed(platform: Option<&str>, output: &Output) -> Result<()> {
    let settings = Settings::from_env()?;
    let store = StateStore::new(settings.paths);

    let mut entries = match platform {
        Some(p) => store.list_for(p.parse::<Platform>().map_err(KvmError::from)?),
        None => store.list(),
    };

    if entries.is_empty() {
        output.info("No versions installed. Run `kvm install <version>` to get started.");
        return Ok(());
    }

    entries.sort_by(|a, b| {
        b.version
            .cmp(&a.version)
            .then_with(|| a.platform.cmp(&b.platform))
    });
    let active = store.get_active();

    print_installed(output.theme(), &entries, active.as_ref());
    print_footer(entries.len(), "cached release");
    Ok(())
}

/// List catalog releases built for the target platform, newest first.
pub async fn list_remote(
    spec: Option<&str>,
    pre: bool,
    limit: usize,
    platform: Option<&str>,
    output: &Output,
) -> Result<()> {
    let spec = spec
        .map(parse_spec)
        .transpose()?
        .unwrap_or(VersionSpecifier::Latest);
    let ctx = super::context(platform, output)?;
    let releases = ctx.catalog().await?;

    let matched: Vec<&ReleaseDescriptor> = if pre {
        releases
            .iter()
            .rev()
            .filter(|r| spec.admits(&r.version))
            .collect()
    } else {
        resolver::candidates(&spec, &releases)
    };
    let mut shown: Vec<&ReleaseDescriptor> = matched
        .into_iter()
        .filter(|r| r.artifact(ctx.platform).is_some())
        .collect();

    if shown.is_empty() {
        return Err(KvmError::from(ResolveError::NoMatch(spec)).into());
    }

    let total = shown.len();
    shown.truncate(limit.max(1));

    let installed: BTreeSet<KubeVersion> = ctx
        .store
        .list_for(ctx.platform)
        .into_iter()
        .map(|e| e.version)
        .collect();

    print_remote(output.theme(), &shown, &installed);
    if total > shown.len() {
        output.info(&format!(
            "Showing {} of {total} releases. Use --limit to see more.",
            shown.len()
        ));
    }
    Ok(())
}
