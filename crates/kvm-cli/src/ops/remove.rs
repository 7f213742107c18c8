//! Cache eviction.

use super::Context;
use super::resolve::resolve_installed;
use kvm_core::KvmError;
use kvm_schema::{CacheEntry, VersionSpecifier};

/// What [`uninstall`] did.
#[derive(Debug)]
pub enum Removal {
    Removed(CacheEntry),
    /// The release is the active one and was left in place.
    Active(CacheEntry),
}

/// Evict the cached release matching `spec` unless it is active.
///
/// A release counts as active when either the pointer or the managed link
/// refers to it.
pub fn uninstall(ctx: &Context, spec: &VersionSpecifier) -> Result<Removal, KvmError> {
    let entry = resolve_installed(ctx, spec)?;

    let is_active = ctx.activator.links_to(&entry.path)
        || ctx
            .activator
            .current()
            .is_some_and(|a| a.version == entry.version && a.platform == entry.platform);
    if is_active {
        return Ok(Removal::Active(entry));
    }

    ctx.fetcher.evict(&entry.version, ctx.platform)?;
    Ok(Removal::Removed(entry))
}
