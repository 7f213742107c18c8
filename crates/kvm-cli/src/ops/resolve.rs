//! Specifier resolution against the catalog or the local cache.

use tracing::debug;

use super::Context;
use kvm_core::KvmError;
use kvm_core::activation::ActivationError;
use kvm_core::resolver;
use kvm_schema::{CacheEntry, ReleaseDescriptor, VersionSpecifier};

pub fn parse_spec(input: &str) -> Result<VersionSpecifier, KvmError> {
    Ok(VersionSpecifier::parse(input)?)
}

/// Resolve against a fresh catalog snapshot.
pub async fn resolve_remote(
    ctx: &Context,
    spec: &VersionSpecifier,
) -> Result<ReleaseDescriptor, KvmError> {
    let releases = ctx.catalog().await?;
    let release = resolver::resolve(spec, &releases)?;
    debug!(%spec, version = %release.version, "Resolved against catalog");
    Ok(release.clone())
}

/// Resolve against the releases cached for the context platform.
/// Never touches the network.
pub fn resolve_installed(ctx: &Context, spec: &VersionSpecifier) -> Result<CacheEntry, KvmError> {
    let entries = ctx.store.list_for(ctx.platform);
    let entry = resolver::resolve(spec, &entries)
        .map_err(|_| ActivationError::NoInstalledMatch(spec.clone()))?;
    debug!(%spec, version = %entry.version, "Resolved against cache");
    Ok(entry.clone())
}
