//! Install flow: resolve, then ensure the artifact is cached.

use tracing::debug;

use super::Context;
use super::resolve::resolve_remote;
use kvm_core::KvmError;
use kvm_schema::{CacheEntry, KubeVersion, VersionSpecifier};

/// Make sure a release matching `spec` is cached for the context platform.
///
/// An exact specifier that is already cached is answered from the state
/// store without fetching the catalog.
pub async fn install(ctx: &Context, spec: &VersionSpecifier) -> Result<CacheEntry, KvmError> {
    if let VersionSpecifier::Exact(version) = spec
        && let Some(entry) = already_cached(ctx, version)
    {
        debug!(%version, "Skipping catalog fetch");
        return Ok(entry);
    }

    let release = resolve_remote(ctx, spec).await?;
    if let Some(entry) = already_cached(ctx, &release.version) {
        return Ok(entry);
    }

    let entry = ctx
        .fetcher
        .ensure_installed(&release, ctx.platform, &*ctx.reporter)
        .await?;
    Ok(entry)
}

fn already_cached(ctx: &Context, version: &KubeVersion) -> Option<CacheEntry> {
    let entry = ctx.fetcher.cached(version, ctx.platform)?;
    ctx.reporter.done(version, "already installed", Some(entry.size));
    Some(entry)
}
