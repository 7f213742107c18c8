//! Switch the active release.

use super::Context;
use super::resolve::resolve_installed;
use kvm_core::KvmError;
use kvm_schema::{ActivePointer, VersionSpecifier};

/// Resolve `spec` against the cache and repoint the managed command.
pub fn activate(ctx: &Context, spec: &VersionSpecifier) -> Result<ActivePointer, KvmError> {
    let entry = resolve_installed(ctx, spec)?;
    Ok(ctx.activator.activate(&entry.version, ctx.platform)?)
}
