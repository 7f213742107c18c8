//! Install command

use anyhow::Result;

use crate::ops::resolve::parse_spec;
use crate::ui::Output;
use kvm_core::KvmError;

/// Install a release, optionally activating it.
pub async fn install(spec: &str, activate: bool, platform: Option<&str>, output: &Output) -> Result<()> {
    let spec = parse_spec(spec)?;
    let ctx = super::context(platform, output)?;
    ctx.prepare()?;

    let entry = crate::ops::install::install(&ctx, &spec).await?;

    if activate {
        let pointer = ctx
            .activator
            .activate(&entry.version, ctx.platform)
            .map_err(KvmError::from)?;
        output.success(&format!("Now using kubectl {}", pointer.version));
        super::activate::path_hint(&ctx, output);
    } else {
        output.info(&format!("Run `kvm activate {}` to use it", entry.version));
    }
    Ok(())
}
