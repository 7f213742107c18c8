//! Resolve command

use anyhow::Result;

use crate::ops::resolve::{parse_spec, resolve_remote};
use crate::ui::Output;

/// Print the concrete version `spec` selects upstream.
pub async fn resolve(spec: &str, platform: Option<&str>, output: &Output) -> Result<()> {
    let spec = parse_spec(spec)?;
    let ctx = super::context(platform, output)?;

    let release = resolve_remote(&ctx, &spec).await?;
    if release.artifact(ctx.platform).is_none() {
        output.warning(&format!(
            "{} has no {} build",
            release.version, ctx.platform
        ));
    }

    println!("{}", release.version);
    Ok(())
}
