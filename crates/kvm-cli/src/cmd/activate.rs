//! Activate command (aliased as 'use')

use anyhow::Result;

use crate::ops::Context;
use crate::ops::resolve::parse_spec;
use crate::ui::Output;

/// Switch the active kubectl to an installed release.
pub fn activate(spec: &str, platform: Option<&str>, output: &Output) -> Result<()> {
    let spec = parse_spec(spec)?;
    let ctx = super::context(platform, output)?;
    ctx.prepare()?;

    let pointer = crate::ops::switch::activate(&ctx, &spec)?;
    output.success(&format!(
        "Now using kubectl {} ({})",
        pointer.version, pointer.platform
    ));
    path_hint(&ctx, output);
    Ok(())
}

/// Remind the user to put the managed directory on `PATH`.
pub(crate) fn path_hint(ctx: &Context, output: &Output) {
    let bin = ctx.paths().bin_dir();
    let on_path = std::env::var_os("PATH")
        .is_some_and(|path| std::env::split_paths(&path).any(|dir| dir == bin));
    if !on_path {
        output.info(&format!("Add {} to your PATH to use it", bin.display()));
    }
}
