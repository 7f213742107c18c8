//! Exec command: run the active kubectl

use std::path::Path;
use std::process::{Command, ExitCode};

use anyhow::Result;
use tracing::debug;

use kvm_core::activation::{ActivationError, Activator};
use kvm_core::{KvmError, Settings};

/// Run the managed command with `args`, forwarding its exit status.
pub fn exec(args: &[String]) -> Result<ExitCode> {
    let settings = Settings::from_env()?;
    let link = settings.paths.managed_link();

    let pointer = Activator::new(settings.paths)
        .current()
        .ok_or_else(|| KvmError::from(ActivationError::NoneActive))?;
    if !link.is_file() {
        return Err(KvmError::from(ActivationError::NotCached {
            version: pointer.version,
            platform: pointer.platform,
            reason: "cached artifact is missing".into(),
        })
        .into());
    }

    debug!(version = %pointer.version, link = %link.display(), "Executing");
    let mut command = Command::new(&link);
    command.args(args);
    run(command, &link)
}

/// Replace this process, so signals and the exit status reach the caller
/// untouched.
#[cfg(unix)]
fn run(mut command: Command, target: &Path) -> Result<ExitCode> {
    use std::os::unix::process::CommandExt;

    let err = command.exec();
    Err(anyhow::Error::new(err).context(format!("Failed to execute {}", target.display())))
}

#[cfg(not(unix))]
fn run(mut command: Command, target: &Path) -> Result<ExitCode> {
    use anyhow::Context as _;

    let status = command
        .status()
        .with_context(|| format!("Failed to execute {}", target.display()))?;
    Ok(ExitCode::from(status.code().unwrap_or(1) as u8))
}
