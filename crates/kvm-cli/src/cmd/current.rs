//! Current command

use anyhow::Result;

use crate::ui::Output;
use kvm_core::activation::{ActivationError, Activator};
use kvm_core::{KvmError, Settings};

/// Print the active release.
pub fn current(output: &Output) -> Result<()> {
    let settings = Settings::from_env()?;
    let pointer = Activator::new(settings.paths)
        .current()
        .ok_or_else(|| KvmError::from(ActivationError::NoneActive))?;

    if !pointer.target.is_file() {
        output.warning(&format!(
            "The cached kubectl {} is missing. Run `kvm install {}` to restore it.",
            pointer.version, pointer.version
        ));
    }

    println!("{}", pointer.version);
    Ok(())
}
