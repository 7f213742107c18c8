//! Latest command

use anyhow::Result;

use kvm_core::catalog::fetch_stable_marker;
use kvm_core::{KvmError, Settings};

/// Print the release upstream currently marks as stable.
pub async fn latest() -> Result<()> {
    let settings = Settings::from_env()?;
    let client = settings.http_client()?;

    let version = fetch_stable_marker(&client, &settings.stable_url, &settings.retry)
        .await
        .map_err(KvmError::from)?;

    println!("{version}");
    Ok(())
}
