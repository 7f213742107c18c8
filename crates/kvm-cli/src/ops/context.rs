//! Shared command context.
//!
//! Groups the settings, target platform and core components one invocation
//! works with, so operations take a single argument.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tracing::debug;

use kvm_core::activation::Activator;
use kvm_core::fetcher::Fetcher;
use kvm_core::io::fs::{STALE_AFTER, sweep_orphans};
use kvm_core::state::StateStore;
use kvm_core::{KvmError, KvmPaths, Reporter, Settings};
use kvm_schema::{Platform, ReleaseDescriptor};

#[derive(Clone)]
pub struct Context {
    pub settings: Settings,
    pub platform: Platform,
    pub client: reqwest::Client,
    pub store: StateStore,
    pub fetcher: Arc<Fetcher>,
    pub activator: Arc<Activator>,
    pub reporter: Arc<dyn Reporter>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("home", &self.settings.paths.root())
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl Context {
    pub fn new(settings: Settings, platform: Platform, reporter: Arc<dyn Reporter>) -> Result<Self> {
        let client = settings.http_client()?;
        let paths = settings.paths.clone();
        Ok(Self {
            store: StateStore::new(paths.clone()),
            fetcher: Arc::new(Fetcher::new(client.clone(), paths.clone(), settings.retry)),
            activator: Arc::new(Activator::new(paths)),
            client,
            settings,
            platform,
            reporter,
        })
    }

    /// Settings from `KVM_*` variables; the platform from `--platform`
    /// when given, else the running host.
    pub fn from_env(platform: Option<&str>, reporter: Arc<dyn Reporter>) -> Result<Self> {
        let settings = Settings::from_env()?;
        let platform = match platform {
            Some(p) => p.parse::<Platform>().map_err(KvmError::from)?,
            None => Platform::current().map_err(KvmError::from)?,
        };
        debug!(home = %settings.paths.root().display(), %platform, "Loaded settings");
        Self::new(settings, platform, reporter)
    }

    pub fn paths(&self) -> &KvmPaths {
        &self.settings.paths
    }

    /// Create the home layout and clear staging files abandoned by
    /// interrupted runs. Called before every mutating command.
    pub fn prepare(&self) -> Result<()> {
        self.paths()
            .ensure_layout()
            .with_context(|| format!("Failed to create {}", self.paths().root().display()))?;
        let removed = sweep_orphans(self.paths(), STALE_AFTER);
        if !removed.is_empty() {
            debug!(count = removed.len(), "Swept orphaned staging files");
        }
        Ok(())
    }

    /// Fetch a fresh catalog snapshot from the configured source.
    pub async fn catalog(&self) -> Result<Vec<ReleaseDescriptor>, KvmError> {
        let catalog = self.settings.catalog(self.client.clone());
        debug!(source = %catalog.describe(), "Fetching catalog");
        let releases = catalog.fetch_catalog().await?;
        debug!(count = releases.len(), "Catalog fetched");
        Ok(releases)
    }
}
