//! Runtime settings, read from `KVM_*` environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `KVM_HOME` | `~/.kvm` |
//! | `KVM_CATALOG_URL` | unset: GitHub releases listing |
//! | `KVM_GITHUB_API_URL` | `https://api.github.com/repos/kubernetes/kubernetes/releases` |
//! | `KVM_DOWNLOAD_BASE_URL` | `https://dl.k8s.io/release` |
//! | `KVM_STABLE_URL` | `https://dl.k8s.io/release/stable.txt` |
//! | `KVM_RETRIES` | `3` |
//! | `KVM_HTTP_TIMEOUT` | `60` (seconds) |
//! | `KVM_CATALOG_PAGES` | `10` |
//!
//! `GITHUB_TOKEN`, when set, authenticates GitHub listing requests.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Client;

use crate::catalog::{Catalog, GithubCatalog, IndexCatalog};
use crate::paths::KvmPaths;
use crate::retry::RetryPolicy;

pub const DEFAULT_GITHUB_API_URL: &str =
    "https://api.github.com/repos/kubernetes/kubernetes/releases";
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://dl.k8s.io/release";
pub const DEFAULT_STABLE_URL: &str = "https://dl.k8s.io/release/stable.txt";

/// Where the release catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Github {
        api_url: String,
        max_pages: u32,
        token: Option<String>,
    },
    Index {
        url: String,
    },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub paths: KvmPaths,
    pub catalog: CatalogSource,
    pub download_base: String,
    pub stable_url: String,
    pub retry: RetryPolicy,
    pub http_timeout: Duration,
}

impl Settings {
    /// Defaults for everything except the home directory.
    pub fn with_paths(paths: KvmPaths) -> Self {
        Self {
            paths,
            catalog: CatalogSource::Github {
                api_url: DEFAULT_GITHUB_API_URL.to_string(),
                max_pages: 10,
                token: None,
            },
            download_base: DEFAULT_DOWNLOAD_BASE_URL.to_string(),
            stable_url: DEFAULT_STABLE_URL.to_string(),
            retry: RetryPolicy::default(),
            http_timeout: Duration::from_secs(60),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let paths = match get("KVM_HOME") {
            Some(home) => KvmPaths::at(home),
            None => dirs::home_dir()
                .map(|h| KvmPaths::at(h.join(".kvm")))
                .context("Could not determine home directory. Set KVM_HOME to override.")?,
        };

        let mut settings = Self::with_paths(paths);

        if let Some(url) = get("KVM_CATALOG_URL") {
            settings.catalog = CatalogSource::Index { url };
        } else {
            settings.catalog = CatalogSource::Github {
                api_url: get("KVM_GITHUB_API_URL")
                    .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
                max_pages: parse_var(&get, "KVM_CATALOG_PAGES")?.unwrap_or(10),
                token: get("GITHUB_TOKEN"),
            };
        }

        if let Some(base) = get("KVM_DOWNLOAD_BASE_URL") {
            settings.download_base = base;
        }
        if let Some(url) = get("KVM_STABLE_URL") {
            settings.stable_url = url;
        }
        if let Some(attempts) = parse_var::<u32>(&get, "KVM_RETRIES")? {
            if attempts == 0 {
                bail!("KVM_RETRIES must be at least 1");
            }
            settings.retry.max_attempts = attempts;
        }
        if let Some(secs) = parse_var::<u64>(&get, "KVM_HTTP_TIMEOUT")? {
            settings.http_timeout = Duration::from_secs(secs);
        }

        Ok(settings)
    }

    pub fn http_client(&self) -> Result<Client> {
        crate::http_client(self.http_timeout).context("Failed to build HTTP client")
    }

    /// The catalog client these settings select.
    pub fn catalog(&self, client: Client) -> Box<dyn Catalog> {
        match &self.catalog {
            CatalogSource::Index { url } => {
                Box::new(IndexCatalog::new(client, url.clone(), self.retry))
            }
            CatalogSource::Github {
                api_url,
                max_pages,
                token,
            } => Box::new(
                GithubCatalog::new(client, api_url.clone(), self.download_base.clone(), self.retry)
                    .with_max_pages(*max_pages)
                    .with_token(token.clone()),
            ),
        }
    }
}

fn parse_var<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid {key}: {raw:?}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[("KVM_HOME", "/tmp/kvm-home")]).unwrap();
        assert_eq!(s.paths, KvmPaths::at("/tmp/kvm-home"));
        assert_eq!(s.download_base, DEFAULT_DOWNLOAD_BASE_URL);
        assert_eq!(s.retry.max_attempts, 3);
        assert_eq!(s.http_timeout, Duration::from_secs(60));
        assert!(matches!(s.catalog, CatalogSource::Github { max_pages: 10, .. }));
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("KVM_HOME", "/tmp/kvm-home"),
            ("KVM_CATALOG_URL", "https://mirror.example/index.json"),
            ("KVM_RETRIES", "5"),
            ("KVM_HTTP_TIMEOUT", " 10 "),
        ])
        .unwrap();
        assert_eq!(
            s.catalog,
            CatalogSource::Index {
                url: "https://mirror.example/index.json".into()
            }
        );
        assert_eq!(s.retry.max_attempts, 5);
        assert_eq!(s.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let s = settings(&[("KVM_HOME", "/tmp/kvm-home"), ("KVM_CATALOG_URL", "")]).unwrap();
        assert!(matches!(s.catalog, CatalogSource::Github { .. }));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(settings(&[("KVM_HOME", "/h"), ("KVM_RETRIES", "many")]).is_err());
        assert!(settings(&[("KVM_HOME", "/h"), ("KVM_RETRIES", "0")]).is_err());
        assert!(settings(&[("KVM_HOME", "/h"), ("KVM_CATALOG_PAGES", "-1")]).is_err());
    }
}
