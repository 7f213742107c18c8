//! Version catalog clients.
//!
//! A catalog turns some remote listing into a snapshot of
//! [`ReleaseDescriptor`]s. Remote data is untrusted: entries that do not
//! parse are skipped with a warning, and only a document that cannot be
//! read at all fails the fetch.

mod github;
mod index;

pub use github::GithubCatalog;
pub use index::IndexCatalog;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::io::download::fetch_text;
use crate::retry::{RetryPolicy, Transient};
use kvm_schema::{KubeVersion, ReleaseDescriptor};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed catalog at {url}: {reason}")]
    Malformed { url: String, reason: String },
}

impl CatalogError {
    pub(crate) fn network(url: &str, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn malformed(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::Malformed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl Transient for CatalogError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Network { source, .. } => source.is_transient(),
            Self::Malformed { .. } => false,
        }
    }
}

/// A source of release descriptors.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch the full snapshot of known releases, sorted by version.
    async fn fetch_catalog(&self) -> Result<Vec<ReleaseDescriptor>, CatalogError>;

    /// Where the snapshot comes from, for messages.
    fn describe(&self) -> String;
}

/// Read the upstream stable marker (`stable.txt`) and validate it.
pub async fn fetch_stable_marker(
    client: &Client,
    url: &str,
    retry: &RetryPolicy,
) -> Result<KubeVersion, CatalogError> {
    let body = retry
        .run("stable marker", || async {
            fetch_text(client, url)
                .await
                .map_err(|e| CatalogError::network(url, e))
        })
        .await?;

    KubeVersion::parse(&body).map_err(|e| CatalogError::malformed(url, e))
}

/// Sort and de-duplicate a snapshot, keeping the first descriptor seen for
/// each version.
pub(crate) fn normalise(mut releases: Vec<ReleaseDescriptor>) -> Vec<ReleaseDescriptor> {
    let mut seen = std::collections::HashSet::new();
    releases.retain(|r| seen.insert(r.version.clone()));
    releases.sort_by(|a, b| a.version.cmp(&b.version));
    releases
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stable_marker() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/stable.txt")
            .with_body("v1.31.2\n")
            .create_async()
            .await;

        let url = format!("{}/stable.txt", server.url());
        let v = fetch_stable_marker(&Client::new(), &url, &RetryPolicy::none())
            .await
            .unwrap();
        assert_eq!(v, KubeVersion::new(1, 31, 2));
    }

    #[tokio::test]
    async fn test_stable_marker_garbage_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/stable.txt")
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let url = format!("{}/stable.txt", server.url());
        let err = fetch_stable_marker(&Client::new(), &url, &RetryPolicy::none())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_stable_marker_retries_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let failing = server
            .mock("GET", "/stable.txt")
            .with_status(502)
            .expect(2)
            .create_async()
            .await;

        let url = format!("{}/stable.txt", server.url());
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: std::time::Duration::ZERO,
        };
        let err = fetch_stable_marker(&Client::new(), &url, &policy)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Network { .. }));
        failing.assert_async().await;
    }
}
