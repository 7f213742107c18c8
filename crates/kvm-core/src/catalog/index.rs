use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use super::{Catalog, CatalogError, normalise};
use crate::retry::RetryPolicy;
use kvm_schema::{Checksum, KubeVersion, Platform, PlatformArtifact, ReleaseDescriptor, Sha256Digest};

#[derive(Debug, Deserialize)]
struct IndexDocument {
    releases: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct IndexRelease {
    version: String,
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    artifacts: BTreeMap<String, IndexArtifact>,
}

#[derive(Debug, Deserialize)]
struct IndexArtifact {
    url: String,
    sha256: Option<String>,
    sha256_url: Option<String>,
}

/// A JSON mirror index with checksums carried inline.
///
/// ```json
/// {"releases": [{"version": "v1.29.3", "published_at": "...",
///   "prerelease": false,
///   "artifacts": {"linux/amd64": {"url": "...", "sha256": "..."}}}]}
/// ```
///
/// `sha256_url` may replace `sha256` for mirrors that publish checksum
/// files. An artifact with neither is dropped rather than trusted.
#[derive(Debug)]
pub struct IndexCatalog {
    client: Client,
    url: String,
    retry: RetryPolicy,
}

impl IndexCatalog {
    pub fn new(client: Client, url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            url: url.into(),
            retry,
        }
    }

    /// Parse an index document. Entries that fail validation are skipped.
    pub fn parse(url: &str, body: &str) -> Result<Vec<ReleaseDescriptor>, CatalogError> {
        let doc: IndexDocument =
            serde_json::from_str(body).map_err(|e| CatalogError::malformed(url, e))?;

        let releases = doc
            .releases
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<IndexRelease>(entry) {
                Ok(release) => descriptor(release),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed index entry");
                    None
                }
            })
            .collect();

        Ok(normalise(releases))
    }
}

fn descriptor(release: IndexRelease) -> Option<ReleaseDescriptor> {
    let version = match KubeVersion::parse(&release.version) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "Skipping index entry");
            return None;
        }
    };

    let mut artifacts = BTreeMap::new();
    for (key, artifact) in release.artifacts {
        let Ok(platform) = key.parse::<Platform>() else {
            warn!(%version, platform = %key, "Skipping unknown platform");
            continue;
        };
        let checksum = match (artifact.sha256, artifact.sha256_url) {
            (Some(hex), _) => match Sha256Digest::new(hex) {
                Ok(digest) => Checksum::Inline(digest),
                Err(e) => {
                    warn!(%version, %platform, error = %e, "Skipping artifact");
                    continue;
                }
            },
            (None, Some(url)) => Checksum::Remote(url),
            (None, None) => {
                warn!(%version, %platform, "Skipping artifact without checksum");
                continue;
            }
        };
        artifacts.insert(
            platform,
            PlatformArtifact {
                url: artifact.url,
                checksum,
            },
        );
    }

    Some(ReleaseDescriptor {
        version,
        published_at: release.published_at,
        prerelease: release.prerelease,
        artifacts,
    })
}

#[async_trait]
impl Catalog for IndexCatalog {
    async fn fetch_catalog(&self) -> Result<Vec<ReleaseDescriptor>, CatalogError> {
        let url = self.url.as_str();
        let body = self
            .retry
            .run("catalog index", || async {
                crate::io::download::fetch_text(&self.client, url)
                    .await
                    .map_err(|e| CatalogError::network(url, e))
            })
            .await?;

        Self::parse(url, &body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_parse_index() {
        let body = serde_json::json!({
            "schema": 2,
            "releases": [
                {
                    "version": "v1.29.3",
                    "published_at": "2024-03-15T00:00:00Z",
                    "artifacts": {
                        "linux/amd64": {"url": "https://m/v1.29.3/kubectl", "sha256": HELLO},
                        "darwin/arm64": {"url": "https://m/darwin", "sha256_url": "https://m/darwin.sha256"},
                        "plan9/mips": {"url": "https://m/plan9", "sha256": HELLO},
                        "linux/arm64": {"url": "https://m/no-checksum"}
                    },
                    "signed_by": "future field"
                }
            ]
        })
        .to_string();

        let releases = IndexCatalog::parse("test", &body).unwrap();
        assert_eq!(releases.len(), 1);
        let r = &releases[0];
        assert_eq!(r.version, KubeVersion::new(1, 29, 3));
        assert!(!r.prerelease);
        assert_eq!(r.artifacts.len(), 2);
        assert_eq!(
            r.artifact("linux/amd64".parse().unwrap()).unwrap().checksum,
            Checksum::Inline(Sha256Digest::new(HELLO).unwrap())
        );
        assert!(matches!(
            r.artifact("darwin/arm64".parse().unwrap()).unwrap().checksum,
            Checksum::Remote(_)
        ));
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let body = serde_json::json!({
            "releases": [
                {"version": "garbage"},
                {"no_version": true},
                {"version": "1.30.0", "artifacts": {"linux/amd64": {"url": "u", "sha256": "short"}}},
                {"version": "1.28.1"}
            ]
        })
        .to_string();

        let releases = IndexCatalog::parse("test", &body).unwrap();
        let versions: Vec<_> = releases.iter().map(|r| r.version.to_string()).collect();
        assert_eq!(versions, vec!["v1.28.1", "v1.30.0"]);
        assert!(releases[1].artifacts.is_empty());
    }

    #[test]
    fn test_unparseable_document_fails() {
        assert!(matches!(
            IndexCatalog::parse("test", "not json"),
            Err(CatalogError::Malformed { .. })
        ));
        assert!(matches!(
            IndexCatalog::parse("test", r#"{"versions": []}"#),
            Err(CatalogError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_over_http() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/index.json")
            .with_body(r#"{"releases": [{"version": "v1.31.0"}]}"#)
            .create_async()
            .await;

        let catalog = IndexCatalog::new(
            Client::new(),
            format!("{}/index.json", server.url()),
            RetryPolicy::none(),
        );
        let releases = catalog.fetch_catalog().await.unwrap();
        assert_eq!(releases[0].version, KubeVersion::new(1, 31, 0));
    }
}
