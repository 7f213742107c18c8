use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Catalog, CatalogError, normalise};
use crate::retry::RetryPolicy;
use kvm_schema::{Checksum, KubeVersion, Platform, PlatformArtifact, ReleaseDescriptor};

const PER_PAGE: usize = 100;

/// The subset of a GitHub release object kvm reads.
#[derive(Debug, Deserialize)]
struct GithubRelease {
    tag_name: String,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    prerelease: bool,
    published_at: Option<DateTime<Utc>>,
}

/// The upstream GitHub releases listing.
///
/// GitHub only carries tags, so per-platform URLs are derived from the
/// release bucket layout and checksums are fetched from the `.sha256` file
/// published next to each binary.
pub struct GithubCatalog {
    client: Client,
    api_url: String,
    download_base: String,
    max_pages: u32,
    token: Option<String>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for GithubCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubCatalog")
            .field("api_url", &self.api_url)
            .field("download_base", &self.download_base)
            .field("max_pages", &self.max_pages)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl GithubCatalog {
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        download_base: impl Into<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            download_base: download_base.into(),
            max_pages: 10,
            token: None,
            retry,
        }
    }

    /// Stop after this many pages of 100 releases.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Authenticate requests to lift the anonymous rate limit.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// `{base}/{version}/bin/{os}/{arch}/kubectl[.exe]`
    fn artifact_url(&self, version: &KubeVersion, platform: Platform) -> String {
        format!(
            "{}/{version}/bin/{}/{}/{}",
            self.download_base.trim_end_matches('/'),
            platform.os.as_str(),
            platform.arch.as_str(),
            platform.binary_name()
        )
    }

    fn descriptor(&self, release: GithubRelease) -> Option<ReleaseDescriptor> {
        if release.draft {
            return None;
        }
        let version = match KubeVersion::parse(&release.tag_name) {
            Ok(v) => v,
            Err(_) => {
                debug!(tag = %release.tag_name, "Skipping non-version tag");
                return None;
            }
        };

        let artifacts = Platform::SUPPORTED
            .iter()
            .map(|&platform| {
                let url = self.artifact_url(&version, platform);
                let checksum = Checksum::Remote(format!("{url}.sha256"));
                (platform, PlatformArtifact { url, checksum })
            })
            .collect::<BTreeMap<_, _>>();

        Some(ReleaseDescriptor {
            version,
            published_at: release.published_at,
            prerelease: release.prerelease,
            artifacts,
        })
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<serde_json::Value>, CatalogError> {
        let url = format!("{}?per_page={PER_PAGE}&page={page}", self.api_url);
        let body = self
            .retry
            .run("catalog page", || async {
                let mut request = self
                    .client
                    .get(&url)
                    .header(reqwest::header::ACCEPT, "application/vnd.github+json");
                if let Some(token) = &self.token {
                    request = request.bearer_auth(token);
                }
                let response = request
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|e| CatalogError::network(&url, e))?;
                response
                    .text()
                    .await
                    .map_err(|e| CatalogError::network(&url, e))
            })
            .await?;

        serde_json::from_str(&body).map_err(|e| CatalogError::malformed(&url, e))
    }
}

#[async_trait]
impl Catalog for GithubCatalog {
    async fn fetch_catalog(&self) -> Result<Vec<ReleaseDescriptor>, CatalogError> {
        let mut releases = Vec::new();

        for page in 1..=self.max_pages {
            let entries = self.fetch_page(page).await?;
            let count = entries.len();
            debug!(page, count, "Fetched release page");

            for entry in entries {
                match serde_json::from_value::<GithubRelease>(entry) {
                    Ok(release) => releases.extend(self.descriptor(release)),
                    Err(e) => warn!(error = %e, "Skipping malformed release entry"),
                }
            }

            if count < PER_PAGE {
                break;
            }
        }

        Ok(normalise(releases))
    }

    fn describe(&self) -> String {
        self.api_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn catalog(server: &mockito::Server) -> GithubCatalog {
        GithubCatalog::new(
            Client::new(),
            format!("{}/releases", server.url()),
            "https://dl.example/release/",
            RetryPolicy::none(),
        )
    }

    #[tokio::test]
    async fn test_parses_releases_and_skips_noise() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!([
            {"tag_name": "v1.31.0", "draft": false, "prerelease": false,
             "published_at": "2024-08-13T00:00:00Z", "assets": []},
            {"tag_name": "v1.32.0-alpha.1", "draft": false, "prerelease": true},
            {"tag_name": "v1.30.9", "draft": true, "prerelease": false},
            {"tag_name": "not-a-version"},
            {"name": "entry without a tag"}
        ]);
        let _m = server
            .mock("GET", "/releases")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_body(body.to_string())
            .create_async()
            .await;

        let releases = catalog(&server).fetch_catalog().await.unwrap();
        let versions: Vec<String> = releases.iter().map(|r| r.version.to_string()).collect();
        assert_eq!(versions, vec!["v1.31.0", "v1.32.0-alpha.1"]);
        assert!(releases[1].prerelease);

        let linux = releases[0]
            .artifact("linux/amd64".parse().unwrap())
            .unwrap();
        assert_eq!(
            linux.url,
            "https://dl.example/release/v1.31.0/bin/linux/amd64/kubectl"
        );
        assert_eq!(
            linux.checksum,
            Checksum::Remote(
                "https://dl.example/release/v1.31.0/bin/linux/amd64/kubectl.sha256".into()
            )
        );
        let windows = releases[0]
            .artifact("windows/amd64".parse().unwrap())
            .unwrap();
        assert!(windows.url.ends_with("/windows/amd64/kubectl.exe"));
    }

    #[tokio::test]
    async fn test_follows_pages_until_short_page() {
        let mut server = mockito::Server::new_async().await;
        let full: Vec<_> = (0..100)
            .map(|i| serde_json::json!({"tag_name": format!("v1.20.{i}")}))
            .collect();
        let page1 = server
            .mock("GET", "/releases")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_body(serde_json::Value::Array(full).to_string())
            .create_async()
            .await;
        let page2 = server
            .mock("GET", "/releases")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_body(r#"[{"tag_name": "v1.21.0"}]"#)
            .create_async()
            .await;

        let releases = catalog(&server).fetch_catalog().await.unwrap();
        assert_eq!(releases.len(), 101);
        assert_eq!(releases.last().unwrap().version, KubeVersion::new(1, 21, 0));
        page1.assert_async().await;
        page2.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_array_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/releases")
            .match_query(Matcher::Any)
            .with_body(r#"{"message": "API rate limit exceeded"}"#)
            .create_async()
            .await;

        let err = catalog(&server).fetch_catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_http_failure_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/releases")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = catalog(&server).fetch_catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::Network { .. }));
    }
}
