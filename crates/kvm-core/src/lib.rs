//! kvm core - install, cache and switch between kubectl releases.
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! # Overview
//!
//! A user specifier (`latest`, `1.29`, `1.29.3`) flows through four
//! components, each testable on its own:
//!
//! - [`catalog`]: fetches the list of upstream releases.
//! - [`resolver`]: pure mapping of specifier + snapshot to one release.
//! - [`fetcher`]: downloads, verifies and caches one artifact.
//! - [`activation`]: atomically repoints the managed command.
//!
//! [`state::StateStore`] persists the cache index and the active pointer.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.kvm/
//! ├── bin/kubectl            # Symlink to the active cached artifact
//! ├── cache/<version>/<os>-<arch>/kubectl
//! ├── state/active.json      # Active pointer
//! ├── state/entries/*.json   # One record per cached (version, platform)
//! └── tmp/                   # Download staging (same volume as cache/)
//! ```

pub mod activation;
pub mod catalog;
pub mod error;
pub mod fetcher;
pub mod io;
pub mod paths;
pub mod reporter;
pub mod resolver;
pub mod retry;
pub mod settings;
pub mod state;

pub use error::{ErrorKind, KvmError};
pub use paths::KvmPaths;
pub use reporter::{NullReporter, Reporter};
pub use retry::RetryPolicy;
pub use settings::Settings;

/// User Agent string for every outbound request
pub const USER_AGENT: &str = concat!("kvm/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client.
pub fn http_client(timeout: std::time::Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}
