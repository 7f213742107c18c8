//! Crate-wide error type and the failure taxonomy the CLI maps to exit codes.

use thiserror::Error;

use crate::activation::ActivationError;
use crate::catalog::CatalogError;
use crate::fetcher::FetchError;
use crate::resolver::ResolveError;
use crate::state::StateError;
use kvm_schema::SchemaError;

/// Any failure surfaced by a kvm operation.
#[derive(Error, Debug)]
pub enum KvmError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Activation(#[from] ActivationError),

    #[error(transparent)]
    State(#[from] StateError),
}

/// Distinct failure categories. Every error maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidSpecifier,
    NoMatch,
    NetworkUnavailable,
    ChecksumMismatch,
    PlatformUnsupported,
    NotCached,
    MalformedCatalog,
    DiskWrite,
}

impl ErrorKind {
    /// Process exit code for this category.
    ///
    /// 2 is left to clap's usage errors.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::DiskWrite | Self::MalformedCatalog => 1,
            Self::InvalidSpecifier => 8,
            Self::NoMatch => 3,
            Self::NetworkUnavailable => 4,
            Self::ChecksumMismatch => 5,
            Self::PlatformUnsupported => 6,
            Self::NotCached => 7,
        }
    }
}

impl KvmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema(SchemaError::UnsupportedPlatform(_)) => ErrorKind::PlatformUnsupported,
            Self::Schema(_) => ErrorKind::InvalidSpecifier,
            Self::Catalog(CatalogError::Network { .. }) => ErrorKind::NetworkUnavailable,
            Self::Catalog(CatalogError::Malformed { .. }) => ErrorKind::MalformedCatalog,
            Self::Resolve(ResolveError::NoMatch(_)) => ErrorKind::NoMatch,
            Self::Fetch(err) => err.kind(),
            Self::Activation(
                ActivationError::NotCached { .. }
                | ActivationError::NoInstalledMatch(_)
                | ActivationError::NoneActive,
            ) => ErrorKind::NotCached,
            Self::Activation(_) | Self::State(_) => ErrorKind::DiskWrite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvm_schema::{KubeVersion, VersionSpecifier};

    #[test]
    fn test_kinds_have_distinct_codes() {
        let not_cached = KvmError::from(ActivationError::NotCached {
            version: KubeVersion::new(1, 29, 0),
            platform: "linux/amd64".parse().unwrap(),
            reason: "not installed".into(),
        });
        let no_match = KvmError::from(ResolveError::NoMatch(VersionSpecifier::Latest));
        let invalid = KvmError::from(SchemaError::InvalidSpecifier("x".into()));

        assert_eq!(not_cached.kind(), ErrorKind::NotCached);
        assert_eq!(no_match.kind(), ErrorKind::NoMatch);
        assert_eq!(invalid.kind(), ErrorKind::InvalidSpecifier);
        assert_ne!(not_cached.kind().exit_code(), no_match.kind().exit_code());
        assert_ne!(invalid.kind().exit_code(), no_match.kind().exit_code());
        assert_ne!(invalid.kind().exit_code(), 2);
    }
}
