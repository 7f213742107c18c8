//! Version identifiers and user specifiers.
//!
//! Supports:
//! - Latest: `latest`
//! - Partial: `1.29` or `v1.29` (highest stable patch of that minor)
//! - Exact: `1.29.3` or `v1.29.3`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SchemaError;

/// A concrete release version, displayed with the upstream `v` prefix.
///
/// Ordering is semantic-version ordering: major, minor and patch compare
/// numerically, so `v1.10.0 > v1.9.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KubeVersion(semver::Version);

impl KubeVersion {
    /// Build a stable version from its numeric triple.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Parse `v1.29.3`, `1.29.3` or `v1.30.0-rc.1`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidVersion`] for anything that is not a
    /// full semantic version once the optional `v` prefix is removed.
    pub fn parse(s: &str) -> Result<Self, SchemaError> {
        let trimmed = s.trim();
        let bare = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        semver::Version::parse(bare)
            .map(Self)
            .map_err(|_| SchemaError::InvalidVersion(s.to_string()))
    }

    /// Major component.
    pub fn major(&self) -> u64 {
        self.0.major
    }

    /// Minor component.
    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    /// Patch component.
    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    /// True for versions such as `v1.30.0-rc.1`.
    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }

    /// The underlying semantic version.
    pub fn as_semver(&self) -> &semver::Version {
        &self.0
    }
}

impl fmt::Display for KubeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl FromStr for KubeVersion {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for KubeVersion {
    type Error = SchemaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<KubeVersion> for String {
    fn from(v: KubeVersion) -> Self {
        v.to_string()
    }
}

/// Anything that carries a version and can therefore be resolved against.
///
/// Implemented by catalog descriptors and cache entries so the resolver
/// works the same over the remote catalog and the local install set.
pub trait Versioned {
    /// The concrete version this item describes.
    fn version(&self) -> &KubeVersion;

    /// Whether this item may be chosen by `Partial` and `Latest` selection.
    fn is_stable(&self) -> bool {
        !self.version().is_prerelease()
    }
}

impl Versioned for KubeVersion {
    fn version(&self) -> &KubeVersion {
        self
    }
}

/// User input naming the version they want.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSpecifier {
    /// One exact release.
    Exact(KubeVersion),
    /// The newest stable patch release of `major.minor`.
    Partial {
        /// Major component.
        major: u64,
        /// Minor component.
        minor: u64,
    },
    /// The newest stable release overall.
    Latest,
}

impl VersionSpecifier {
    /// Parse a user specifier.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidSpecifier`] when the input is not
    /// `latest`, `X.Y` or `X.Y.Z[-pre]` (with an optional `v`).
    pub fn parse(s: &str) -> Result<Self, SchemaError> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }

        let bare = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let invalid = || SchemaError::InvalidSpecifier(s.to_string());

        match bare.split('.').count() {
            2 => {
                let (major, minor) = bare.split_once('.').ok_or_else(invalid)?;
                Ok(Self::Partial {
                    major: parse_component(major).ok_or_else(invalid)?,
                    minor: parse_component(minor).ok_or_else(invalid)?,
                })
            }
            _ => KubeVersion::parse(bare)
                .map(Self::Exact)
                .map_err(|_| invalid()),
        }
    }

    /// Whether `version` falls inside this specifier, ignoring stability.
    pub fn admits(&self, version: &KubeVersion) -> bool {
        match self {
            Self::Exact(v) => v == version,
            Self::Partial { major, minor } => {
                version.major() == *major && version.minor() == *minor
            }
            Self::Latest => true,
        }
    }
}

/// Numeric component without sign or leading zeros (`"07"` is rejected).
fn parse_component(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || (s.len() > 1 && s.starts_with('0'))
    {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(v) => write!(f, "{v}"),
            Self::Partial { major, minor } => write!(f, "v{major}.{minor}"),
            Self::Latest => write!(f, "latest"),
        }
    }
}

impl FromStr for VersionSpecifier {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_prefix() {
        assert_eq!(KubeVersion::parse("v1.29.3").unwrap(), KubeVersion::new(1, 29, 3));
        assert_eq!(KubeVersion::parse("1.29.3").unwrap(), KubeVersion::new(1, 29, 3));
        assert_eq!(KubeVersion::parse(" v1.29.3\n").unwrap(), KubeVersion::new(1, 29, 3));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(KubeVersion::parse("g1BBerish").is_err());
        assert!(KubeVersion::parse("v1.29").is_err());
        assert!(KubeVersion::parse("").is_err());
    }

    #[test]
    fn test_display_has_prefix() {
        assert_eq!(KubeVersion::new(1, 31, 0).to_string(), "v1.31.0");
        let rc = KubeVersion::parse("v1.32.0-rc.1").unwrap();
        assert_eq!(rc.to_string(), "v1.32.0-rc.1");
        assert!(rc.is_prerelease());
    }

    #[test]
    fn test_numeric_ordering() {
        let v9 = KubeVersion::new(1, 9, 0);
        let v10 = KubeVersion::new(1, 10, 0);
        assert!(v10 > v9);
        assert!(KubeVersion::parse("v1.30.0-rc.1").unwrap() < KubeVersion::new(1, 30, 0));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&KubeVersion::new(1, 29, 3)).unwrap();
        assert_eq!(json, "\"v1.29.3\"");
        let back: KubeVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, KubeVersion::new(1, 29, 3));
        assert!(serde_json::from_str::<KubeVersion>("\"nope\"").is_err());
    }

    #[test]
    fn test_specifier_latest() {
        assert_eq!(VersionSpecifier::parse("latest").unwrap(), VersionSpecifier::Latest);
        assert_eq!(VersionSpecifier::parse("LATEST").unwrap(), VersionSpecifier::Latest);
    }

    #[test]
    fn test_specifier_partial() {
        assert_eq!(
            VersionSpecifier::parse("v1.29").unwrap(),
            VersionSpecifier::Partial { major: 1, minor: 29 }
        );
        assert_eq!(
            VersionSpecifier::parse("1.9").unwrap(),
            VersionSpecifier::Partial { major: 1, minor: 9 }
        );
    }

    #[test]
    fn test_specifier_exact() {
        assert_eq!(
            VersionSpecifier::parse("1.29.3").unwrap(),
            VersionSpecifier::Exact(KubeVersion::new(1, 29, 3))
        );
        assert!(matches!(
            VersionSpecifier::parse("v1.30.0-rc.1").unwrap(),
            VersionSpecifier::Exact(v) if v.is_prerelease()
        ));
    }

    #[test]
    fn test_specifier_invalid() {
        for bad in ["", "v", "1", "1.x", "1.29.3.4", "01.2", "-1.2", "stable", "1..2"] {
            assert!(VersionSpecifier::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_specifier_admits() {
        let partial = VersionSpecifier::Partial { major: 1, minor: 2 };
        assert!(partial.admits(&KubeVersion::new(1, 2, 7)));
        assert!(!partial.admits(&KubeVersion::new(1, 20, 0)));
        assert!(VersionSpecifier::Latest.admits(&KubeVersion::new(0, 1, 0)));
    }
}
