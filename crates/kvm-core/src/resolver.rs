//! Version resolution: specifier + snapshot -> one release.
//!
//! Resolution is pure. The same specifier over the same snapshot always
//! selects the same item, and the snapshot is only read. It works over
//! anything [`Versioned`], so the catalog (`ReleaseDescriptor`) and the
//! local cache (`CacheEntry`) resolve with identical rules.
//!
//! | Specifier | Selects |
//! |-----------|---------|
//! | `Exact`   | the item with that exact version, pre-releases included |
//! | `Partial` | the highest stable patch of `major.minor` |
//! | `Latest`  | the highest stable version overall |
//!
//! Ordering is semantic (`1.10` > `1.9`), never lexical.

use thiserror::Error;

use kvm_schema::{VersionSpecifier, Versioned};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No release matches '{0}'")]
    NoMatch(VersionSpecifier),
}

/// Select the single item `spec` names.
pub fn resolve<'a, T: Versioned>(
    spec: &VersionSpecifier,
    candidates: &'a [T],
) -> Result<&'a T, ResolveError> {
    let found = match spec {
        VersionSpecifier::Exact(version) => candidates.iter().find(|c| c.version() == version),
        VersionSpecifier::Partial { .. } | VersionSpecifier::Latest => candidates
            .iter()
            .filter(|c| c.is_stable() && spec.admits(c.version()))
            .max_by(|a, b| a.version().cmp(b.version())),
    };
    found.ok_or_else(|| ResolveError::NoMatch(spec.clone()))
}

/// Every item `spec` could select, newest first.
///
/// `Latest` lists all stable items; pre-releases only appear when named
/// exactly.
pub fn candidates<'a, T: Versioned>(spec: &VersionSpecifier, items: &'a [T]) -> Vec<&'a T> {
    let mut matched: Vec<&T> = items
        .iter()
        .filter(|c| match spec {
            VersionSpecifier::Exact(v) => c.version() == v,
            _ => c.is_stable() && spec.admits(c.version()),
        })
        .collect();
    matched.sort_by(|a, b| b.version().cmp(a.version()));
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvm_schema::{KubeVersion, ReleaseDescriptor};
    use std::collections::BTreeMap;

    fn release(v: &str) -> ReleaseDescriptor {
        ReleaseDescriptor {
            version: v.parse().unwrap(),
            published_at: None,
            prerelease: false,
            artifacts: BTreeMap::new(),
        }
    }

    fn catalog(versions: &[&str]) -> Vec<ReleaseDescriptor> {
        versions.iter().map(|v| release(v)).collect()
    }

    fn pick(spec: &str, catalog: &[ReleaseDescriptor]) -> Result<String, ResolveError> {
        let spec: VersionSpecifier = spec.parse().unwrap();
        resolve(&spec, catalog).map(|r| r.version.to_string())
    }

    #[test]
    fn test_exact_match() {
        let c = catalog(&["1.28.4", "1.29.3", "1.29.2"]);
        assert_eq!(pick("1.29.2", &c).unwrap(), "v1.29.2");
        assert_eq!(pick("v1.28.4", &c).unwrap(), "v1.28.4");
    }

    #[test]
    fn test_exact_no_match() {
        let c = catalog(&["1.28.4", "1.29.3"]);
        let err = pick("1.29.9", &c).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NoMatch(VersionSpecifier::Exact(KubeVersion::new(1, 29, 9)))
        );
    }

    #[test]
    fn test_partial_uses_numeric_order() {
        let c = catalog(&["1.9.0", "1.10.0", "1.29.9", "1.29.10", "1.29.2"]);
        assert_eq!(pick("1.29", &c).unwrap(), "v1.29.10");
        assert_eq!(pick("1.9", &c).unwrap(), "v1.9.0");
        assert_eq!(pick("1.10", &c).unwrap(), "v1.10.0");
        assert!(matches!(pick("1.30", &c), Err(ResolveError::NoMatch(_))));
    }

    #[test]
    fn test_latest_across_minors() {
        let c = catalog(&["1.30.2", "1.31.0", "1.29.9"]);
        assert_eq!(pick("latest", &c).unwrap(), "v1.31.0");
    }

    #[test]
    fn test_prereleases_excluded_unless_exact() {
        let mut c = catalog(&["1.30.2", "1.31.0-rc.1"]);
        let mut flagged = release("1.30.3");
        flagged.prerelease = true;
        c.push(flagged);

        assert_eq!(pick("latest", &c).unwrap(), "v1.30.2");
        assert_eq!(pick("1.30", &c).unwrap(), "v1.30.2");
        assert!(pick("1.31", &c).is_err());
        assert_eq!(pick("1.31.0-rc.1", &c).unwrap(), "v1.31.0-rc.1");
    }

    #[test]
    fn test_empty_catalog() {
        assert!(pick("latest", &[]).is_err());
    }

    #[test]
    fn test_resolution_is_order_independent() {
        let a = catalog(&["1.29.1", "1.29.3", "1.29.2"]);
        let b = catalog(&["1.29.3", "1.29.2", "1.29.1"]);
        assert_eq!(pick("1.29", &a).unwrap(), pick("1.29", &b).unwrap());
    }

    #[test]
    fn test_candidates_newest_first() {
        let c = catalog(&["1.29.1", "1.28.0", "1.29.3"]);
        let spec: VersionSpecifier = "1.29".parse().unwrap();
        let listed: Vec<String> = candidates(&spec, &c)
            .iter()
            .map(|r| r.version.to_string())
            .collect();
        assert_eq!(listed, vec!["v1.29.3", "v1.29.1"]);
    }
}
