//! Shared types for kvm.
//!
//! Everything that crosses a component boundary lives here: version
//! identifiers and specifiers, platforms, digests, catalog descriptors and
//! the records persisted by the local state store.

pub mod hash;
pub mod platform;
pub mod record;
pub mod release;
pub mod version;

// Re-exports
pub use hash::*;
pub use platform::*;
pub use record::*;
pub use release::*;
pub use version::*;

/// Name of the managed command.
pub const MANAGED_COMMAND: &str = "kubectl";

/// Errors raised while parsing or validating schema values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A version string is not a valid `vX.Y.Z[-pre]` identifier.
    #[error("Invalid version '{0}': expected vX.Y.Z")]
    InvalidVersion(String),

    /// A user specifier is neither `latest`, `X.Y` nor `X.Y.Z`.
    #[error("Invalid version specifier '{0}': expected 'latest', 'X.Y' or 'X.Y.Z'")]
    InvalidSpecifier(String),

    /// An OS/architecture pair kvm has no artifacts for.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// A checksum that is not 64 hex characters.
    #[error("Invalid SHA256 digest: {0}")]
    InvalidDigest(String),
}
