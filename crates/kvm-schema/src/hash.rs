//! SHA256 digests for artifact verification.

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

/// A validated SHA256 digest (64 lowercase hex characters).
///
/// Every checksum in kvm, whether declared by a catalog or computed from
/// bytes on disk, passes through this type, so comparing two digests is a
/// plain string equality on normalised hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Create a new `Sha256Digest`, validating the input.
    ///
    /// Accepts strings with or without a `sha256:` prefix, in any case.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SchemaError::InvalidDigest`] if the hex portion is
    /// not exactly 64 ASCII hex characters.
    pub fn new(s: impl Into<String>) -> Result<Self, crate::SchemaError> {
        let s = s.into();
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix("sha256:").unwrap_or(trimmed);

        if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(crate::SchemaError::InvalidDigest(s));
        }

        Ok(Self(hex.to_lowercase()))
    }

    /// Parse the body of a published `.sha256` file.
    ///
    /// Upstream files hold just the digest, but the `sha256sum` layout
    /// (`<digest>  <file>`) is accepted too.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SchemaError::InvalidDigest`] if the first token is
    /// not a digest.
    pub fn from_checksum_file(body: &str) -> Result<Self, crate::SchemaError> {
        let token = body.split_whitespace().next().unwrap_or_default();
        Self::new(token)
    }

    /// Digest of an in-memory buffer.
    pub fn of(data: &[u8]) -> Self {
        Self::from_hasher(Sha256::new_with_prefix(data))
    }

    /// Finish a streaming hasher.
    pub fn from_hasher(hasher: Sha256) -> Self {
        Self(hex::encode(hasher.finalize()))
    }

    /// Digest of a file, read in fixed-size blocks.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened or read.
    pub fn of_file(path: &std::path::Path) -> std::io::Result<Self> {
        use std::io::Read;

        let mut file = std::fs::File::open(path)?;
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; 8192];
        loop {
            let count = file.read(&mut buffer)?;
            if count == 0 {
                break;
            }
            hasher.update(&buffer[..count]);
        }
        Ok(Self::from_hasher(hasher))
    }

    /// Get the digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn digest_of_known_input() {
        assert_eq!(Sha256Digest::of(b"hello world").as_str(), HELLO);
    }

    #[test]
    fn digest_normalises_case_and_prefix() {
        let upper = format!("sha256:{}", HELLO.to_uppercase());
        assert_eq!(Sha256Digest::new(upper).unwrap().as_str(), HELLO);
    }

    #[test]
    fn digest_rejects_bad_input() {
        assert!(Sha256Digest::new("abc").is_err());
        assert!(Sha256Digest::new("z".repeat(64)).is_err());
        assert!(Sha256Digest::from_checksum_file("").is_err());
    }

    #[test]
    fn checksum_file_layouts() {
        assert_eq!(
            Sha256Digest::from_checksum_file(&format!("{HELLO}\n")).unwrap().as_str(),
            HELLO
        );
        assert_eq!(
            Sha256Digest::from_checksum_file(&format!("{HELLO}  kubectl\n")).unwrap().as_str(),
            HELLO
        );
    }

    #[test]
    fn digest_of_file_matches_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        let data = vec![7u8; 20_000];
        std::fs::write(&path, &data).unwrap();
        assert_eq!(Sha256Digest::of_file(&path).unwrap(), Sha256Digest::of(&data));
    }
}
