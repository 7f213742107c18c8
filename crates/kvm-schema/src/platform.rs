//! Target platforms for downloaded artifacts.

/// Operating systems upstream publishes client binaries for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Linux.
    Linux,
    /// macOS (upstream calls it `darwin`).
    Darwin,
    /// Windows.
    Windows,
}

impl Os {
    /// Upstream path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
        }
    }
}

impl std::str::FromStr for Os {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "darwin" | "macos" => Ok(Self::Darwin),
            "windows" => Ok(Self::Windows),
            _ => Err(format!("Unknown operating system: {s}")),
        }
    }
}

/// CPU architectures, named the way upstream release paths name them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// `x86_64`.
    Amd64,
    /// ARM64 / `aarch64`.
    Arm64,
}

impl Arch {
    /// Upstream path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

impl std::str::FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "amd64" | "x86_64" => Ok(Self::Amd64),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            _ => Err(format!("Unknown architecture: {s}")),
        }
    }
}

/// An OS/architecture pair; the unit artifacts are published per.
///
/// # Example
///
/// ```
/// use kvm_schema::Platform;
///
/// let p: Platform = "linux/amd64".parse().unwrap();
/// assert_eq!(p.slug(), "linux-amd64");
/// assert_eq!(p.binary_name(), "kubectl");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// CPU architecture.
    pub arch: Arch,
}

impl Platform {
    /// Every platform the official catalog is expanded to.
    pub const SUPPORTED: [Platform; 5] = [
        Platform::new(Os::Linux, Arch::Amd64),
        Platform::new(Os::Linux, Arch::Arm64),
        Platform::new(Os::Darwin, Arch::Amd64),
        Platform::new(Os::Darwin, Arch::Arm64),
        Platform::new(Os::Windows, Arch::Amd64),
    ];

    /// Pair an OS with an architecture.
    pub const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Detect the platform this binary was built for.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SchemaError::UnsupportedPlatform`] on hosts
    /// upstream publishes no client binary for.
    pub fn current() -> Result<Self, crate::SchemaError> {
        Self::from_host(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Map Rust target names (`macos`, `aarch64`, ...) to a platform.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SchemaError::UnsupportedPlatform`] when either part
    /// is unknown or the pair is not in [`Platform::SUPPORTED`].
    pub fn from_host(os: &str, arch: &str) -> Result<Self, crate::SchemaError> {
        let unsupported = || crate::SchemaError::UnsupportedPlatform(format!("{os}/{arch}"));
        let platform = Self::new(
            os.parse().map_err(|_| unsupported())?,
            arch.parse().map_err(|_| unsupported())?,
        );
        if Self::SUPPORTED.contains(&platform) {
            Ok(platform)
        } else {
            Err(unsupported())
        }
    }

    /// Directory-safe name: `linux-amd64`.
    pub fn slug(&self) -> String {
        format!("{}-{}", self.os.as_str(), self.arch.as_str())
    }

    /// File name of the managed binary on this platform.
    pub fn binary_name(&self) -> &'static str {
        match self.os {
            Os::Windows => "kubectl.exe",
            Os::Linux | Os::Darwin => crate::MANAGED_COMMAND,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.os.as_str(), self.arch.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = crate::SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || crate::SchemaError::UnsupportedPlatform(s.to_string());
        let (os, arch) = s
            .trim()
            .split_once(['/', '-'])
            .ok_or_else(unsupported)?;
        Ok(Self::new(
            os.parse().map_err(|_| unsupported())?,
            arch.parse().map_err(|_| unsupported())?,
        ))
    }
}

impl TryFrom<String> for Platform {
    type Error = crate::SchemaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Platform> for String {
    fn from(p: Platform) -> Self {
        p.to_string()
    }
}
