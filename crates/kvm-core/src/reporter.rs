//! Reporter trait for dependency injection
//!
//! Core operations report progress through this trait without being
//! coupled to a terminal implementation.

use kvm_schema::{KubeVersion, Platform};

pub trait Reporter: Send + Sync {
    /// Updates the progress of an artifact download.
    fn downloading(&self, version: &KubeVersion, current: u64, total: Option<u64>);

    /// The download finished and its digest is being compared.
    fn verifying(&self, version: &KubeVersion, platform: Platform);

    /// Marks an operation on `version` as successfully completed.
    fn done(&self, version: &KubeVersion, detail: &str, size: Option<u64>);

    /// Marks an operation on `version` as failed with a specific reason.
    fn failed(&self, version: &KubeVersion, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn downloading(&self, version: &KubeVersion, current: u64, total: Option<u64>) {
        (**self).downloading(version, current, total)
    }
    fn verifying(&self, version: &KubeVersion, platform: Platform) {
        (**self).verifying(version, platform)
    }
    fn done(&self, version: &KubeVersion, detail: &str, size: Option<u64>) {
        (**self).done(version, detail, size)
    }
    fn failed(&self, version: &KubeVersion, reason: &str) {
        (**self).failed(version, reason)
    }
    fn info(&self, msg: &str) {
        (**self).info(msg)
    }
    fn success(&self, msg: &str) {
        (**self).success(msg)
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg)
    }
}

/// A no-op reporter for silent operations (e.g., tests, scripted output).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn downloading(&self, _: &KubeVersion, _: u64, _: Option<u64>) {}
    fn verifying(&self, _: &KubeVersion, _: Platform) {}
    fn done(&self, _: &KubeVersion, _: &str, _: Option<u64>) {}
    fn failed(&self, _: &KubeVersion, _: &str) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
}
