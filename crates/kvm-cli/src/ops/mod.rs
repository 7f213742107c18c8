//! Operation orchestration.
//!
//! Each operation strings the core components together for one command and
//! returns [`kvm_core::KvmError`], so the exit code category survives up to
//! `main`.

pub mod context;
pub mod install;
pub mod remove;
pub mod resolve;
pub mod switch;

pub use context::Context;
