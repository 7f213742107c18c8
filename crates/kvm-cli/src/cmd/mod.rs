//! Command entry points.
//!
//! Each command parses its input, builds the context it needs and hands
//! off to [`crate::ops`]. Read-only commands that never touch the network
//! or depend on the host platform open the state store directly.

use std::sync::Arc;

use anyhow::Result;

use crate::ops::Context;
use crate::ui::Output;

pub mod activate;
pub mod clean;
pub mod completions;
pub mod current;
pub mod exec;
pub mod install;
pub mod latest;
pub mod list;
pub mod resolve;
pub mod uninstall;

fn context(platform: Option<&str>, output: &Output) -> Result<Context> {
    Context::from_env(platform, Arc::new(output.clone()))
}
