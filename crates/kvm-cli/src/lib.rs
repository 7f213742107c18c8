//! kvm - kubectl version manager
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
//!
//! Install, cache and switch between kubectl releases.
//!
//! # Overview
//!
//! Every command is a thin entry point in [`cmd`] that parses its input,
//! builds an [`ops::Context`] and calls into [`ops`], which orchestrates
//! the `kvm-core` components. Terminal rendering lives in [`ui`].
//!
//! Put `~/.kvm/bin` on your `PATH`; `kvm activate` repoints
//! `~/.kvm/bin/kubectl` at the chosen cached release.

pub mod cmd;
pub mod ops;
pub mod ui;

pub use kvm_core::{ErrorKind, KvmError};

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "kvm")]
#[command(author, version, about = "kvm - kubectl version manager")]
pub struct Cli {
    /// Target platform as os/arch (defaults to the running host)
    #[arg(long, global = true, env = "KVM_PLATFORM")]
    pub platform: Option<String>,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve a version specifier against the upstream catalog
    Resolve {
        /// Version specifier: latest, 1.29 or 1.29.3
        spec: String,
    },
    /// Download and cache a kubectl release
    Install {
        /// Version specifier: latest, 1.29 or 1.29.3
        #[arg(env = "KVM_VERSION_TARGET", default_value = "latest")]
        spec: String,
        /// Activate the release once it is cached
        #[arg(short, long)]
        activate: bool,
    },
    /// Make an installed release the active kubectl
    #[command(visible_alias = "use")]
    Activate {
        /// Version specifier, resolved against installed releases
        spec: String,
    },
    /// List cached releases
    #[command(name = "list-installed", visible_alias = "ls")]
    ListInstalled,
    /// List releases available upstream
    #[command(name = "list-remote")]
    ListRemote {
        /// Only show releases matching this specifier (e.g. 1.29)
        spec: Option<String>,
        /// Include pre-releases
        #[arg(long)]
        pre: bool,
        /// Maximum number of releases to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// Print the upstream stable release
    Latest,
    /// Print the active release
    Current,
    /// Remove a cached release
    #[command(visible_alias = "rm")]
    Uninstall {
        /// Version specifier, resolved against installed releases
        spec: String,
    },
    /// Remove staging files left behind by interrupted runs
    Clean,
    /// Run the active kubectl
    Exec {
        /// Arguments forwarded to kubectl
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Process exit code for a failed command.
///
/// Errors raised by the core keep their category through `anyhow` context
/// layers; anything else exits with 1.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|e| e.downcast_ref::<KvmError>())
        .map_or(1, |e| e.kind().exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use kvm_core::resolver::ResolveError;
    use kvm_schema::VersionSpecifier;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exit_code_survives_context() {
        let err = anyhow::Error::from(KvmError::from(ResolveError::NoMatch(
            VersionSpecifier::Latest,
        )))
        .context("while resolving");
        assert_eq!(exit_code(&err), 3);

        assert_eq!(exit_code(&anyhow::anyhow!("unrelated")), 1);
    }

    #[test]
    fn test_exec_keeps_hyphenated_args() {
        let cli = Cli::parse_from(["kvm", "exec", "--", "get", "pods", "-A"]);
        let Commands::Exec { args } = cli.command else {
            panic!("expected exec");
        };
        assert_eq!(args, ["get", "pods", "-A"]);
    }

    #[test]
    fn test_use_alias() {
        let cli = Cli::parse_from(["kvm", "use", "1.29"]);
        assert!(matches!(cli.command, Commands::Activate { spec } if spec == "1.29"));
    }
}
