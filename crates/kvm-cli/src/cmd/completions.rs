//! Completions command

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io::stdout;

use crate::Cli;

/// Write a completion script for `shell` to stdout.
pub fn completions(shell: Shell) {
    generate(shell, &mut Cli::command(), "kvm", &mut stdout());
}
