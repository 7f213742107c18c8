//! kvm - kubectl version manager CLI

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kvm_cli::cmd;
use kvm_cli::ui::Output;
use kvm_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = Output::new(cli.quiet);
    match run(cli, &output).await {
        Ok(code) => code,
        Err(err) => {
            output.error(&format!("{err:#}"));
            ExitCode::from(kvm_cli::exit_code(&err))
        }
    }
}

/// `RUST_LOG` wins; otherwise `--verbose` or `KVM_DEBUG=1` selects debug.
fn init_tracing(verbose: bool) {
    let debug = verbose || std::env::var("KVM_DEBUG").is_ok_and(|v| v == "1");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, output: &Output) -> Result<ExitCode> {
    let platform = cli.platform.as_deref();

    match cli.command {
        Commands::Resolve { spec } => cmd::resolve::resolve(&spec, platform, output).await?,
        Commands::Install { spec, activate } => {
            cmd::install::install(&spec, activate, platform, output).await?;
        }
        Commands::Activate { spec } => cmd::activate::activate(&spec, platform, output)?,
        Commands::ListInstalled => cmd::list::list_installed(platform, output)?,
        Commands::ListRemote { spec, pre, limit } => {
            cmd::list::list_remote(spec.as_deref(), pre, limit, platform, output).await?;
        }
        Commands::Latest => cmd::latest::latest().await?,
        Commands::Current => cmd::current::current(output)?,
        Commands::Uninstall { spec } => cmd::uninstall::uninstall(&spec, platform, output)?,
        Commands::Clean => cmd::clean::clean(output)?,
        Commands::Exec { args } => return cmd::exec::exec(&args),
        Commands::Completions { shell } => cmd::completions::completions(shell),
    }
    Ok(ExitCode::SUCCESS)
}
