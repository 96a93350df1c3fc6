mod cmd;
mod config;
mod entities;
mod error;
mod executor;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::{Cli, Commands};

/// `--log` wins over `RUST_LOG`; entity output goes to stdout, so logs stay on stderr.
fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref());

    let result = match cli.command {
        Commands::Load(args) => cmd::load::run(args).await,
        Commands::Watch(args) => cmd::watch::run(args).await,
        Commands::Stream(args) => cmd::stream::run(args).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "replay failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
