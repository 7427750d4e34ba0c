use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use defattach_cli::commands;
use defattach_cli::config::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("defattach {}", cli.command.name());

    let mut stdout = std::io::stdout();
    commands::run(&cli, &mut stdout).await
}
