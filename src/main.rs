//! Unreal Analyzer CLI entry point

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use unreal_analyzer::cli::{Cli, Commands};
use unreal_analyzer::core::error::Result;
use unreal_analyzer::{Analyzer, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries results; logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("UNREAL_ANALYZER_LOG"))
        .init();

    let cli = Cli::parse();
    let analyzer = Analyzer::new(Config::load()?);

    match cli.command {
        Commands::Serve => unreal_analyzer::cli::serve::run(&analyzer, &cli).await,
        _ => unreal_analyzer::cli::analyze::run(&analyzer, &cli).await,
    }
}
