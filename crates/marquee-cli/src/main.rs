use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_core::AppConfig;

mod commands;
mod page;

#[derive(Parser)]
#[command(name = "marquee")]
#[command(author, version, about = "Headless page-readiness orchestration and inertial carousel")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.config/marquee/config.toml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scripted page load on a headless page
    Run(commands::run::RunArgs),
    /// Trace the carousel physics for one impulse
    Carousel(commands::carousel::CarouselArgs),
    /// Classify viewport widths and show which resizes reload
    Breakpoints(commands::breakpoints::BreakpointArgs),
    /// Print the effective configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let config_path = cli.config.unwrap_or_else(AppConfig::config_path);

    // Initialize logging; RUST_LOG wins over the config file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Run(args) => commands::run::run(&config, args).await,
        Commands::Carousel(args) => commands::carousel::run(&config, args),
        Commands::Breakpoints(args) => commands::breakpoints::run(&config, args),
        Commands::Config(args) => commands::config::run(&config, &config_path, args),
    }
}
