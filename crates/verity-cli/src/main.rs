//! Verity CLI - Command-line interface for the Verity confidence engine.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use verity_cli::commands;
use verity_cli::{Cli, Command, Config, Formatter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> verity_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // An explicit config file must load; the default one is optional
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring default config: {}", e);
            Config::default()
        }),
    };

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Interval(args) => commands::execute_interval(args, &config, &formatter)?,
        Command::Pdf(args) => commands::execute_pdf(args, &config, &formatter)?,
        Command::Simulate(args) => {
            commands::execute_simulate(args, &config, &formatter).await?;
        }
    }

    Ok(())
}

/// Log to stderr; `-v` flags win over `RUST_LOG`, which wins over `warn`.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
