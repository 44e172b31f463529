//! Admin panel - Application entry point
//!
//! CLI-based entry point that dispatches to the command modules.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use admin_panel_lib::{cli::Cli, commands::exit_code, config::PanelConfig};
use common::AppError;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (verbose mode sets debug level)
    init_tracing(cli.verbose);

    // Load configuration
    let config = PanelConfig::from_env();
    tracing::debug!("Configuration loaded");

    // Execute command
    if let Err(e) = admin_panel_lib::run(cli, config).await {
        if matches!(e, AppError::Cancelled) {
            println!("Cancelled");
        } else {
            tracing::error!("Command failed: {}", e);
        }
        std::process::exit(exit_code(&e));
    }
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
