//! Admin Panel Library
//!
//! Headless administration client for the citizen-security backend: user
//! management and the Family → Group → Subgroup → Requirement taxonomy.
//!
//! Views are driven through controllers ([`modals`], [`hierarchy`],
//! [`search`]); every mutation goes through [`crud::CrudOrchestrator`],
//! which publishes [`events::DataChanged`] so other views can refresh.

pub mod cli;
pub mod clients;
pub mod commands;
pub mod config;
pub mod crud;
pub mod events;
pub mod hierarchy;
pub mod modals;
pub mod search;
pub mod state;
pub mod terminal;

use tracing::debug;

use common::AppResult;

use crate::cli::{Cli, Commands};
use crate::commands::Output;
use crate::config::PanelConfig;
use crate::state::AppState;

/// Run one parsed command line against the configured backend.
pub async fn run(cli: Cli, mut config: PanelConfig) -> AppResult<()> {
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    let output = Output { json: cli.json };

    match cli.command {
        Commands::Check(args) => commands::check::execute(args, output).await,
        Commands::Users(args) => commands::users::execute(args, &connect(config)?, output).await,
        Commands::Taxonomy(args) => {
            commands::taxonomy::execute(args, &connect(config)?, output).await
        }
        Commands::Requirements(args) => {
            commands::requirements::execute(args, &connect(config)?, output).await
        }
    }
}

fn connect(config: PanelConfig) -> AppResult<AppState> {
    let state = AppState::connect(config)?;
    debug!("Using backend at {}", state.config.api.base_url());
    Ok(state)
}
