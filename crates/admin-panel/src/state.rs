//! Application state for dependency injection.

use std::sync::Arc;

use common::AppResult;

use crate::clients::{AdminApi, HttpApiClient};
use crate::config::PanelConfig;
use crate::crud::CrudOrchestrator;
use crate::events::EventBus;
use crate::terminal::{StdinConfirmer, TerminalPresenter};

/// Application state shared across commands.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn AdminApi>,
    pub events: EventBus,
    pub config: PanelConfig,
}

impl AppState {
    /// Create new app state.
    pub fn new(api: Arc<dyn AdminApi>, events: EventBus, config: PanelConfig) -> Self {
        Self { api, events, config }
    }

    /// Build state backed by the HTTP client.
    pub fn connect(config: PanelConfig) -> AppResult<Self> {
        let api = Arc::new(HttpApiClient::new(&config.api)?);
        Ok(Self::new(api, EventBus::new(), config))
    }

    /// Orchestrator presenting on the terminal; `assume_yes` skips confirmation prompts.
    pub fn orchestrator(&self, assume_yes: bool) -> CrudOrchestrator {
        CrudOrchestrator::new(
            Arc::clone(&self.api),
            Arc::new(TerminalPresenter),
            Arc::new(StdinConfirmer::new(assume_yes)),
            self.events.clone(),
            self.config.reload_delay(),
        )
    }
}
