//! Commands module - CLI command implementations.
//!
//! Each command group is implemented in its own module.

pub mod check;
pub mod requirements;
pub mod taxonomy;
pub mod users;

use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use common::{AppError, AppResult};

use crate::events::{DataChanged, Entity, Refresh};
use crate::modals::load_overview;
use crate::search::{ResultRow, SearchOutcome};
use crate::state::AppState;

/// Output options shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `value` as pretty JSON when requested, otherwise run `plain`.
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T, plain: impl FnOnce()) -> AppResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            plain();
        }
        Ok(())
    }
}

/// Print search results, or the prompt / no-results state.
pub fn print_outcome(outcome: &SearchOutcome<ResultRow>, output: Output) -> AppResult<()> {
    output.emit(outcome.items(), || match outcome {
        SearchOutcome::Prompt => println!("Type a search term"),
        SearchOutcome::NoResults => println!("No results found"),
        SearchOutcome::Results(rows) => {
            for row in rows {
                println!("{:>6}  {}", row.id, row.primary);
                println!("        {}", row.secondary.join(" · "));
            }
        }
    })
}

/// Drain refresh events published by a mutation and refresh what they name.
pub async fn follow_refresh(
    state: &AppState,
    events: &mut broadcast::Receiver<DataChanged>,
) -> AppResult<()> {
    loop {
        let event = match events.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return Ok(()),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!("Skipped {} refresh events", skipped);
                continue;
            }
        };
        debug!("Refreshing after {:?}", event);

        if let Refresh::FullReload { delay_ms } = event.refresh {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        let overview = load_overview(state.api.as_ref()).await?;
        match event.entity {
            Entity::Users => println!(
                "Users: {} total, {} administrators, {} active",
                overview.user_stats.total, overview.user_stats.administrators, overview.user_stats.active
            ),
            Entity::Taxonomy => println!(
                "Requirements: {} total ({} low, {} medium, {} high)",
                overview.requirement_stats.total,
                overview.requirement_stats.low,
                overview.requirement_stats.medium,
                overview.requirement_stats.high
            ),
        }
    }
}

/// Map a command failure to its exit code.
pub fn exit_code(err: &AppError) -> i32 {
    match err {
        AppError::Cancelled => 130,
        AppError::Validation(_) | AppError::Forbidden(_) => 2,
        _ => 1,
    }
}
