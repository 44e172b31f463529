//! Requirements command - search, counters and CRUD.

use std::sync::Arc;

use common::AppResult;
use domain::{Classification, Level, NewNode, RequirementStats};

use super::{follow_refresh, print_outcome, Output};
use crate::cli::args::{RequirementsAction, RequirementsArgs};
use crate::modals::{Load, RequirementEditModal, ViewEpoch};
use crate::search::{search, OnEmpty, Searchable};
use crate::state::AppState;

/// Execute the requirements command
pub async fn execute(args: RequirementsArgs, state: &AppState, output: Output) -> AppResult<()> {
    match args.action {
        RequirementsAction::Search { query } => search_requirements(state, &query, output).await,
        RequirementsAction::Stats => stats(state, output).await,
        RequirementsAction::Add {
            subgroup,
            name,
            classification,
            description,
        } => add(state, subgroup, &name, classification, description).await,
        RequirementsAction::Update {
            id,
            name,
            classification,
            description,
            subgroup,
        } => update(state, id, name, classification, description, subgroup).await,
        RequirementsAction::Delete { id, yes } => delete(state, id, yes).await,
    }
}

async fn search_requirements(state: &AppState, query: &str, output: Output) -> AppResult<()> {
    let requirements = state.api.list_requirements(None).await?;
    let outcome = search(query, &requirements, OnEmpty::ShowAll).map(|r| r.result_row());
    print_outcome(&outcome, output)
}

async fn stats(state: &AppState, output: Output) -> AppResult<()> {
    let requirements = state.api.list_requirements(None).await?;
    let stats = RequirementStats::from_requirements(&requirements);
    output.emit(&stats, || {
        println!("Total:      {}", stats.total);
        println!("Low:        {}", stats.low);
        println!("Medium:     {}", stats.medium);
        println!("High:       {}", stats.high);
        println!("Incomplete: {}", stats.incomplete);
    })
}

async fn add(
    state: &AppState,
    subgroup_id: i64,
    name: &str,
    classification: Classification,
    description: Option<String>,
) -> AppResult<()> {
    let node = NewNode::new(Level::Requirement, name, Some(subgroup_id))?
        .with_details(classification, description);

    let mut events = state.events.subscribe();
    let id = state.orchestrator(false).create_node(&node).await?;
    println!("requirement id: {}", id);
    follow_refresh(state, &mut events).await
}

async fn open_on(state: &AppState, id: i64) -> AppResult<Option<RequirementEditModal>> {
    let mut modal = RequirementEditModal::new(Arc::clone(&state.api), ViewEpoch::new());
    if modal.open().await? == Load::Stale || modal.select(id).await? == Load::Stale {
        return Ok(None);
    }
    if modal.selector().is_unavailable() {
        println!("{} for requirement {}", crate::search::HIERARCHY_UNAVAILABLE, id);
    }
    Ok(Some(modal))
}

async fn update(
    state: &AppState,
    id: i64,
    name: Option<String>,
    classification: Option<Classification>,
    description: Option<String>,
    subgroup_id: Option<i64>,
) -> AppResult<()> {
    let Some(mut modal) = open_on(state, id).await? else {
        return Ok(());
    };

    if let Some(name) = name {
        modal.set_name(name);
    }
    if let Some(classification) = classification {
        modal.set_classification(classification);
    }
    if let Some(description) = description {
        modal.set_description(description);
    }
    if subgroup_id.is_some() {
        modal.selector_mut().on_subgroup_change(subgroup_id).await?;
    }

    let mut events = state.events.subscribe();
    modal.submit(&state.orchestrator(false)).await?;
    follow_refresh(state, &mut events).await
}

async fn delete(state: &AppState, id: i64, yes: bool) -> AppResult<()> {
    let Some(mut modal) = open_on(state, id).await? else {
        return Ok(());
    };

    let mut events = state.events.subscribe();
    modal.delete(&state.orchestrator(yes)).await?;
    follow_refresh(state, &mut events).await
}
