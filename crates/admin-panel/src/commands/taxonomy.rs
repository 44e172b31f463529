//! Taxonomy command - browse the four levels and create or delete nodes.
//!
//! Listing a level drives the same cascading selector the edit screens use,
//! so the output is exactly what the matching control would offer.

use std::sync::Arc;

use common::AppResult;
use domain::{Classification, Level, NewNode};

use super::{follow_refresh, Output};
use crate::cli::args::{TaxonomyAction, TaxonomyArgs};
use crate::hierarchy::{HierarchySelector, SelectOption};
use crate::search::HIERARCHY_UNAVAILABLE;
use crate::state::AppState;

/// Execute the taxonomy command
pub async fn execute(args: TaxonomyArgs, state: &AppState, output: Output) -> AppResult<()> {
    match args.action {
        TaxonomyAction::Families => list_level(state, Level::Family, None, output).await,
        TaxonomyAction::Groups { family } => {
            list_level(state, Level::Group, Some(family), output).await
        }
        TaxonomyAction::Subgroups { group } => {
            list_level(state, Level::Subgroup, Some(group), output).await
        }
        TaxonomyAction::Requirements { subgroup } => {
            list_level(state, Level::Requirement, Some(subgroup), output).await
        }
        TaxonomyAction::Path { requirement_id } => path(state, requirement_id, output).await,
        TaxonomyAction::Add {
            level,
            name,
            parent,
            classification,
            description,
        } => add(state, level, &name, parent, classification, description).await,
        TaxonomyAction::Delete { level, id, yes } => delete(state, level, id, yes).await,
    }
}

fn print_options(level: Level, options: &[SelectOption]) {
    if options.is_empty() {
        println!("No {}", level.plural());
    }
    for option in options {
        println!("{:>6}  {}", option.id, option.label);
    }
}

/// Show the options of `level` under `parent_id`.
async fn list_level(
    state: &AppState,
    level: Level,
    parent_id: Option<i64>,
    output: Output,
) -> AppResult<()> {
    let mut selector = HierarchySelector::new(Arc::clone(&state.api));
    match level.parent() {
        None => selector.load_families().await?,
        Some(parent) => selector.select(parent, parent_id).await?,
    }

    let options = selector.control(level).options().to_vec();
    let rows: Vec<_> = options
        .iter()
        .map(|o| serde_json::json!({ "id": o.id, "label": o.label }))
        .collect();
    output.emit(&rows, || print_options(level, &options))
}

async fn path(state: &AppState, requirement_id: i64, output: Output) -> AppResult<()> {
    let path = state.api.hierarchy_path(requirement_id).await?;
    output.emit(&path, || {
        let names: Option<Vec<&str>> = [&path.family, &path.group, &path.subgroup]
            .into_iter()
            .map(|node| node.as_ref().map(|n| n.name.as_str()))
            .collect();
        match names {
            Some(names) => println!("{}", names.join(" > ")),
            None => println!("{}", HIERARCHY_UNAVAILABLE),
        }
    })
}

async fn add(
    state: &AppState,
    level: Level,
    name: &str,
    parent_id: Option<i64>,
    classification: Classification,
    description: Option<String>,
) -> AppResult<()> {
    let mut node = NewNode::new(level, name, parent_id)?;
    if level == Level::Requirement {
        node = node.with_details(classification, description);
    }

    let mut events = state.events.subscribe();
    let id = state.orchestrator(false).create_node(&node).await?;
    println!("{} id: {}", level, id);

    // Show what the next control would now offer
    if let Some(child) = level.child() {
        let mut selector = HierarchySelector::new(Arc::clone(&state.api));
        selector.select(level, Some(id)).await?;
        println!("{} under it:", child.plural());
        print_options(child, selector.control(child).options());
    }
    follow_refresh(state, &mut events).await
}

async fn delete(state: &AppState, level: Level, id: i64, yes: bool) -> AppResult<()> {
    let name = match level {
        Level::Requirement => state.api.get_requirement(id).await?.name,
        _ => format!("#{}", id),
    };

    let mut events = state.events.subscribe();
    state
        .orchestrator(yes)
        .delete_node(level, id, &name)
        .await?;
    follow_refresh(state, &mut events).await
}
