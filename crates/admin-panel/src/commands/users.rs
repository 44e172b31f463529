//! Users command - user listing, search and CRUD.
//!
//! ## Usage
//!
//! ```bash
//! admin-panel users list
//! admin-panel users search "rojas"
//! admin-panel users add --first-name Ana ... --role inspector --shift 4
//! admin-panel users delete 12
//! ```

use std::sync::Arc;

use tracing::info;

use common::AppResult;
use domain::{rut, User, UserForm};

use super::{follow_refresh, print_outcome, Output};
use crate::cli::args::{NewUserArgs, UpdateUserArgs, UsersAction, UsersArgs};
use crate::modals::{load_overview, Load, UserDeleteModal, UserEditModal, ViewEpoch};
use crate::search::{search_users_remote, OnEmpty, SearchIndex, Searchable};
use crate::state::AppState;

/// Execute the users command
pub async fn execute(args: UsersArgs, state: &AppState, output: Output) -> AppResult<()> {
    match args.action {
        UsersAction::List => list(state, output).await,
        UsersAction::Stats => stats(state, output).await,
        UsersAction::Show { id } => show(state, id, output).await,
        UsersAction::Search { query } => search(state, &query, output).await,
        UsersAction::Find { query } => find(state, query, output).await,
        UsersAction::Add(args) => add(state, args).await,
        UsersAction::Update(args) => update(state, args).await,
        UsersAction::Delete { id, yes } => delete(state, id, yes).await,
    }
}

fn print_user_line(user: &User) {
    println!(
        "{:>6}  {:<32} {:<28} {:<14} {:<13} {}",
        user.id,
        user.full_name(),
        user.email,
        rut::format(&user.rut),
        user.role_name.clone().unwrap_or_else(|| user.role.to_string()),
        if user.active { "active" } else { "inactive" }
    );
}

async fn list(state: &AppState, output: Output) -> AppResult<()> {
    let users: Vec<User> = state
        .api
        .list_users()
        .await?
        .into_iter()
        .filter(User::is_manageable)
        .collect();

    output.emit(&users, || {
        for user in &users {
            print_user_line(user);
        }
        println!("{} users", users.len());
    })
}

async fn stats(state: &AppState, output: Output) -> AppResult<()> {
    let overview = load_overview(state.api.as_ref()).await?;
    let summary = serde_json::json!({
        "users": overview.user_stats,
        "requirements": overview.requirement_stats,
    });
    output.emit(&summary, || {
        let u = overview.user_stats;
        let r = overview.requirement_stats;
        println!("Users:        {} total, {} administrators, {} active", u.total, u.administrators, u.active);
        println!(
            "Requirements: {} total, {} low, {} medium, {} high, {} with incomplete hierarchy",
            r.total, r.low, r.medium, r.high, r.incomplete
        );
    })
}

async fn show(state: &AppState, id: i64, output: Output) -> AppResult<()> {
    let user = state.api.get_user(id).await?;
    output.emit(&user, || {
        println!("Id:       {}", user.id);
        println!("Name:     {}", user.full_name());
        println!("RUT:      {}", rut::format(&user.rut));
        println!("Phone:    {}", user.display_phone());
        println!("Email:    {}", user.email);
        println!("Role:     {}", user.role_name.clone().unwrap_or_else(|| user.role.to_string()));
        if let Some(shift) = user.shift_name.clone().or(user.shift_id.map(|s| s.to_string())) {
            println!("Shift:    {}", shift);
        }
        println!("Active:   {}", if user.active { "yes" } else { "no" });
        if let Some(address) = &user.address {
            println!("Address:  {}", address);
        }
        if let Some(created_at) = user.created_at {
            println!("Created:  {}", created_at.format("%d/%m/%Y %H:%M"));
        }
        if user.is_protected() {
            println!("(protected account, cannot be deleted)");
        }
    })
}

async fn search(state: &AppState, query: &str, output: Output) -> AppResult<()> {
    let outcome = search_users_remote(state.api.as_ref(), query).await?;
    print_outcome(&outcome.map(|u| u.result_row()), output)
}

/// Filter locally through the debounced index, as the list screen does.
async fn find(state: &AppState, query: String, output: Output) -> AppResult<()> {
    let users: Vec<User> = state
        .api
        .list_users()
        .await?
        .into_iter()
        .filter(User::is_manageable)
        .collect();

    let (mut index, mut results) = SearchIndex::new(users, OnEmpty::ShowAll, state.config.search_debounce());
    index.on_input(query);
    match results.recv().await {
        Some(outcome) => print_outcome(&outcome, output),
        None => Ok(()),
    }
}

async fn add(state: &AppState, args: NewUserArgs) -> AppResult<()> {
    let confirmation = args.confirm_password.unwrap_or_else(|| args.password.clone());
    let form = UserForm {
        first_name: args.first_name,
        paternal_last_name: args.paternal_last_name,
        maternal_last_name: args.maternal_last_name,
        rut: args.rut,
        phone: args.phone,
        email: args.email,
        role: Some(args.role),
        shift_id: args.shift,
        active: !args.inactive,
        address: args.address,
        password: args.password,
        password_confirmation: confirmation,
    };

    let mut events = state.events.subscribe();
    let created = state.orchestrator(false).create_user(&form).await?;
    info!("User {} created", created.id);
    follow_refresh(state, &mut events).await
}

async fn update(state: &AppState, args: UpdateUserArgs) -> AppResult<()> {
    let mut modal = UserEditModal::new(Arc::clone(&state.api), ViewEpoch::new());
    if modal.select(args.id).await? == Load::Stale {
        return Ok(());
    }

    if let Some(role) = args.role {
        let selection = modal.set_role(Some(role));
        if args.shift.is_none() && selection.selected.is_none() {
            println!(
                "Shift cleared; {} allows shifts {:?}",
                role, selection.allowed
            );
        }
    }

    let form = modal.form_mut();
    if let Some(v) = args.first_name {
        form.first_name = v;
    }
    if let Some(v) = args.paternal_last_name {
        form.paternal_last_name = v;
    }
    if let Some(v) = args.maternal_last_name {
        form.maternal_last_name = v;
    }
    if let Some(v) = args.rut {
        form.rut = v;
    }
    if let Some(v) = args.phone {
        form.phone = v;
    }
    if let Some(v) = args.email {
        form.email = v;
    }
    if args.shift.is_some() {
        form.shift_id = args.shift;
    }
    if args.address.is_some() {
        form.address = args.address;
    }
    if args.active {
        form.active = true;
    } else if args.inactive {
        form.active = false;
    }
    if let Some(password) = args.password {
        form.password_confirmation = args.confirm_password.unwrap_or_else(|| password.clone());
        form.password = password;
    }

    let mut events = state.events.subscribe();
    modal.submit(&state.orchestrator(false)).await?;
    follow_refresh(state, &mut events).await
}

async fn delete(state: &AppState, id: i64, yes: bool) -> AppResult<()> {
    let mut modal = UserDeleteModal::new(Arc::clone(&state.api), ViewEpoch::new());
    if modal.open().await? == Load::Stale {
        return Ok(());
    }
    modal.select(id)?;

    let mut events = state.events.subscribe();
    modal.confirm(&state.orchestrator(yes)).await?;
    follow_refresh(state, &mut events).await
}
