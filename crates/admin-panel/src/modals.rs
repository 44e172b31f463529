//! Per-view controllers for the user and requirement screens.
//!
//! Each controller owns its own copy of the data it shows and discards it on
//! close. Loads that resolve after the view was closed or reopened are
//! dropped by comparing a [`ViewEpoch`] token.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use common::{AppError, AppResult};
use domain::{
    filter_shifts, Classification, Level, Requirement, RequirementStats, RequirementUpdate, Role,
    ShiftSelection, User, UserForm, UserStats, UserSummary,
};

use crate::clients::AdminApi;
use crate::crud::CrudOrchestrator;
use crate::hierarchy::HierarchySelector;
use crate::search::{search, OnEmpty, SearchOutcome};

// ============================================================================
// Epoch tokens
// ============================================================================

/// Generation counter of a view. Closing or reopening invalidates every token.
#[derive(Debug, Clone, Default)]
pub struct ViewEpoch(Arc<AtomicU64>);

/// Snapshot of a [`ViewEpoch`] taken when a load starts.
#[derive(Debug, Clone)]
pub struct EpochToken {
    epoch: Arc<AtomicU64>,
    value: u64,
}

impl ViewEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for the current generation
    pub fn token(&self) -> EpochToken {
        EpochToken {
            epoch: Arc::clone(&self.0),
            value: self.0.load(Ordering::SeqCst),
        }
    }

    /// Start a new generation and return its token
    pub fn begin(&self) -> EpochToken {
        self.invalidate();
        self.token()
    }

    pub fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl EpochToken {
    pub fn is_current(&self) -> bool {
        self.epoch.load(Ordering::SeqCst) == self.value
    }
}

/// Whether a load was applied to the view or dropped as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Load {
    Applied,
    Stale,
}

fn stale(view: &str) -> Load {
    warn!("Dropping stale response for the {} view", view);
    Load::Stale
}

// ============================================================================
// Overview
// ============================================================================

/// Users and counters shown on page load.
#[derive(Debug, Clone)]
pub struct Overview {
    pub users: Vec<User>,
    pub user_stats: UserStats,
    pub requirement_stats: RequirementStats,
}

/// Load users and requirement counters concurrently.
pub async fn load_overview(api: &dyn AdminApi) -> AppResult<Overview> {
    let (users, requirements) =
        futures::try_join!(api.list_users(), api.list_requirements(None))?;
    debug!(
        "Overview loaded: {} users, {} requirements",
        users.len(),
        requirements.len()
    );
    Ok(Overview {
        user_stats: UserStats::from_users(&users),
        requirement_stats: RequirementStats::from_requirements(&requirements),
        users,
    })
}

/// Users shown on the update and delete screens.
fn manageable(users: Vec<User>) -> Vec<User> {
    users.into_iter().filter(User::is_manageable).collect()
}

// ============================================================================
// User delete
// ============================================================================

pub struct UserDeleteModal {
    api: Arc<dyn AdminApi>,
    epoch: ViewEpoch,
    users: Vec<User>,
    selected: Option<User>,
}

impl UserDeleteModal {
    pub fn new(api: Arc<dyn AdminApi>, epoch: ViewEpoch) -> Self {
        Self {
            api,
            epoch,
            users: Vec::new(),
            selected: None,
        }
    }

    pub async fn open(&mut self) -> AppResult<Load> {
        let token = self.epoch.begin();
        self.selected = None;
        let users = self.api.list_users().await?;
        if !token.is_current() {
            return Ok(stale("user delete"));
        }
        self.users = manageable(users);
        Ok(Load::Applied)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn search(&self, query: &str) -> SearchOutcome<&User> {
        search(query, &self.users, OnEmpty::ShowAll)
    }

    pub fn select(&mut self, id: i64) -> AppResult<&User> {
        let user = self
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::validation(format!("User {} is not in the list", id)))?;
        Ok(&*self.selected.insert(user))
    }

    pub fn selected(&self) -> Option<&User> {
        self.selected.as_ref()
    }

    /// A user is selected and it is not the protected administrator
    pub fn can_confirm(&self) -> bool {
        self.selected.as_ref().is_some_and(|u| !u.is_protected())
    }

    /// Delete the selected user; the orchestrator asks for confirmation.
    pub async fn confirm(&mut self, crud: &CrudOrchestrator) -> AppResult<()> {
        let user = self
            .selected
            .clone()
            .ok_or_else(|| AppError::validation("Select a user to delete"))?;
        crud.delete_user(&user).await?;
        self.users.retain(|u| u.id != user.id);
        self.selected = None;
        Ok(())
    }

    pub fn close(&mut self) {
        self.epoch.invalidate();
        self.users.clear();
        self.selected = None;
    }
}

// ============================================================================
// User edit
// ============================================================================

pub struct UserEditModal {
    api: Arc<dyn AdminApi>,
    epoch: ViewEpoch,
    users: Vec<User>,
    selected_id: Option<i64>,
    form: UserForm,
}

impl UserEditModal {
    pub fn new(api: Arc<dyn AdminApi>, epoch: ViewEpoch) -> Self {
        Self {
            api,
            epoch,
            users: Vec::new(),
            selected_id: None,
            form: UserForm::default(),
        }
    }

    pub async fn open(&mut self) -> AppResult<Load> {
        let token = self.epoch.begin();
        self.selected_id = None;
        self.form = UserForm::default();
        let users = self.api.list_users().await?;
        if !token.is_current() {
            return Ok(stale("user edit"));
        }
        self.users = manageable(users);
        Ok(Load::Applied)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn search(&self, query: &str) -> SearchOutcome<&User> {
        search(query, &self.users, OnEmpty::ShowAll)
    }

    /// Fetch the user's current values and prefill the form.
    pub async fn select(&mut self, id: i64) -> AppResult<Load> {
        let token = self.epoch.token();
        let user = self.api.get_user(id).await?;
        if !token.is_current() {
            return Ok(stale("user edit"));
        }
        if !user.is_manageable() {
            return Err(AppError::forbidden(format!(
                "{} users are not managed from this panel",
                user.role
            )));
        }
        self.form = UserForm::from_user(&user);
        self.selected_id = Some(user.id);
        Ok(Load::Applied)
    }

    pub fn selected_id(&self) -> Option<i64> {
        self.selected_id
    }

    pub fn form(&self) -> &UserForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut UserForm {
        &mut self.form
    }

    /// Change the role and restrict the shift to the ones it allows.
    pub fn set_role(&mut self, role: Option<Role>) -> ShiftSelection {
        let selection = filter_shifts(role, self.form.shift_id);
        self.form.role = role;
        self.form.shift_id = selection.selected;
        selection
    }

    pub fn can_confirm(&self) -> bool {
        self.selected_id.is_some() && !self.form.first_name.trim().is_empty()
    }

    pub async fn submit(&mut self, crud: &CrudOrchestrator) -> AppResult<UserSummary> {
        let id = self
            .selected_id
            .ok_or_else(|| AppError::validation("Select a user to update"))?;
        let updated = crud.update_user(id, &self.form).await?;
        self.form.password.clear();
        self.form.password_confirmation.clear();
        Ok(updated)
    }

    pub fn close(&mut self) {
        self.epoch.invalidate();
        self.users.clear();
        self.selected_id = None;
        self.form = UserForm::default();
    }
}

// ============================================================================
// Requirement edit
// ============================================================================

pub struct RequirementEditModal {
    api: Arc<dyn AdminApi>,
    epoch: ViewEpoch,
    requirements: Vec<Requirement>,
    selector: HierarchySelector,
    selected: Option<Requirement>,
    name: String,
    classification: Classification,
    description: String,
}

impl RequirementEditModal {
    pub fn new(api: Arc<dyn AdminApi>, epoch: ViewEpoch) -> Self {
        Self {
            selector: HierarchySelector::new(Arc::clone(&api)),
            api,
            epoch,
            requirements: Vec::new(),
            selected: None,
            name: String::new(),
            classification: Classification::Medium,
            description: String::new(),
        }
    }

    /// Load the requirement list and the families concurrently.
    pub async fn open(&mut self) -> AppResult<Load> {
        let token = self.epoch.begin();
        self.clear_selection();
        self.selector.reset();

        let (requirements, families) =
            tokio::join!(self.api.list_requirements(None), self.api.list_families());
        if !token.is_current() {
            return Ok(stale("requirement edit"));
        }
        // The family control shows its own failure before either error surfaces
        let families = self.selector.set_families(families);
        let requirements = requirements?;
        families?;
        self.requirements = requirements;
        Ok(Load::Applied)
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn search(&self, query: &str) -> SearchOutcome<&Requirement> {
        search(query, &self.requirements, OnEmpty::Prompt)
    }

    /// Fetch the requirement, then drive the selector to its current ancestors.
    pub async fn select(&mut self, id: i64) -> AppResult<Load> {
        let token = self.epoch.token();
        let requirement = self.api.get_requirement(id).await?;
        if !token.is_current() {
            return Ok(stale("requirement edit"));
        }
        self.selector.load_current_hierarchy(id).await?;
        if !token.is_current() {
            return Ok(stale("requirement edit"));
        }

        self.name = requirement.name.clone();
        self.classification = requirement.classification;
        self.description = requirement.description.clone().unwrap_or_default();
        self.selected = Some(requirement);
        Ok(Load::Applied)
    }

    pub fn selected(&self) -> Option<&Requirement> {
        self.selected.as_ref()
    }

    pub fn selector(&self) -> &HierarchySelector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut HierarchySelector {
        &mut self.selector
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn set_classification(&mut self, classification: Classification) {
        self.classification = classification;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// A requirement is selected and its name is not blank
    pub fn can_confirm(&self) -> bool {
        self.selected.is_some() && !self.name.trim().is_empty()
    }

    /// Save the edited fields. A subgroup chosen in the selector moves the requirement.
    pub async fn submit(&mut self, crud: &CrudOrchestrator) -> AppResult<()> {
        let id = self
            .selected
            .as_ref()
            .map(|r| r.id)
            .ok_or_else(|| AppError::validation("Select a requirement to update"))?;
        let update = RequirementUpdate::new(
            &self.name,
            self.classification,
            &self.description,
            self.selector.selected(Level::Subgroup),
        )?;
        crud.update_requirement(id, &update).await
    }

    pub async fn delete(&mut self, crud: &CrudOrchestrator) -> AppResult<()> {
        let requirement = self
            .selected
            .clone()
            .ok_or_else(|| AppError::validation("Select a requirement to delete"))?;
        crud.delete_node(Level::Requirement, requirement.id, &requirement.name)
            .await?;
        self.requirements.retain(|r| r.id != requirement.id);
        self.clear_selection();
        Ok(())
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.name.clear();
        self.classification = Classification::Medium;
        self.description.clear();
    }

    pub fn close(&mut self) {
        self.epoch.invalidate();
        self.requirements.clear();
        self.selector.reset();
        self.clear_selection();
    }
}
