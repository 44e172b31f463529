//! CRUD orchestration.
//!
//! Every mutation goes through [`CrudOrchestrator`]: validate, show a loading
//! state, call the backend, present the outcome and publish a
//! [`DataChanged`] event so subscribed views refresh.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info};

use common::{AppError, AppResult};
use domain::{FormMode, Level, NewNode, RequirementUpdate, User, UserForm, UserSummary};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

use crate::clients::AdminApi;
use crate::events::{DataChanged, Entity, EventBus, Refresh};

pub const PROTECTED_USER_MESSAGE: &str = "The main administrator cannot be deleted";
pub const USER_DEPENDENCY_MESSAGE: &str =
    "This user cannot be deleted because they have associated complaints. Deactivate the account instead.";

// ============================================================================
// Presentation seams
// ============================================================================

/// Shows loading, success and error states to the operator.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait Presenter: Send + Sync {
    fn loading(&self, message: &str);

    fn success(&self, message: &str);

    /// One title plus every message to list
    fn error(&self, title: &str, messages: &[String]);
}

/// Asks the operator to confirm a destructive action.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Explanation shown when a taxonomy node still has children.
pub fn taxonomy_dependency_message(level: Level) -> String {
    format!(
        "This {} cannot be deleted because it has dependent records. Delete the associated records first.",
        level
    )
}

/// Confirmation prompt for deleting a taxonomy node, with its cascade warning.
pub fn node_delete_prompt(level: Level, name: &str) -> String {
    let cascade = match level {
        Level::Family => " Its groups, subgroups and requirements go with it.",
        Level::Group => " Its subgroups and requirements go with it.",
        Level::Subgroup => " Its requirements go with it.",
        Level::Requirement => "",
    };
    format!(
        "Delete {} '{}'? This action cannot be undone.{}",
        level, name, cascade
    )
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Wraps backend mutations with presentation and refresh events.
pub struct CrudOrchestrator {
    api: Arc<dyn AdminApi>,
    presenter: Arc<dyn Presenter>,
    confirmer: Arc<dyn Confirmer>,
    events: EventBus,
    reload_delay: Duration,
}

impl CrudOrchestrator {
    pub fn new(
        api: Arc<dyn AdminApi>,
        presenter: Arc<dyn Presenter>,
        confirmer: Arc<dyn Confirmer>,
        events: EventBus,
        reload_delay: Duration,
    ) -> Self {
        Self {
            api,
            presenter,
            confirmer,
            events,
            reload_delay,
        }
    }

    /// Run one action, presenting and logging its failure.
    async fn run<T, F>(&self, action: &str, loading: &str, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.presenter.loading(loading);
        call.await.inspect_err(|e| self.report(action, e))
    }

    fn report(&self, action: &str, err: &AppError) {
        match err {
            AppError::Cancelled => {
                debug!("{} cancelled", action);
                return;
            }
            e if e.is_failure() => error!("{} failed: {}", action, e),
            e => debug!("{} rejected: {}", action, e),
        }
        self.presenter.error(&format!("{} failed", action), &err.messages());
    }

    fn publish(&self, entity: Entity, refresh: Refresh) {
        self.events.publish(DataChanged { entity, refresh });
    }

    fn taxonomy_refresh(&self, level: Level) -> Refresh {
        // Requirement screens reload entirely after a mutation
        match level {
            Level::Requirement => Refresh::full_reload(self.reload_delay),
            _ => Refresh::Soft,
        }
    }

    async fn confirm(&self, prompt: &str) -> AppResult<()> {
        if self.confirmer.confirm(prompt).await {
            Ok(())
        } else {
            Err(AppError::Cancelled)
        }
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    /// Validate the form and create the user.
    pub async fn create_user(&self, form: &UserForm) -> AppResult<UserSummary> {
        let action = "Create user";
        let user = form
            .validate_for(FormMode::Create)
            .map_err(AppError::from)
            .inspect_err(|e| self.report(action, e))?;

        let created = self
            .run(action, "Creating user...", self.api.create_user(&user))
            .await?;

        info!("Created user {}", created.id);
        self.presenter.success("User created successfully");
        self.publish(Entity::Users, Refresh::Soft);
        Ok(created)
    }

    /// Validate the form and update the user. The password is only sent when typed.
    pub async fn update_user(&self, id: i64, form: &UserForm) -> AppResult<UserSummary> {
        let action = "Update user";
        let user = form
            .validate_for(FormMode::Update)
            .map_err(AppError::from)
            .inspect_err(|e| self.report(action, e))?;

        let updated = self
            .run(action, "Updating user...", self.api.update_user(id, &user))
            .await?;

        info!("Updated user {}", id);
        self.presenter.success("User updated successfully");
        self.publish(Entity::Users, Refresh::Soft);
        Ok(updated)
    }

    /// Delete a user after explicit confirmation.
    pub async fn delete_user(&self, user: &User) -> AppResult<()> {
        let action = "Delete user";
        if user.is_protected() {
            let err = AppError::forbidden(PROTECTED_USER_MESSAGE);
            self.report(action, &err);
            return Err(err);
        }

        let prompt = format!(
            "Delete user {} ({})? This action cannot be undone.",
            user.full_name(),
            user.email
        );
        self.confirm(&prompt)
            .await
            .inspect_err(|e| self.report(action, e))?;

        self.presenter.loading("Deleting user...");
        match self.api.delete_user(user.id).await {
            Ok(()) => {
                info!("Deleted user {}", user.id);
                self.presenter.success("User deleted successfully");
                self.publish(Entity::Users, Refresh::Soft);
                Ok(())
            }
            Err(AppError::Dependency { status, message }) => {
                error!("Delete user {} blocked by dependencies: {}", user.id, message);
                self.presenter
                    .error("Cannot delete user", &[USER_DEPENDENCY_MESSAGE.to_string()]);
                Err(AppError::Dependency { status, message })
            }
            Err(e) => {
                self.report(action, &e);
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Taxonomy
    // ------------------------------------------------------------------------

    /// Create a node at any level; requirements carry classification and description.
    pub async fn create_node(&self, node: &NewNode) -> AppResult<i64> {
        let action = format!("Create {}", node.level);
        let id = self
            .run(
                &action,
                &format!("Creating {}...", node.level),
                self.api.create_node(node),
            )
            .await?;

        info!("Created {} {} '{}'", node.level, id, node.name);
        self.presenter
            .success(&format!("{} created successfully", capitalize(node.level.label())));
        self.publish(Entity::Taxonomy, self.taxonomy_refresh(node.level));
        Ok(id)
    }

    pub async fn update_requirement(&self, id: i64, update: &RequirementUpdate) -> AppResult<()> {
        self.run(
            "Update requirement",
            "Updating requirement...",
            self.api.update_requirement(id, update),
        )
        .await?;

        info!("Updated requirement {}", id);
        self.presenter.success("Requirement updated successfully");
        self.publish(Entity::Taxonomy, self.taxonomy_refresh(Level::Requirement));
        Ok(())
    }

    /// Delete a node at any level after explicit confirmation.
    pub async fn delete_node(&self, level: Level, id: i64, name: &str) -> AppResult<()> {
        let action = format!("Delete {}", level);
        self.confirm(&node_delete_prompt(level, name))
            .await
            .inspect_err(|e| self.report(&action, e))?;

        self.presenter.loading(&format!("Deleting {}...", level));
        match self.api.delete_node(level, id).await {
            Ok(()) => {
                info!("Deleted {} {}", level, id);
                self.presenter
                    .success(&format!("{} deleted successfully", capitalize(level.label())));
                self.publish(Entity::Taxonomy, self.taxonomy_refresh(level));
                Ok(())
            }
            Err(AppError::Dependency { status, message }) => {
                error!("Delete {} {} blocked by dependencies: {}", level, id, message);
                self.presenter.error(
                    &format!("Cannot delete {}", level),
                    &[taxonomy_dependency_message(level)],
                );
                Err(AppError::Dependency { status, message })
            }
            Err(e) => {
                self.report(&action, &e);
                Err(e)
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockAdminApi;
    use domain::{Classification, Role};
    use mockall::predicate::eq;

    fn user(id: i64) -> User {
        User {
            id,
            first_name: "Ana".to_string(),
            paternal_last_name: "Rojas".to_string(),
            maternal_last_name: "Soto".to_string(),
            rut: "123456785".to_string(),
            phone: "987654321".to_string(),
            email: "ana@muni.cl".to_string(),
            role: Role::Operator,
            role_name: None,
            shift_id: Some(1),
            shift_name: None,
            active: true,
            address: None,
            created_at: None,
        }
    }

    fn valid_form() -> UserForm {
        UserForm {
            first_name: "Ana".to_string(),
            paternal_last_name: "Rojas".to_string(),
            maternal_last_name: "Soto".to_string(),
            rut: "12.345.678-5".to_string(),
            phone: "987654321".to_string(),
            email: "ana@muni.cl".to_string(),
            role: Some(Role::Inspector),
            shift_id: Some(4),
            active: true,
            address: None,
            password: "Segura#2024".to_string(),
            password_confirmation: "Segura#2024".to_string(),
        }
    }

    fn quiet_presenter() -> MockPresenter {
        let mut presenter = MockPresenter::new();
        presenter.expect_loading().return_const(());
        presenter.expect_success().return_const(());
        presenter
    }

    fn orchestrator(
        api: MockAdminApi,
        presenter: MockPresenter,
        confirmer: MockConfirmer,
    ) -> (CrudOrchestrator, EventBus) {
        let events = EventBus::new();
        let crud = CrudOrchestrator::new(
            Arc::new(api),
            Arc::new(presenter),
            Arc::new(confirmer),
            events.clone(),
            Duration::from_millis(2000),
        );
        (crud, events)
    }

    #[tokio::test]
    async fn test_create_user_publishes_soft_refresh() {
        let mut api = MockAdminApi::new();
        api.expect_create_user()
            .withf(|u| u.rut == "123456785" && u.phone == "987654321")
            .times(1)
            .returning(|_| {
                Ok(UserSummary {
                    id: 42,
                    full_name: Some("Ana Rojas Soto".to_string()),
                    rut: None,
                    email: None,
                    role_name: None,
                    active: Some(true),
                })
            });

        let (crud, events) = orchestrator(api, quiet_presenter(), MockConfirmer::new());
        let mut rx = events.subscribe();

        let created = crud.create_user(&valid_form()).await.unwrap();
        assert_eq!(created.id, 42);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.entity, Entity::Users);
        assert_eq!(event.refresh, Refresh::Soft);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_network() {
        let mut api = MockAdminApi::new();
        api.expect_create_user().never();

        let mut presenter = MockPresenter::new();
        presenter.expect_loading().never();
        presenter
            .expect_error()
            .withf(|_, messages| messages.iter().any(|m| m.contains("RUT")))
            .times(1)
            .return_const(());

        let (crud, _) = orchestrator(api, presenter, MockConfirmer::new());
        let mut form = valid_form();
        form.rut = "12.345.678-9".to_string();

        let err = crud.create_user(&form).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_user_requires_confirmation() {
        let mut api = MockAdminApi::new();
        api.expect_delete_user().never();

        let mut confirmer = MockConfirmer::new();
        confirmer.expect_confirm().times(1).return_const(false);

        let mut presenter = MockPresenter::new();
        presenter.expect_error().never();

        let (crud, _) = orchestrator(api, presenter, confirmer);
        let err = crud.delete_user(&user(7)).await.unwrap_err();
        assert!(matches!(err, AppError::Cancelled));
    }

    #[tokio::test]
    async fn test_protected_user_is_refused_before_confirmation() {
        let mut api = MockAdminApi::new();
        api.expect_delete_user().never();
        let mut confirmer = MockConfirmer::new();
        confirmer.expect_confirm().never();

        let mut presenter = MockPresenter::new();
        presenter
            .expect_error()
            .withf(|_, messages| messages.to_vec() == vec![PROTECTED_USER_MESSAGE.to_string()])
            .times(1)
            .return_const(());

        let (crud, _) = orchestrator(api, presenter, confirmer);
        let err = crud.delete_user(&user(1)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_user_with_complaints_shows_dependency_message() {
        let mut api = MockAdminApi::new();
        api.expect_delete_user().with(eq(7)).times(1).returning(|_| {
            Err(AppError::from_response(
                400,
                r#"{"error": "No se puede eliminar el usuario porque tiene denuncias asociadas"}"#,
            ))
        });

        let mut confirmer = MockConfirmer::new();
        confirmer.expect_confirm().return_const(true);

        let mut presenter = quiet_presenter();
        presenter
            .expect_error()
            .withf(|_, messages| messages.to_vec() == vec![USER_DEPENDENCY_MESSAGE.to_string()])
            .times(1)
            .return_const(());

        let (crud, events) = orchestrator(api, presenter, confirmer);
        let mut rx = events.subscribe();

        let err = crud.delete_user(&user(7)).await.unwrap_err();
        assert!(matches!(err, AppError::Dependency { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delete_user_generic_failure_keeps_backend_message() {
        let mut api = MockAdminApi::new();
        api.expect_delete_user()
            .returning(|_| Err(AppError::from_response(500, "")));
        let mut confirmer = MockConfirmer::new();
        confirmer.expect_confirm().return_const(true);

        let mut presenter = quiet_presenter();
        presenter
            .expect_error()
            .withf(|_, messages| messages.to_vec() == vec!["Error 500".to_string()])
            .times(1)
            .return_const(());

        let (crud, _) = orchestrator(api, presenter, confirmer);
        assert!(crud.delete_user(&user(7)).await.is_err());
    }

    #[tokio::test]
    async fn test_requirement_mutations_request_full_reload() {
        let mut api = MockAdminApi::new();
        api.expect_update_requirement().returning(|_, _| Ok(()));

        let (crud, events) = orchestrator(api, quiet_presenter(), MockConfirmer::new());
        let mut rx = events.subscribe();

        let update =
            RequirementUpdate::new("Ruidos molestos", Classification::High, "", Some(100)).unwrap();
        crud.update_requirement(5, &update).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.entity, Entity::Taxonomy);
        assert_eq!(event.refresh, Refresh::FullReload { delay_ms: 2000 });
    }

    #[tokio::test]
    async fn test_delete_family_with_children_explains_dependency() {
        let mut api = MockAdminApi::new();
        api.expect_delete_node()
            .with(eq(Level::Family), eq(3))
            .returning(|_, _| {
                Err(AppError::from_response(
                    400,
                    r#"{"error": "No se puede eliminar la familia porque tiene grupos asociados"}"#,
                ))
            });
        let mut confirmer = MockConfirmer::new();
        confirmer
            .expect_confirm()
            .withf(|prompt| prompt.contains("groups, subgroups and requirements"))
            .return_const(true);

        let mut presenter = quiet_presenter();
        presenter
            .expect_error()
            .withf(|_, messages| messages.to_vec() == vec![taxonomy_dependency_message(Level::Family)])
            .times(1)
            .return_const(());

        let (crud, _) = orchestrator(api, presenter, confirmer);
        let err = crud.delete_node(Level::Family, 3, "Seguridad").await.unwrap_err();
        assert!(matches!(err, AppError::Dependency { .. }));
    }

    #[tokio::test]
    async fn test_delete_subgroup_refreshes_softly() {
        let mut api = MockAdminApi::new();
        api.expect_delete_node().returning(|_, _| Ok(()));
        let mut confirmer = MockConfirmer::new();
        confirmer.expect_confirm().return_const(true);

        let (crud, events) = orchestrator(api, quiet_presenter(), confirmer);
        let mut rx = events.subscribe();

        crud.delete_node(Level::Subgroup, 9, "Vecinal").await.unwrap();
        assert_eq!(rx.recv().await.unwrap().refresh, Refresh::Soft);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("family"), "Family");
        assert_eq!(capitalize(""), "");
    }
}
