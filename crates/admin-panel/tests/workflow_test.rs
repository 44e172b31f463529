//! End-to-end administration workflows against an in-memory backend.
//!
//! The backend here is a hand-written `AdminApi` keeping real state, so a
//! create followed by a reload observes the created row.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use admin_panel_lib::clients::AdminApi;
use admin_panel_lib::crud::{
    Confirmer, CrudOrchestrator, Presenter, PROTECTED_USER_MESSAGE, USER_DEPENDENCY_MESSAGE,
};
use admin_panel_lib::events::{DataChanged, Entity, EventBus, Refresh};
use admin_panel_lib::hierarchy::HierarchySelector;
use admin_panel_lib::modals::{load_overview, Load, RequirementEditModal, UserDeleteModal, UserEditModal, ViewEpoch};
use common::{AppError, AppResult};
use domain::{
    Classification, Family, Group, HierarchyPath, Level, NewNode, PathNode, Requirement,
    RequirementUpdate, Role, Subgroup, User, UserForm, UserSummary, ValidUser,
};

// =============================================================================
// In-memory backend
// =============================================================================

#[derive(Default)]
struct Store {
    next_id: i64,
    users: Vec<User>,
    /// Users with linked complaints
    referenced_users: Vec<i64>,
    families: Vec<Family>,
    groups: Vec<Group>,
    subgroups: Vec<Subgroup>,
    requirements: Vec<Requirement>,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn path_of(&self, requirement: &Requirement) -> HierarchyPath {
        let subgroup = self
            .subgroups
            .iter()
            .find(|s| Some(s.id) == requirement.subgroup_id);
        let group = subgroup.and_then(|s| self.groups.iter().find(|g| Some(g.id) == s.group_id));
        let family = group.and_then(|g| self.families.iter().find(|f| Some(f.id) == g.family_id));
        let node = |id: i64, name: &str| PathNode {
            id,
            name: name.to_string(),
            code: None,
        };
        HierarchyPath {
            family: family.map(|f| node(f.id, &f.name)),
            group: group.map(|g| node(g.id, &g.name)),
            subgroup: subgroup.map(|s| node(s.id, &s.name)),
        }
    }

    fn with_ancestors(&self, requirement: &Requirement) -> Requirement {
        let path = self.path_of(requirement);
        Requirement {
            family_name: path.family.map(|n| n.name),
            group_name: path.group.map(|n| n.name),
            subgroup_name: path.subgroup.map(|n| n.name),
            ..requirement.clone()
        }
    }
}

#[derive(Default)]
struct FakeBackend {
    store: Mutex<Store>,
}

fn not_found(what: &str, id: i64) -> AppError {
    AppError::Http {
        status: 404,
        message: format!("{} {} not found", what, id),
    }
}

fn summary(user: &User) -> UserSummary {
    UserSummary {
        id: user.id,
        full_name: Some(user.full_name()),
        rut: Some(user.rut.clone()),
        email: Some(user.email.clone()),
        role_name: None,
        active: Some(user.active),
    }
}

fn user_from(id: i64, valid: &ValidUser) -> User {
    User {
        id,
        first_name: valid.first_name.clone(),
        paternal_last_name: valid.paternal_last_name.clone(),
        maternal_last_name: valid.maternal_last_name.clone(),
        rut: valid.rut.clone(),
        phone: valid.phone.clone(),
        email: valid.email.clone(),
        role: valid.role,
        role_name: None,
        shift_id: valid.shift_id,
        shift_name: None,
        active: valid.active,
        address: valid.address.clone(),
        created_at: None,
    }
}

#[async_trait]
impl AdminApi for FakeBackend {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.store.lock().unwrap().users.clone())
    }

    async fn get_user(&self, id: i64) -> AppResult<User> {
        let store = self.store.lock().unwrap();
        store
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| not_found("user", id))
    }

    async fn search_users(&self, query: &str) -> AppResult<Vec<UserSummary>> {
        let query = query.trim().to_lowercase();
        let store = self.store.lock().unwrap();
        Ok(store
            .users
            .iter()
            .filter(|u| u.full_name().to_lowercase().contains(&query))
            .take(10)
            .map(summary)
            .collect())
    }

    async fn create_user(&self, user: &ValidUser) -> AppResult<UserSummary> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let created = user_from(id, user);
        store.users.push(created.clone());
        Ok(summary(&created))
    }

    async fn update_user(&self, id: i64, user: &ValidUser) -> AppResult<UserSummary> {
        let mut store = self.store.lock().unwrap();
        let slot = store
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| not_found("user", id))?;
        *slot = user_from(id, user);
        Ok(summary(slot))
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        let mut store = self.store.lock().unwrap();
        if store.referenced_users.contains(&id) {
            return Err(AppError::from_response(
                400,
                r#"{"error": "El usuario tiene denuncias asociadas"}"#,
            ));
        }
        store.users.retain(|u| u.id != id);
        Ok(())
    }

    async fn list_families(&self) -> AppResult<Vec<Family>> {
        Ok(self.store.lock().unwrap().families.clone())
    }

    async fn list_groups(&self, family_id: i64) -> AppResult<Vec<Group>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .groups
            .iter()
            .filter(|g| g.family_id == Some(family_id))
            .cloned()
            .collect())
    }

    async fn list_subgroups(&self, group_id: i64) -> AppResult<Vec<Subgroup>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .subgroups
            .iter()
            .filter(|s| s.group_id == Some(group_id))
            .cloned()
            .collect())
    }

    async fn list_requirements(&self, subgroup_id: Option<i64>) -> AppResult<Vec<Requirement>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .requirements
            .iter()
            .filter(|r| subgroup_id.is_none() || r.subgroup_id == subgroup_id)
            .map(|r| store.with_ancestors(r))
            .collect())
    }

    async fn get_requirement(&self, id: i64) -> AppResult<Requirement> {
        let store = self.store.lock().unwrap();
        store
            .requirements
            .iter()
            .find(|r| r.id == id)
            .map(|r| store.with_ancestors(r))
            .ok_or_else(|| not_found("requirement", id))
    }

    async fn hierarchy_path(&self, requirement_id: i64) -> AppResult<HierarchyPath> {
        let store = self.store.lock().unwrap();
        store
            .requirements
            .iter()
            .find(|r| r.id == requirement_id)
            .map(|r| store.path_of(r))
            .ok_or_else(|| not_found("requirement", requirement_id))
    }

    async fn create_node(&self, node: &NewNode) -> AppResult<i64> {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id();
        let name = node.name.clone();
        match node.level {
            Level::Family => store.families.push(Family { id, name, code: None }),
            Level::Group => store.groups.push(Group {
                id,
                name,
                code: None,
                family_id: node.parent_id,
            }),
            Level::Subgroup => store.subgroups.push(Subgroup {
                id,
                name,
                code: None,
                group_id: node.parent_id,
            }),
            Level::Requirement => store.requirements.push(Requirement {
                id,
                name,
                classification: node.classification.unwrap_or(Classification::Medium),
                description: node.description.clone(),
                code: Some(format!("REQ-{:03}", id)),
                subgroup_id: node.parent_id,
                family_name: None,
                group_name: None,
                subgroup_name: None,
            }),
        }
        Ok(id)
    }

    async fn update_requirement(&self, id: i64, update: &RequirementUpdate) -> AppResult<()> {
        let mut store = self.store.lock().unwrap();
        let requirement = store
            .requirements
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| not_found("requirement", id))?;
        requirement.name = update.name.clone();
        requirement.classification = update.classification;
        requirement.description = Some(update.description.clone());
        if update.subgroup_id.is_some() {
            requirement.subgroup_id = update.subgroup_id;
        }
        Ok(())
    }

    async fn delete_node(&self, level: Level, id: i64) -> AppResult<()> {
        let mut store = self.store.lock().unwrap();
        match level {
            Level::Family => store.families.retain(|f| f.id != id),
            Level::Group => store.groups.retain(|g| g.id != id),
            Level::Subgroup => store.subgroups.retain(|s| s.id != id),
            Level::Requirement => store.requirements.retain(|r| r.id != id),
        }
        Ok(())
    }
}

// =============================================================================
// Presenter and confirmer doubles
// =============================================================================

#[derive(Default)]
struct RecordingPresenter {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<(String, Vec<String>)>>,
}

impl Presenter for RecordingPresenter {
    fn loading(&self, _message: &str) {}

    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, title: &str, messages: &[String]) {
        self.errors
            .lock()
            .unwrap()
            .push((title.to_string(), messages.to_vec()));
    }
}

struct FixedConfirmer {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl FixedConfirmer {
    fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Confirmer for FixedConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
    }
}

struct Harness {
    api: Arc<FakeBackend>,
    presenter: Arc<RecordingPresenter>,
    confirmer: Arc<FixedConfirmer>,
    events: EventBus,
    crud: CrudOrchestrator,
}

const RELOAD_DELAY: Duration = Duration::from_millis(50);

fn harness(store: Store, confirm: bool) -> Harness {
    let api = Arc::new(FakeBackend {
        store: Mutex::new(store),
    });
    let presenter = Arc::new(RecordingPresenter::default());
    let confirmer = Arc::new(FixedConfirmer::new(confirm));
    let events = EventBus::new();
    let crud = CrudOrchestrator::new(
        api.clone(),
        presenter.clone(),
        confirmer.clone(),
        events.clone(),
        RELOAD_DELAY,
    );
    Harness {
        api,
        presenter,
        confirmer,
        events,
        crud,
    }
}

fn user(id: i64, first_name: &str, role: Role) -> User {
    User {
        id,
        first_name: first_name.to_string(),
        paternal_last_name: "Rojas".to_string(),
        maternal_last_name: "Soto".to_string(),
        rut: "123456785".to_string(),
        phone: "987654321".to_string(),
        email: format!("{}@muni.cl", first_name.to_lowercase()),
        role,
        role_name: None,
        shift_id: None,
        shift_name: None,
        active: true,
        address: None,
        created_at: None,
    }
}

fn seeded_users() -> Store {
    Store {
        next_id: 100,
        users: vec![
            user(1, "Admin", Role::Administrator),
            user(5, "Olga", Role::Operator),
            user(6, "Diego", Role::Driver),
            user(9, "Carla", Role::Citizen),
        ],
        referenced_users: vec![5],
        ..Default::default()
    }
}

// =============================================================================
// Taxonomy
// =============================================================================

#[tokio::test]
async fn test_build_chain_then_move_requirement() {
    let h = harness(Store::default(), true);
    let api: Arc<dyn AdminApi> = h.api.clone();
    let mut events = h.events.subscribe();

    // Each creation selects the new node and enables the next control
    let mut selector = HierarchySelector::new(api.clone());
    selector.load_families().await.unwrap();
    let family = selector.create_node(Level::Family, "Seguridad", None).await.unwrap();
    assert_eq!(selector.selected(Level::Family), Some(family));
    assert!(selector.control(Level::Group).is_enabled());

    let group = selector
        .create_node(Level::Group, "Convivencia", Some(family))
        .await
        .unwrap();
    let noise = selector
        .create_node(Level::Subgroup, "Ruidos", Some(group))
        .await
        .unwrap();
    let commerce = selector
        .create_node(Level::Subgroup, "Comercio", Some(group))
        .await
        .unwrap();
    assert_eq!(selector.control(Level::Subgroup).options().len(), 2);

    let node = NewNode::new(Level::Requirement, "Fiesta nocturna", Some(noise))
        .unwrap()
        .with_details(Classification::High, Some("Después de las 22:00".to_string()));
    let requirement = h.crud.create_node(&node).await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        DataChanged {
            entity: Entity::Taxonomy,
            refresh: Refresh::full_reload(RELOAD_DELAY),
        }
    );

    // Edit screen resolves the current ancestors
    let mut modal = RequirementEditModal::new(api.clone(), ViewEpoch::new());
    assert_eq!(modal.open().await.unwrap(), Load::Applied);
    assert_eq!(modal.select(requirement).await.unwrap(), Load::Applied);
    assert!(!modal.selector().is_unavailable());
    assert_eq!(modal.selector().selected(Level::Family), Some(family));
    assert_eq!(modal.selector().selected(Level::Group), Some(group));
    assert_eq!(modal.selector().selected(Level::Subgroup), Some(noise));
    assert_eq!(modal.classification(), Classification::High);

    modal
        .selector_mut()
        .on_subgroup_change(Some(commerce))
        .await
        .unwrap();
    modal.set_name("Fiesta con música");
    modal.submit(&h.crud).await.unwrap();

    let moved = api.get_requirement(requirement).await.unwrap();
    assert_eq!(moved.subgroup_id, Some(commerce));
    assert_eq!(moved.name, "Fiesta con música");
    assert_eq!(
        moved.ancestor_path().as_deref(),
        Some("Seguridad > Convivencia > Comercio")
    );
    assert!(h
        .presenter
        .successes
        .lock()
        .unwrap()
        .contains(&"Requirement updated successfully".to_string()));
}

#[tokio::test]
async fn test_requirement_search_includes_ancestor_names() {
    let h = harness(Store::default(), true);
    let api: Arc<dyn AdminApi> = h.api.clone();

    let family = api
        .create_node(&NewNode::new(Level::Family, "Tránsito", None).unwrap())
        .await
        .unwrap();
    let group = api
        .create_node(&NewNode::new(Level::Group, "Vehículos", Some(family)).unwrap())
        .await
        .unwrap();
    let subgroup = api
        .create_node(&NewNode::new(Level::Subgroup, "Estacionamiento", Some(group)).unwrap())
        .await
        .unwrap();
    api.create_node(&NewNode::new(Level::Requirement, "Auto mal estacionado", Some(subgroup)).unwrap())
        .await
        .unwrap();

    let mut modal = RequirementEditModal::new(api, ViewEpoch::new());
    modal.open().await.unwrap();
    assert_eq!(modal.search("tránsito").items().len(), 1);
    assert!(modal.search("").items().is_empty());
}

#[tokio::test]
async fn test_declined_node_delete_keeps_the_node() {
    let h = harness(Store::default(), false);
    let api: Arc<dyn AdminApi> = h.api.clone();
    let family = api
        .create_node(&NewNode::new(Level::Family, "Seguridad", None).unwrap())
        .await
        .unwrap();

    let err = h
        .crud
        .delete_node(Level::Family, family, "Seguridad")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Cancelled));
    assert_eq!(api.list_families().await.unwrap().len(), 1);

    // Cascade warning shown, nothing presented as an error
    assert!(h.confirmer.prompts.lock().unwrap()[0].contains("Seguridad"));
    assert!(h.presenter.errors.lock().unwrap().is_empty());
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_create_user_refreshes_overview() {
    let h = harness(seeded_users(), true);
    let mut events = h.events.subscribe();

    let before = load_overview(h.api.as_ref()).await.unwrap();

    let form = UserForm {
        first_name: "Ana".to_string(),
        paternal_last_name: "Rojas".to_string(),
        maternal_last_name: "Soto".to_string(),
        rut: "12.345.678-5".to_string(),
        phone: "9 8765 4321".to_string(),
        email: "ana@muni.cl".to_string(),
        role: Some(Role::Inspector),
        shift_id: Some(4),
        active: true,
        address: None,
        password: "Segura#2024".to_string(),
        password_confirmation: "Segura#2024".to_string(),
    };
    let created = h.crud.create_user(&form).await.unwrap();
    assert_eq!(created.id, 101);
    assert_eq!(
        events.recv().await.unwrap(),
        DataChanged {
            entity: Entity::Users,
            refresh: Refresh::Soft,
        }
    );

    let after = load_overview(h.api.as_ref()).await.unwrap();
    assert_eq!(after.user_stats.total, before.user_stats.total + 1);
}

#[tokio::test]
async fn test_invalid_user_form_never_reaches_backend() {
    let h = harness(seeded_users(), true);

    let form = UserForm {
        first_name: "Ana".to_string(),
        rut: "12.345.678-4".to_string(),
        role: Some(Role::Operator),
        ..Default::default()
    };
    assert!(matches!(
        h.crud.create_user(&form).await,
        Err(AppError::Validation(_))
    ));
    assert_eq!(h.api.list_users().await.unwrap().len(), 4);

    let errors = h.presenter.errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].1.len() > 1);
}

#[tokio::test]
async fn test_delete_screen_guards() {
    let h = harness(seeded_users(), true);
    let api: Arc<dyn AdminApi> = h.api.clone();

    let mut modal = UserDeleteModal::new(api.clone(), ViewEpoch::new());
    modal.open().await.unwrap();
    // Citizens are not listed
    assert_eq!(modal.users().len(), 3);
    assert!(modal.select(9).is_err());

    // Protected administrator is refused before any confirmation
    modal.select(1).unwrap();
    assert!(!modal.can_confirm());
    assert!(matches!(
        modal.confirm(&h.crud).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(h.confirmer.prompts.lock().unwrap().is_empty());

    // Linked complaints explain the refusal
    modal.select(5).unwrap();
    assert!(matches!(
        modal.confirm(&h.crud).await,
        Err(AppError::Dependency { .. })
    ));

    let errors = h.presenter.errors.lock().unwrap().clone();
    assert_eq!(errors[0].1, vec![PROTECTED_USER_MESSAGE.to_string()]);
    assert_eq!(errors[1].1, vec![USER_DEPENDENCY_MESSAGE.to_string()]);

    // A plain user goes away
    modal.select(6).unwrap();
    modal.confirm(&h.crud).await.unwrap();
    assert_eq!(modal.users().len(), 2);
    assert!(api.get_user(6).await.is_err());
}

#[tokio::test]
async fn test_edit_role_change_drops_invalid_shift() {
    let mut store = seeded_users();
    store.users[1].shift_id = Some(2);
    let h = harness(store, true);

    let mut modal = UserEditModal::new(h.api.clone(), ViewEpoch::new());
    modal.open().await.unwrap();
    assert_eq!(modal.select(5).await.unwrap(), Load::Applied);

    let selection = modal.set_role(Some(Role::Inspector));
    assert_eq!(selection.selected, None);
    modal.form_mut().shift_id = Some(5);
    modal.submit(&h.crud).await.unwrap();

    let saved = h.api.get_user(5).await.unwrap();
    assert_eq!(saved.role, Role::Inspector);
    assert_eq!(saved.shift_id, Some(5));

    // Citizens cannot be opened for editing
    assert!(matches!(
        modal.select(9).await,
        Err(AppError::Forbidden(_))
    ));
}
