//! Cascading Family → Group → Subgroup → Requirement selection.
//!
//! Four dependent select controls. Changing a level always clears and
//! disables every level below it, then repopulates the direct child from the
//! backend. Each cascade step is awaited before the next one starts, so a
//! caller driving several levels in a row never races a pending fetch.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use common::{AppError, AppResult};
use domain::{Family, Level, NewNode};

use crate::clients::AdminApi;

/// One entry of a select control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub id: i64,
    pub label: String,
}

/// Row as rendered, placeholder included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRow {
    /// `None` for the placeholder or error row
    pub id: Option<i64>,
    pub label: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlState {
    /// Nothing loaded yet
    Placeholder,
    Loaded,
    /// The last fetch failed; the message is shown as the only option
    Error(String),
}

/// State of a single select control.
#[derive(Debug, Clone)]
pub struct SelectControl {
    level: Level,
    options: Vec<SelectOption>,
    selected: Option<i64>,
    enabled: bool,
    state: ControlState,
}

impl SelectControl {
    fn new(level: Level) -> Self {
        Self {
            level,
            options: Vec::new(),
            selected: None,
            enabled: false,
            state: ControlState::Placeholder,
        }
    }

    fn clear(&mut self) {
        *self = Self::new(self.level);
    }

    fn populate(&mut self, options: Vec<SelectOption>) {
        self.options = options;
        self.selected = None;
        self.enabled = true;
        self.state = ControlState::Loaded;
    }

    fn fail(&mut self, message: String) {
        self.options.clear();
        self.selected = None;
        self.enabled = false;
        self.state = ControlState::Error(message);
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub fn selected_option(&self) -> Option<&SelectOption> {
        self.selected
            .and_then(|id| self.options.iter().find(|o| o.id == id))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Text of the leading disabled row
    pub fn placeholder(&self) -> String {
        format!("Select a {}", self.level)
    }

    /// Options as rendered: a disabled placeholder or error row first.
    pub fn rows(&self) -> Vec<OptionRow> {
        let first = match &self.state {
            ControlState::Error(_) => format!("Error loading {}", self.level.plural()),
            _ => self.placeholder(),
        };
        std::iter::once(OptionRow {
            id: None,
            label: first,
            disabled: true,
        })
        .chain(self.options.iter().map(|o| OptionRow {
            id: Some(o.id),
            label: o.label.clone(),
            disabled: false,
        }))
        .collect()
    }
}

fn slot(level: Level) -> usize {
    match level {
        Level::Family => 0,
        Level::Group => 1,
        Level::Subgroup => 2,
        Level::Requirement => 3,
    }
}

/// Cascading selector over the four taxonomy levels.
pub struct HierarchySelector {
    api: Arc<dyn AdminApi>,
    controls: [SelectControl; 4],
    /// Set when an ancestor lookup came back incomplete
    unavailable: bool,
}

impl HierarchySelector {
    pub fn new(api: Arc<dyn AdminApi>) -> Self {
        Self {
            api,
            controls: Level::ALL.map(SelectControl::new),
            unavailable: false,
        }
    }

    pub fn control(&self, level: Level) -> &SelectControl {
        &self.controls[slot(level)]
    }

    fn control_mut(&mut self, level: Level) -> &mut SelectControl {
        &mut self.controls[slot(level)]
    }

    pub fn selected(&self, level: Level) -> Option<i64> {
        self.control(level).selected()
    }

    /// True after a lookup could not resolve the whole ancestor chain
    pub fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    /// Return every control to its initial state.
    pub fn reset(&mut self) {
        for control in &mut self.controls {
            control.clear();
        }
        self.unavailable = false;
    }

    async fn fetch_options(&self, level: Level, parent_id: Option<i64>) -> AppResult<Vec<SelectOption>> {
        let options = match (level, parent_id) {
            (Level::Family, _) => self
                .api
                .list_families()
                .await?
                .into_iter()
                .map(|f| SelectOption { id: f.id, label: f.name })
                .collect(),
            (Level::Group, Some(family_id)) => self
                .api
                .list_groups(family_id)
                .await?
                .into_iter()
                .map(|g| SelectOption { id: g.id, label: g.name })
                .collect(),
            (Level::Subgroup, Some(group_id)) => self
                .api
                .list_subgroups(group_id)
                .await?
                .into_iter()
                .map(|s| SelectOption { id: s.id, label: s.name })
                .collect(),
            (Level::Requirement, Some(subgroup_id)) => self
                .api
                .list_requirements(Some(subgroup_id))
                .await?
                .into_iter()
                .map(|r| SelectOption {
                    id: r.id,
                    label: r.option_label(),
                })
                .collect(),
            (level, None) => {
                return Err(AppError::internal(format!(
                    "cannot list {} without a parent",
                    level.plural()
                )))
            }
        };
        Ok(options)
    }

    /// Fetch a level's options and populate it, or leave it in the error state.
    async fn reload(&mut self, level: Level, parent_id: Option<i64>) -> AppResult<()> {
        for below in level.descendants() {
            self.control_mut(below).clear();
        }
        match self.fetch_options(level, parent_id).await {
            Ok(options) => {
                debug!("Loaded {} {} options", options.len(), level);
                self.control_mut(level).populate(options);
                Ok(())
            }
            Err(e) => {
                error!("Failed to load {}: {}", level.plural(), e);
                self.control_mut(level).fail(e.user_message());
                Err(e)
            }
        }
    }

    /// Select `id` at `level`, clear every descendant and repopulate the child.
    pub async fn select(&mut self, level: Level, id: Option<i64>) -> AppResult<()> {
        let control = self.control_mut(level);
        control.selected = id;
        if let Some(id) = id {
            if !control.options.iter().any(|o| o.id == id) {
                warn!("{} {} is not among the loaded options", level, id);
            }
        }

        for below in level.descendants() {
            self.control_mut(below).clear();
        }

        match (level.child(), id) {
            (Some(child), Some(parent_id)) => self.reload(child, Some(parent_id)).await,
            _ => Ok(()),
        }
    }

    /// Populate the family control; every other level starts cleared.
    pub async fn load_families(&mut self) -> AppResult<()> {
        self.unavailable = false;
        self.reload(Level::Family, None).await
    }

    /// Populate the family control from a list fetched elsewhere.
    ///
    /// A failed fetch leaves the control in the error state and is returned.
    pub fn set_families(&mut self, families: AppResult<Vec<Family>>) -> AppResult<()> {
        self.unavailable = false;
        for below in Level::Family.descendants() {
            self.control_mut(below).clear();
        }
        match families {
            Ok(families) => {
                self.control_mut(Level::Family).populate(
                    families
                        .into_iter()
                        .map(|f| SelectOption { id: f.id, label: f.name })
                        .collect(),
                );
                Ok(())
            }
            Err(e) => {
                error!("Failed to load families: {}", e);
                self.control_mut(Level::Family).fail(e.user_message());
                Err(e)
            }
        }
    }

    pub async fn on_family_change(&mut self, family_id: Option<i64>) -> AppResult<()> {
        self.select(Level::Family, family_id).await
    }

    pub async fn on_group_change(&mut self, group_id: Option<i64>) -> AppResult<()> {
        self.select(Level::Group, group_id).await
    }

    pub async fn on_subgroup_change(&mut self, subgroup_id: Option<i64>) -> AppResult<()> {
        self.select(Level::Subgroup, subgroup_id).await
    }

    pub async fn on_requirement_change(&mut self, requirement_id: Option<i64>) -> AppResult<()> {
        self.select(Level::Requirement, requirement_id).await
    }

    /// Create a node, reload its level, select it and cascade to the next level.
    ///
    /// Name and parent are checked before any request is made.
    pub async fn create_node(
        &mut self,
        level: Level,
        name: &str,
        parent_id: Option<i64>,
    ) -> AppResult<i64> {
        let node = NewNode::new(level, name, parent_id)?;
        self.create(node).await
    }

    /// Same as [`create_node`](Self::create_node) for a fully described node.
    ///
    /// Returns the new id as soon as the backend accepts the node, even when
    /// refreshing the controls afterwards fails.
    pub async fn create(&mut self, node: NewNode) -> AppResult<i64> {
        let level = node.level;
        let parent_id = node.parent_id;
        let id = self.api.create_node(&node).await?;
        info!("Created {} '{}' with id {}", level, node.name, id);

        if let Some(parent) = level.parent() {
            // Keep the parent control in step when creating under another selection
            if self.selected(parent) != parent_id {
                self.control_mut(parent).selected = parent_id;
            }
        }
        // The node exists from here on; refresh failures stay on the controls
        if let Err(e) = self.reload(level, parent_id).await {
            warn!("Created {} {} but could not reload its level: {}", level, id, e);
            return Ok(id);
        }
        if let Err(e) = self.select(level, Some(id)).await {
            warn!("Created {} {} but could not load what is below it: {}", level, id, e);
        }
        Ok(id)
    }

    /// Drive the controls to a requirement's current ancestors.
    ///
    /// An incomplete chain marks the hierarchy as unavailable instead of failing.
    pub async fn load_current_hierarchy(&mut self, requirement_id: i64) -> AppResult<()> {
        let path = match self.api.hierarchy_path(requirement_id).await {
            Ok(path) => path,
            Err(e @ AppError::Http { .. }) => {
                warn!("Hierarchy lookup failed for requirement {}: {}", requirement_id, e);
                self.unavailable = true;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let Some((family_id, group_id, subgroup_id)) = path.ids() else {
            warn!("Requirement {} has an incomplete hierarchy", requirement_id);
            self.unavailable = true;
            return Ok(());
        };
        self.unavailable = false;

        if self.control(Level::Family).state() != &ControlState::Loaded {
            self.reload(Level::Family, None).await?;
        }
        self.on_family_change(Some(family_id)).await?;
        self.on_group_change(Some(group_id)).await?;
        self.on_subgroup_change(Some(subgroup_id)).await?;
        self.on_requirement_change(Some(requirement_id)).await
    }
}
