//! Backend API abstraction.

use async_trait::async_trait;

use common::AppResult;
use domain::{
    Family, Group, HierarchyPath, Level, NewNode, Requirement, RequirementUpdate, Subgroup, User,
    UserSummary, ValidUser,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Backend operations used by the administration workflows.
///
/// Implementations return canonical domain records; wire differences stay
/// behind this trait.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AdminApi: Send + Sync {
    // Users

    /// List every user
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Get one user by id
    async fn get_user(&self, id: i64) -> AppResult<User>;

    /// Server-side search by name, email or RUT (at most 10 rows)
    async fn search_users(&self, query: &str) -> AppResult<Vec<UserSummary>>;

    /// Create a user from validated form values
    async fn create_user(&self, user: &ValidUser) -> AppResult<UserSummary>;

    /// Update editable fields; the password is only sent when present
    async fn update_user(&self, id: i64, user: &ValidUser) -> AppResult<UserSummary>;

    async fn delete_user(&self, id: i64) -> AppResult<()>;

    // Taxonomy

    async fn list_families(&self) -> AppResult<Vec<Family>>;

    /// Groups of one family
    async fn list_groups(&self, family_id: i64) -> AppResult<Vec<Group>>;

    /// Subgroups of one group
    async fn list_subgroups(&self, group_id: i64) -> AppResult<Vec<Subgroup>>;

    /// Requirements of one subgroup, or every requirement when `None`
    async fn list_requirements(&self, subgroup_id: Option<i64>) -> AppResult<Vec<Requirement>>;

    /// One requirement with its ancestor names
    async fn get_requirement(&self, id: i64) -> AppResult<Requirement>;

    /// Ancestor chain of a requirement
    async fn hierarchy_path(&self, requirement_id: i64) -> AppResult<HierarchyPath>;

    /// Create a node and return its id
    async fn create_node(&self, node: &NewNode) -> AppResult<i64>;

    async fn update_requirement(&self, id: i64, update: &RequirementUpdate) -> AppResult<()>;

    async fn delete_node(&self, level: Level, id: i64) -> AppResult<()>;
}
