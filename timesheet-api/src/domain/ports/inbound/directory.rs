use async_trait::async_trait;

use crate::domain::{
    models::{NewProjectCode, ProjectCode, ProjectCodeId, ProjectCodeStatus, UserId},
    ActorContext, NewUser, TimesheetResult, User,
};

/// Inbound port for user and project code administration.
#[async_trait]
pub trait DirectoryService: Send + Sync + 'static {
    // ========================================================================
    // Users
    // ========================================================================

    async fn create_user(&self, actor: &ActorContext, user: &NewUser) -> TimesheetResult<User>;

    async fn get_user(&self, actor: &ActorContext, id: UserId) -> TimesheetResult<User>;

    async fn list_users(&self, actor: &ActorContext) -> TimesheetResult<Vec<User>>;

    async fn set_user_active(
        &self,
        actor: &ActorContext,
        id: UserId,
        active: bool,
    ) -> TimesheetResult<User>;

    /// Delete a user. Rejected while the user owns assignments or timesheets.
    async fn delete_user(&self, actor: &ActorContext, id: UserId) -> TimesheetResult<()>;

    /// Look up a login candidate. Not actor-scoped: used before a token exists.
    async fn find_by_email(&self, email: &str) -> TimesheetResult<Option<User>>;

    /// Create `user` as a manager when no users exist yet.
    ///
    /// Returns `None` when the directory was already populated.
    async fn ensure_bootstrap_manager(&self, user: &NewUser) -> TimesheetResult<Option<User>>;

    // ========================================================================
    // Project codes
    // ========================================================================

    async fn create_project_code(
        &self,
        actor: &ActorContext,
        code: &NewProjectCode,
    ) -> TimesheetResult<ProjectCode>;

    async fn list_project_codes(&self, actor: &ActorContext) -> TimesheetResult<Vec<ProjectCode>>;

    async fn set_project_code_status(
        &self,
        actor: &ActorContext,
        id: ProjectCodeId,
        status: ProjectCodeStatus,
    ) -> TimesheetResult<ProjectCode>;

    /// Delete a project code. Rejected while it has assignments or timesheets.
    async fn delete_project_code(
        &self,
        actor: &ActorContext,
        id: ProjectCodeId,
    ) -> TimesheetResult<()>;
}
