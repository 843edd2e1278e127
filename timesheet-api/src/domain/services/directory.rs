use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    models::{NewProjectCode, ProjectCode, ProjectCodeId, ProjectCodeStatus, UserId},
    ports::{
        inbound::DirectoryService,
        outbound::{StoreTransaction, TimesheetStore},
    },
    ActorContext, NewUser, Role, TimesheetError, TimesheetResult, User,
};

use super::UnitOfWork;

/// Implementation of the DirectoryService inbound port.
pub struct DirectoryServiceImpl<S> {
    store: Arc<S>,
}

impl<S: TimesheetStore> DirectoryServiceImpl<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

fn ensure_manager(actor: &ActorContext, what: &str) -> TimesheetResult<()> {
    if !actor.is_manager() {
        return Err(TimesheetError::forbidden(format!("only managers can {what}")));
    }
    Ok(())
}

/// Trim and lowercase the email, check the rest of the record is usable.
fn normalize_user(user: &NewUser) -> TimesheetResult<NewUser> {
    let email = user.email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => {
            return Err(TimesheetError::validation(format!(
                "'{}' is not a valid email address",
                user.email
            )))
        }
    }

    let full_name = user.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(TimesheetError::validation("full name must not be empty"));
    }
    if user.password_hash.is_empty() {
        return Err(TimesheetError::validation("a password is required"));
    }

    Ok(NewUser {
        email,
        full_name,
        role: user.role,
        password_hash: user.password_hash.clone(),
    })
}

fn normalize_project_code(code: &NewProjectCode) -> TimesheetResult<NewProjectCode> {
    let normalized = NewProjectCode {
        code: code.code.trim().to_uppercase(),
        name: code.name.trim().to_string(),
        is_billable: code.is_billable,
    };
    if normalized.code.is_empty() {
        return Err(TimesheetError::validation("project code must not be empty"));
    }
    if normalized.code.chars().any(char::is_whitespace) {
        return Err(TimesheetError::validation(
            "project code must not contain whitespace",
        ));
    }
    if normalized.name.is_empty() {
        return Err(TimesheetError::validation("project name must not be empty"));
    }
    Ok(normalized)
}

async fn insert_user_in<T: StoreTransaction>(tx: &mut T, user: &NewUser) -> TimesheetResult<User> {
    if tx.user_by_email(&user.email).await?.is_some() {
        return Err(TimesheetError::conflict(format!(
            "a user with email {} already exists",
            user.email
        )));
    }
    tx.insert_user(user).await
}

async fn load_user<T: StoreTransaction>(tx: &mut T, id: UserId) -> TimesheetResult<User> {
    tx.user(id)
        .await?
        .ok_or_else(|| TimesheetError::not_found("user", id))
}

async fn load_project_code<T: StoreTransaction>(
    tx: &mut T,
    id: ProjectCodeId,
) -> TimesheetResult<ProjectCode> {
    tx.project_code(id)
        .await?
        .ok_or_else(|| TimesheetError::not_found("project code", id))
}

#[async_trait]
impl<S: TimesheetStore> DirectoryService for DirectoryServiceImpl<S> {
    async fn create_user(&self, actor: &ActorContext, user: &NewUser) -> TimesheetResult<User> {
        ensure_manager(actor, "create users")?;
        let user = normalize_user(user)?;

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = insert_user_in(uow.tx()?, &user).await;
        let user = uow.finish(result).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "created user");
        Ok(user)
    }

    async fn get_user(&self, actor: &ActorContext, id: UserId) -> TimesheetResult<User> {
        if !actor.can_view(id) {
            return Err(TimesheetError::forbidden(
                "users can only view their own profile",
            ));
        }

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = load_user(uow.tx()?, id).await;
        uow.finish(result).await
    }

    async fn list_users(&self, actor: &ActorContext) -> TimesheetResult<Vec<User>> {
        ensure_manager(actor, "list users")?;

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = uow.tx()?.users().await;
        uow.finish(result).await
    }

    async fn set_user_active(
        &self,
        actor: &ActorContext,
        id: UserId,
        active: bool,
    ) -> TimesheetResult<User> {
        ensure_manager(actor, "activate or deactivate users")?;
        if id == actor.user_id && !active {
            return Err(TimesheetError::validation(
                "managers cannot deactivate their own account",
            ));
        }

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let tx = uow.tx()?;
        let result = match tx.set_user_active(id, active).await {
            Ok(()) => load_user(tx, id).await,
            Err(e) => Err(e),
        };
        let user = uow.finish(result).await?;

        tracing::info!(user_id = %id, active, "changed user activation");
        Ok(user)
    }

    async fn delete_user(&self, actor: &ActorContext, id: UserId) -> TimesheetResult<()> {
        ensure_manager(actor, "delete users")?;
        if id == actor.user_id {
            return Err(TimesheetError::validation(
                "managers cannot delete their own account",
            ));
        }

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = uow.tx()?.delete_user(id).await;
        uow.finish(result).await?;

        tracing::info!(user_id = %id, "deleted user");
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> TimesheetResult<Option<User>> {
        let email = email.trim().to_lowercase();

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = uow.tx()?.user_by_email(&email).await;
        uow.finish(result).await
    }

    async fn ensure_bootstrap_manager(&self, user: &NewUser) -> TimesheetResult<Option<User>> {
        let mut user = normalize_user(user)?;
        user.role = Role::Manager;

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let tx = uow.tx()?;
        let result = match tx.users().await {
            Ok(existing) if !existing.is_empty() => Ok(None),
            Ok(_) => tx.insert_user(&user).await.map(Some),
            Err(e) => Err(e),
        };
        let created = uow.finish(result).await?;

        if let Some(manager) = &created {
            tracing::info!(user_id = %manager.id, email = %manager.email, "created bootstrap manager");
        }
        Ok(created)
    }

    async fn create_project_code(
        &self,
        actor: &ActorContext,
        code: &NewProjectCode,
    ) -> TimesheetResult<ProjectCode> {
        ensure_manager(actor, "create project codes")?;
        let code = normalize_project_code(code)?;

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = uow.tx()?.insert_project_code(&code).await;
        let project_code = uow.finish(result).await?;

        tracing::info!(project_code_id = %project_code.id, code = %project_code.code, "created project code");
        Ok(project_code)
    }

    /// Managers see every code, employees only the active ones.
    async fn list_project_codes(&self, actor: &ActorContext) -> TimesheetResult<Vec<ProjectCode>> {
        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = uow.tx()?.project_codes().await;
        let codes = uow.finish(result).await?;

        if actor.is_manager() {
            Ok(codes)
        } else {
            Ok(codes.into_iter().filter(ProjectCode::is_active).collect())
        }
    }

    async fn set_project_code_status(
        &self,
        actor: &ActorContext,
        id: ProjectCodeId,
        status: ProjectCodeStatus,
    ) -> TimesheetResult<ProjectCode> {
        ensure_manager(actor, "change project codes")?;

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let tx = uow.tx()?;
        let result = match tx.set_project_code_status(id, status).await {
            Ok(()) => load_project_code(tx, id).await,
            Err(e) => Err(e),
        };
        let project_code = uow.finish(result).await?;

        tracing::info!(project_code_id = %id, status = %status, "changed project code status");
        Ok(project_code)
    }

    async fn delete_project_code(
        &self,
        actor: &ActorContext,
        id: ProjectCodeId,
    ) -> TimesheetResult<()> {
        ensure_manager(actor, "delete project codes")?;

        let mut uow = UnitOfWork::start(self.store.clone()).await?;
        let result = uow.tx()?.delete_project_code(id).await;
        uow.finish(result).await?;

        tracing::info!(project_code_id = %id, "deleted project code");
        Ok(())
    }
}
