use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use crate::domain::models::UserId;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
pub enum Role {
    Employee,
    Manager,
}

#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .field("is_active", &self.is_active)
            .field("password_hash", &"[redacted]")
            .finish()
    }
}

/// Data for creating a user. The password is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub password_hash: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("role", &self.role)
            .field("password_hash", &"[redacted]")
            .finish()
    }
}

/// Who is performing an operation.
///
/// Passed explicitly into every service call instead of being read from
/// ambient request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorContext {
    pub user_id: UserId,
    pub role: Role,
}

impl ActorContext {
    pub fn new(user_id: impl Into<UserId>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn employee(user_id: impl Into<UserId>) -> Self {
        Self::new(user_id, Role::Employee)
    }

    pub fn manager(user_id: impl Into<UserId>) -> Self {
        Self::new(user_id, Role::Manager)
    }

    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }

    /// The actor may act on records owned by `owner`: either it is the owner
    /// or it is a manager.
    pub fn can_view(&self, owner: UserId) -> bool {
        self.user_id == owner || self.is_manager()
    }
}
