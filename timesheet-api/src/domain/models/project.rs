use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ProjectCodeId;

/// Whether hours may still be booked against a project code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum ProjectCodeStatus {
    Active,
    Inactive,
}

/// A bookable project code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCode {
    pub id: ProjectCodeId,
    /// Unique short code (e.g., "ACME-042").
    pub code: String,
    pub name: String,
    pub is_billable: bool,
    pub status: ProjectCodeStatus,
}

impl ProjectCode {
    pub fn is_active(&self) -> bool {
        self.status == ProjectCodeStatus::Active
    }
}

/// Data for creating a new project code.
#[derive(Debug, Clone)]
pub struct NewProjectCode {
    pub code: String,
    pub name: String,
    pub is_billable: bool,
}

impl NewProjectCode {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            is_billable: true,
        }
    }

    pub fn non_billable(mut self) -> Self {
        self.is_billable = false;
        self
    }
}
