use std::sync::Arc;

use crate::{
    auth::{JwtIssuer, PasswordHasher},
    domain::{
        ports::{
            inbound::{ApprovalService, AssignmentService, DirectoryService, TimesheetService},
            outbound::TimesheetStore,
        },
        services::{
            ApprovalServiceImpl, AssignmentServiceImpl, DirectoryServiceImpl,
            TimesheetServiceImpl,
        },
    },
};

/// Shared handler state: the inbound ports plus token and password helpers.
#[derive(Clone)]
pub struct AppState {
    pub timesheets: Arc<dyn TimesheetService>,
    pub approvals: Arc<dyn ApprovalService>,
    pub assignments: Arc<dyn AssignmentService>,
    pub directory: Arc<dyn DirectoryService>,
    pub tokens: Arc<JwtIssuer>,
    pub passwords: PasswordHasher,
}

impl AppState {
    /// Wire every service to the same entity store.
    pub fn new<S: TimesheetStore>(store: Arc<S>, tokens: JwtIssuer) -> Self {
        Self {
            timesheets: Arc::new(TimesheetServiceImpl::new(store.clone())),
            approvals: Arc::new(ApprovalServiceImpl::new(store.clone())),
            assignments: Arc::new(AssignmentServiceImpl::new(store.clone())),
            directory: Arc::new(DirectoryServiceImpl::new(store)),
            tokens: Arc::new(tokens),
            passwords: PasswordHasher,
        }
    }
}
