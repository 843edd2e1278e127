mod approvals;
mod assignment_validator;
mod assignments;
mod directory;
mod timesheets;
mod unit_of_work;

pub use approvals::{ApprovalServiceImpl, ApprovalStrategy, DefaultApprovalStrategy};
pub use assignment_validator::AssignmentValidator;
pub use assignments::AssignmentServiceImpl;
pub use directory::DirectoryServiceImpl;
pub use timesheets::TimesheetServiceImpl;
pub use unit_of_work::UnitOfWork;
