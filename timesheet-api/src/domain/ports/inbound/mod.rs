mod approvals;
mod assignments;
mod directory;
mod timesheets;

pub use approvals::*;
pub use assignments::*;
pub use directory::*;
pub use timesheets::*;
