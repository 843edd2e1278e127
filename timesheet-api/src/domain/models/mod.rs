mod assignment;
mod ids;
mod project;
mod timesheet;

pub use assignment::*;
pub use ids::*;
pub use project::*;
pub use timesheet::*;
