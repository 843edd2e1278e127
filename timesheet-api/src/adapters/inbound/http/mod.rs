//! JSON request and response types for the HTTP surface.

mod requests;
mod responses;

pub use requests::*;
pub use responses::*;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");
