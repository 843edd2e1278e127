pub mod models;
pub mod ports;
pub mod services;

mod error;
mod user;

pub use error::*;
pub use user::*;
