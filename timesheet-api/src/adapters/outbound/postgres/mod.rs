//! PostgreSQL implementation of the entity store port.

mod error;
mod rows;
mod store;

pub use store::{PgStoreTransaction, PgTimesheetStore};
