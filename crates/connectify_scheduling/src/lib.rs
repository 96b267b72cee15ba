// --- File: crates/connectify_scheduling/src/lib.rs ---
// Declare modules within this crate
pub mod availability;
#[cfg(test)]
mod availability_proptest;
pub mod conflict;
#[cfg(test)]
mod conflict_test;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod models;
pub mod recurrence;
pub mod routes;
pub mod service;
pub mod slot_finder;
pub mod time_slot;

pub use error::SchedulingError;
pub use handlers::SchedulingState;
pub use service::SchedulingService;
