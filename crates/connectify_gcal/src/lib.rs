// --- File: crates/connectify_gcal/src/lib.rs ---
// Declare modules within this crate
pub mod auth;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
pub mod models;
pub mod routes;
pub mod service;
pub mod state;
#[cfg(test)]
mod state_test;
pub mod sync;
#[cfg(test)]
mod sync_test;

pub use error::SyncError;
pub use handlers::GcalState;
pub use sync::CalendarSynchronizer;
