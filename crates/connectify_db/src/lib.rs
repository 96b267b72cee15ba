//! SQL persistence for Connectify
//!
//! Implements the meeting and credential store traits of `connectify_common`
//! on top of SQLx's `Any` driver, so the same code runs against SQLite,
//! PostgreSQL or MySQL depending on the enabled feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use connectify_db::{DbClient, SqlMeetingRepository};
//!
//! async fn setup() -> Result<SqlMeetingRepository, connectify_db::error::DbError> {
//!     let client = DbClient::from_url("sqlite:data/connectify.db").await?;
//!     let meetings = SqlMeetingRepository::new(client);
//!     meetings.init_schema().await?;
//!     Ok(meetings)
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

pub use client::DbClient;
pub use error::DbError;
pub use repositories::{SqlCredentialRepository, SqlMeetingRepository};
