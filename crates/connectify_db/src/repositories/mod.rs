//! Repository modules for database access
//!
//! Each repository implements one of the store traits from
//! `connectify_common::services`.

pub mod credential_sql;
pub mod meeting_sql;

pub use credential_sql::SqlCredentialRepository;
pub use meeting_sql::SqlMeetingRepository;

use sqlx::any::AnyRow;
use sqlx::{Row, ValueRef};

/// Reads a nullable text column.
///
/// The `Any` driver refuses to decode SQL `NULL` into `Option<String>`, so
/// NULL is checked on the raw value first.
pub(crate) fn optional_text(row: &AnyRow, column: &str) -> Result<Option<String>, sqlx::Error> {
    if row.try_get_raw(column)?.is_null() {
        return Ok(None);
    }
    row.try_get::<String, _>(column).map(Some)
}
