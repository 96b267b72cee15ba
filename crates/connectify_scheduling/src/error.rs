// --- File: crates/connectify_scheduling/src/error.rs ---
use connectify_common::{services::StoreError, ConnectifyError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Invalid scheduling request: {0}")]
    Validation(String),
    #[error("Meeting not found: {0}")]
    NotFound(String),
    #[error("Meeting store failed: {0}")]
    Store(#[from] StoreError),
}

impl From<SchedulingError> for ConnectifyError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::Validation(message) => ConnectifyError::ValidationError(message),
            SchedulingError::NotFound(id) => ConnectifyError::NotFoundError(format!("meeting {}", id)),
            SchedulingError::Store(store) => store.into(),
        }
    }
}
