// --- File: crates/connectify_gcal/src/error.rs ---
use connectify_common::services::{ProviderError, StoreError};
use connectify_common::ConnectifyError;
use thiserror::Error;

use crate::state::StateError;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("No calendar connected for user {0}")]
    NotConnected(String),
    #[error("Calendar authorization expired for user {0}, reconnect required")]
    ReauthRequired(String),
    #[error("Calendar provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<StateError> for SyncError {
    fn from(err: StateError) -> Self {
        SyncError::Validation(format!("invalid OAuth state: {}", err))
    }
}

impl From<SyncError> for ConnectifyError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Validation(message) => ConnectifyError::ValidationError(message),
            SyncError::NotConnected(_) | SyncError::ReauthRequired(_) => {
                ConnectifyError::AuthError(err.to_string())
            }
            SyncError::Provider(provider) => provider.into(),
            SyncError::NotFound(what) => ConnectifyError::NotFoundError(what),
            SyncError::Store(store) => store.into(),
        }
    }
}
