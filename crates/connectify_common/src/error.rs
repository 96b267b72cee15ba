use std::fmt;
use thiserror::Error;

use crate::services::{ProviderError, StoreError};

/// The base error type for all Connectify errors.
///
/// This enum provides a common set of error variants that can be used across all crates.
/// Each crate can extend this by implementing From<SpecificError> for ConnectifyError.
#[derive(Error, Debug)]
pub enum ConnectifyError {
    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The user has to connect or re-authorize the external calendar
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
///
/// This trait can be implemented by error types to provide a consistent way
/// to convert errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for ConnectifyError {
    fn status_code(&self) -> u16 {
        match self {
            ConnectifyError::ParseError(_) => 400,
            ConnectifyError::ConfigError(_) => 500,
            ConnectifyError::AuthError(_) => 401,
            ConnectifyError::ValidationError(_) => 400,
            ConnectifyError::DatabaseError(_) => 500,
            ConnectifyError::ExternalServiceError { .. } => 502,
            ConnectifyError::NotFoundError(_) => 404,
            ConnectifyError::TimeoutError(_) => 504,
            ConnectifyError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, ConnectifyError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, ConnectifyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, ConnectifyError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| ConnectifyError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, ConnectifyError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| ConnectifyError::InternalError(format!("{}: {}", f(), error)))
    }
}

// Common error conversions
impl From<serde_json::Error> for ConnectifyError {
    fn from(err: serde_json::Error) -> Self {
        ConnectifyError::ParseError(err.to_string())
    }
}

impl From<StoreError> for ConnectifyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ConnectifyError::NotFoundError(what),
            other => ConnectifyError::DatabaseError(other.to_string()),
        }
    }
}

impl From<ProviderError> for ConnectifyError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unauthorized(message) => ConnectifyError::AuthError(message),
            ProviderError::NotFound(what) => ConnectifyError::NotFoundError(what),
            ProviderError::Timeout(secs) => {
                ConnectifyError::TimeoutError(format!("calendar provider after {}s", secs))
            }
            other => external_service_error("calendar", other),
        }
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> ConnectifyError {
    ConnectifyError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> ConnectifyError {
    ConnectifyError::ValidationError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> ConnectifyError {
    ConnectifyError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
