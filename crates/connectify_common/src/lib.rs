// --- File: crates/connectify_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod memory; // In-process stores
pub mod models; // Meetings, participants, credentials
pub mod services; // Store and provider abstractions
pub mod validation; // Request boundary checks

// Re-export error types and utilities for easier access
pub use error::{
    config_error, external_service_error, validation_error, ConnectifyError, Context,
    HttpStatusCode,
};

// Re-export HTTP utilities for easier access
pub use http::client::{create_client, post_form};

pub use logging::{init, init_with_level};

pub use memory::{InMemoryCredentialStore, InMemoryMeetingStore};
pub use models::{
    CredentialRecord, CredentialSource, ExternalLink, Meeting, MeetingStatus, Participant,
    RecurrenceRule, RsvpStatus,
};
pub use services::{
    BoxFuture, CalendarProvider, CreatedExternalEvent, CredentialStore, ExternalAttendee,
    ExternalEvent, ExternalEventDraft, MeetingStore, OAuthProvider, OAuthTokens, ProviderError,
    StoreError,
};
