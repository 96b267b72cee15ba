// --- File: crates/connectify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g., sqlite:data/connectify.db, loaded via CONNECTIFY__DATABASE__URL
}

// --- Scheduling Config ---
// Working hours are whole hours in the single process-wide time zone.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SchedulingConfig {
    pub work_start_hour: u32,
    pub work_end_hour: u32,
    pub slot_granularity_minutes: u32,
    pub default_duration_minutes: u32,
    pub default_slot_count: usize,
    /// IANA zone name, used when meetings are turned into provider timestamps.
    pub time_zone: String,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            work_start_hour: 9,
            work_end_hour: 18,
            slot_granularity_minutes: 30,
            default_duration_minutes: 60,
            default_slot_count: 5,
            time_zone: "UTC".to_string(),
        }
    }
}

// --- Google Calendar Config ---
// Secrets are expected from the environment:
// CONNECTIFY__GCAL__CLIENT_SECRET, CONNECTIFY__GCAL__STATE_SECRET
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    pub client_id: String,       // Mandatory
    pub client_secret: String,   // Mandatory
    pub redirect_uri: String,    // Mandatory
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub state_secret: String, // Mandatory, signs the OAuth state parameter
    #[serde(default = "default_state_ttl_secs")]
    pub state_ttl_secs: i64,
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        "https://www.googleapis.com/auth/calendar".to_string(),
        "https://www.googleapis.com/auth/calendar.events".to_string(),
    ]
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_state_ttl_secs() -> i64 {
    600
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>, // Without it the backend keeps meetings in memory
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
}
