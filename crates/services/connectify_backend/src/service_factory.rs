// --- File: crates/services/connectify_backend/src/service_factory.rs ---
//! Builds the stores and the calendar synchronizer from configuration.

use connectify_common::services::{CredentialStore, MeetingStore};
use connectify_common::ConnectifyError;
use connectify_config::AppConfig;
use std::sync::Arc;
#[allow(unused_imports)] // some are only used by certain features
use {
    connectify_common::config_error,
    connectify_common::memory::{InMemoryCredentialStore, InMemoryMeetingStore},
    tracing::{info, warn},
};

#[cfg(feature = "gcal")]
use {
    connectify_gcal::auth::{create_connector, GoogleOAuthClient},
    connectify_gcal::logic::parse_time_zone,
    connectify_gcal::service::GoogleCalendarProvider,
    connectify_gcal::state::StateSigner,
    connectify_gcal::CalendarSynchronizer,
    std::time::Duration,
};

#[cfg(feature = "database")]
use connectify_db::{DbClient, SqlCredentialRepository, SqlMeetingRepository};

/// Everything the feature routers need, built once per process.
pub struct ConnectifyServiceFactory {
    meeting_store: Arc<dyn MeetingStore>,
    #[cfg(feature = "gcal")]
    synchronizer: Option<Arc<CalendarSynchronizer>>,
}

impl ConnectifyServiceFactory {
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, ConnectifyError> {
        let (meeting_store, credential_store) = build_stores(&config).await?;

        #[cfg(feature = "gcal")]
        let synchronizer = build_synchronizer(&config, &meeting_store, &credential_store)?;
        // Credentials are only read by the calendar synchronizer.
        #[cfg(not(feature = "gcal"))]
        drop(credential_store);

        Ok(Self {
            meeting_store,
            #[cfg(feature = "gcal")]
            synchronizer,
        })
    }

    pub fn meeting_store(&self) -> Arc<dyn MeetingStore> {
        self.meeting_store.clone()
    }

    #[cfg(feature = "gcal")]
    pub fn calendar_synchronizer(&self) -> Option<Arc<CalendarSynchronizer>> {
        self.synchronizer.clone()
    }
}

type Stores = (Arc<dyn MeetingStore>, Arc<dyn CredentialStore>);

async fn build_stores(config: &AppConfig) -> Result<Stores, ConnectifyError> {
    #[cfg(feature = "database")]
    if let Some(database) = config.database.as_ref() {
        info!("Using SQL storage");
        let client = DbClient::from_config(database).await.map_err(config_error)?;
        let meetings = SqlMeetingRepository::new(client.clone());
        let credentials = SqlCredentialRepository::new(client);
        meetings.init_schema().await.map_err(config_error)?;
        credentials.init_schema().await.map_err(config_error)?;
        return Ok((Arc::new(meetings), Arc::new(credentials)));
    }

    #[cfg(not(feature = "database"))]
    if config.database.is_some() {
        warn!("Database configured but the 'database' feature is disabled; using memory");
    }

    info!("Using in-memory storage; data is lost on restart");
    Ok((
        Arc::new(InMemoryMeetingStore::new()),
        Arc::new(InMemoryCredentialStore::new()),
    ))
}

#[cfg(feature = "gcal")]
fn build_synchronizer(
    config: &AppConfig,
    meetings: &Arc<dyn MeetingStore>,
    credentials: &Arc<dyn CredentialStore>,
) -> Result<Option<Arc<CalendarSynchronizer>>, ConnectifyError> {
    if !config.use_gcal {
        return Ok(None);
    }
    let Some(gcal) = config.gcal.as_ref() else {
        warn!("use_gcal is set but the gcal section is missing; calendar sync disabled");
        return Ok(None);
    };
    if gcal.state_secret.is_empty() {
        return Err(config_error("gcal.state_secret must be set"));
    }

    info!("Initializing Google Calendar synchronizer...");
    let time_zone = parse_time_zone(&config.scheduling.time_zone).map_err(config_error)?;
    let connector = create_connector().map_err(config_error)?;
    let provider = GoogleCalendarProvider::new(connector, gcal.calendar_id.clone(), time_zone);
    let oauth = GoogleOAuthClient::new(gcal).map_err(config_error)?;

    let synchronizer = CalendarSynchronizer::new(
        meetings.clone(),
        credentials.clone(),
        Arc::new(provider),
        Arc::new(oauth),
        StateSigner::new(&gcal.state_secret, gcal.state_ttl_secs),
    )
    .with_time_zone(time_zone)
    .with_call_timeout(Duration::from_secs(gcal.request_timeout_secs));

    Ok(Some(Arc::new(synchronizer)))
}
