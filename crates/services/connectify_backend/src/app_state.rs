// --- File: crates/services/connectify_backend/src/app_state.rs ---
use axum::Router;
use connectify_common::ConnectifyError;
use connectify_config::AppConfig;
use connectify_scheduling::{routes as scheduling_routes, SchedulingService, SchedulingState};
use std::sync::Arc;

use crate::service_factory::ConnectifyServiceFactory;

#[cfg(feature = "gcal")]
use connectify_gcal::{routes as gcal_routes, GcalState};

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub scheduling: Arc<SchedulingState>,
    /// Present when calendar sync is enabled and configured.
    #[cfg(feature = "gcal")]
    pub gcal: Option<Arc<GcalState>>,
}

impl AppState {
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, ConnectifyError> {
        let factory = ConnectifyServiceFactory::new(config.clone()).await?;

        let service = SchedulingService::new(factory.meeting_store(), config.scheduling.clone());
        let scheduling = Arc::new(SchedulingState { service });

        #[cfg(feature = "gcal")]
        let gcal = factory
            .calendar_synchronizer()
            .map(|synchronizer| Arc::new(GcalState { synchronizer }));

        Ok(Self {
            config,
            scheduling,
            #[cfg(feature = "gcal")]
            gcal,
        })
    }

    /// Routes of every enabled feature, relative to `/api`.
    pub fn api_router(&self) -> Router {
        #[allow(unused_mut)] // for the features it needs to be mutable
        let mut router = scheduling_routes::routes(self.scheduling.clone());

        #[cfg(feature = "gcal")]
        if let Some(gcal) = self.gcal.clone() {
            router = router.merge(gcal_routes::routes(gcal));
        }

        router
    }
}
