// File: services/connectify_backend/src/main.rs
use axum::{routing::get, Router};
use connectify_common::{config_error, ConnectifyError, Context};
use connectify_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

mod app_state;
mod service_factory;

use app_state::AppState;

#[tokio::main]
async fn main() {
    connectify_common::logging::init();

    if let Err(err) = run().await {
        error!("Connectify backend stopped: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ConnectifyError> {
    let config = Arc::new(load_config().map_err(config_error)?);
    let state = AppState::new(config.clone()).await?;

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to Connectify-Rs API!" }))
        .merge(state.api_router());

    #[allow(unused_mut)] // for the features it needs to be mutable
    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        #[cfg(feature = "gcal")]
        use connectify_gcal::doc::GcalApiDoc;
        use connectify_scheduling::doc::SchedulingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Connectify API",
                version = "0.1.0",
                description = "Meeting scheduling and calendar sync",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(SchedulingApiDoc::openapi());
        #[cfg(feature = "gcal")]
        openapi_doc.merge(GcalApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Server error")?;
    Ok(())
}
