// File: crates/connectify_gcal/src/auth.rs
//! OAuth against Google's endpoints and construction of per-token hubs.

use connectify_common::http::client::{create_client, post_form};
use connectify_common::services::{BoxFuture, OAuthProvider, OAuthTokens, ProviderError};
use connectify_config::GcalConfig;
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    CalendarHub,
};
use serde::Deserialize;
use std::error::Error;
use tracing::debug;

// Type aliases for clarity
pub type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

pub const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// TLS connector shared by every hub.
pub fn create_connector() -> Result<Connector, Box<dyn Error + Send + Sync>> {
    let https = HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .build();
    Ok(https)
}

/// A hub that authenticates every request with `access_token`.
///
/// Hubs are cheap; one is built per provider call so no token outlives the
/// request that supplied it.
pub fn hub_for_token(connector: &Connector, access_token: &str) -> HubType {
    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(connector.clone());
    CalendarHub::new(client, access_token.to_string())
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenError {
    error: String,
    error_description: Option<String>,
}

/// Google's OAuth 2.0 web-server flow.
pub struct GoogleOAuthClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
    http: reqwest::Client,
}

impl GoogleOAuthClient {
    pub fn new(config: &GcalConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
            http: create_client(config.request_timeout_secs)?,
        })
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<OAuthTokens, ProviderError> {
        let response = post_form(&self.http, TOKEN_ENDPOINT, form)
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_token_error(status.as_u16(), &body));
        }

        let tokens: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Api(format!("Failed to parse token response: {}", e)))?;
        debug!(
            "Token endpoint returned access token (refresh token: {})",
            tokens.refresh_token.is_some()
        );

        Ok(OAuthTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            scope: tokens.scope,
        })
    }
}

/// Google answers a revoked or expired grant with 400 `invalid_grant`.
pub fn classify_token_error(status: u16, body: &str) -> ProviderError {
    let parsed: Option<GoogleTokenError> = serde_json::from_str(body).ok();
    let message = match &parsed {
        Some(err) => match &err.error_description {
            Some(description) => format!("{}: {}", err.error, description),
            None => err.error.clone(),
        },
        None => format!("token endpoint returned {}", status),
    };
    let rejected_grant = parsed
        .as_ref()
        .is_some_and(|err| err.error == "invalid_grant" || err.error == "unauthorized_client");

    if status == 401 || rejected_grant {
        ProviderError::Unauthorized(message)
    } else {
        ProviderError::Api(message)
    }
}

impl OAuthProvider for GoogleOAuthClient {
    fn authorization_url(&self, state: &str) -> String {
        let scope = self.scopes.join(" ");
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("include_granted_scopes", "true"),
            ("state", state),
        ];
        let query = serde_urlencoded::to_string(&params[..]).unwrap_or_default();
        format!("{}?{}", AUTHORIZATION_ENDPOINT, query)
    }

    fn exchange_code(&self, code: &str) -> BoxFuture<'_, OAuthTokens, ProviderError> {
        let code = code.to_string();
        Box::pin(async move {
            self.token_request(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .await
        })
    }

    fn refresh_access_token(&self, refresh_token: &str) -> BoxFuture<'_, OAuthTokens, ProviderError> {
        let refresh_token = refresh_token.to_string();
        Box::pin(async move {
            self.token_request(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .await
        })
    }
}
