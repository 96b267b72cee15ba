// --- File: crates/connectify_common/src/http/client.rs ---
use reqwest::{Client, Error as ReqwestError, Response};
use std::time::Duration;

/// Default timeout for outbound HTTP requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Creates an HTTP client for calls to external services.
///
/// Redirects are not followed: token endpoints answer directly and a redirect
/// there indicates a misconfigured URL.
pub fn create_client(timeout_secs: u64) -> Result<Client, ReqwestError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// POSTs an `application/x-www-form-urlencoded` body.
pub async fn post_form<T: serde::Serialize + ?Sized>(
    client: &Client,
    url: &str,
    form: &T,
) -> Result<Response, ReqwestError> {
    client.post(url).form(form).send().await
}
