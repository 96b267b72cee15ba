// File: crates/connectify_gcal/src/state.rs
//! Signed OAuth `state` values.
//!
//! A state is `base64url(json{uid, iat}) + "." + hex(hmac_sha256(payload))`.
//! It binds the consent redirect to the user who started it and expires
//! after the configured lifetime.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Tolerated clock skew for states issued "in the future".
const MAX_CLOCK_SKEW_SECS: i64 = 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("State token is malformed")]
    Malformed,
    #[error("State token signature mismatch")]
    BadSignature,
    #[error("State token expired")]
    Expired,
    #[error("State secret is not usable: {0}")]
    InvalidSecret(String),
}

#[derive(Serialize, Deserialize)]
struct StatePayload {
    uid: String,
    iat: i64,
}

#[derive(Clone)]
pub struct StateSigner {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl StateSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl_secs,
        }
    }

    fn mac(&self) -> Result<HmacSha256, StateError> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| StateError::InvalidSecret(e.to_string()))
    }

    pub fn sign(&self, user_id: &str) -> Result<String, StateError> {
        self.sign_at(user_id, Utc::now().timestamp())
    }

    pub fn sign_at(&self, user_id: &str, issued_at: i64) -> Result<String, StateError> {
        let payload = serde_json::to_vec(&StatePayload {
            uid: user_id.to_string(),
            iat: issued_at,
        })
        .map_err(|_| StateError::Malformed)?;
        let encoded = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(format!("{}.{}", encoded, signature))
    }

    /// Returns the user id carried by a valid, unexpired state.
    pub fn verify(&self, token: &str) -> Result<String, StateError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Result<String, StateError> {
        let (encoded, signature_hex) = token.split_once('.').ok_or(StateError::Malformed)?;
        let signature = hex::decode(signature_hex).map_err(|_| StateError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| StateError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| StateError::Malformed)?;
        let payload: StatePayload =
            serde_json::from_slice(&payload).map_err(|_| StateError::Malformed)?;

        if payload.iat > now + MAX_CLOCK_SKEW_SECS || now - payload.iat > self.ttl_secs {
            return Err(StateError::Expired);
        }
        if payload.uid.is_empty() {
            return Err(StateError::Malformed);
        }
        Ok(payload.uid)
    }
}
