//! Reads the claims embedded in an access token.
//!
//! Signatures are not verified here. The expiry claim is only used to decide
//! when to refresh; the backend validates every token it receives.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decodes the payload segment of a JWT. `None` for anything that is not one.
#[must_use]
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut segments = token.trim().split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() || payload.is_empty() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[must_use]
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let exp = decode_claims(token)?.exp?;
    Utc.timestamp_opt(exp, 0).single()
}

#[must_use]
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

/// Unreadable tokens and tokens without `exp` count as expired.
#[must_use]
pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token).and_then(|claims| claims.exp) {
        Some(exp) => exp <= now.timestamp(),
        None => true,
    }
}
