use accredo_core::api::auth::{ApiErrorBody, LoginRequest, TokenPairResponse};
use accredo_core::{AuthFailure, TokenPair, UserProfile};
use reqwest::header::AUTHORIZATION;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;

/// Outcome of a successful credential exchange. Nothing is committed yet.
#[derive(Debug, Clone)]
pub struct SignIn {
    pub tokens: TokenPair,
    pub user: UserProfile,
}

/// Trades email and password for a token pair, then hydrates the user profile.
pub async fn exchange_credentials(
    client: &reqwest::Client,
    config: &ApiConfig,
    email: &str,
    password: &str,
) -> Result<SignIn, AuthFailure> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AuthFailure::MissingCredentials);
    }

    let payload = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    let response = client
        .post(config.login_url())
        .json(&payload)
        .send()
        .await
        .map_err(AuthFailure::network)?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        info!(event = "login_rejected", status = %status);
        return Err(AuthFailure::invalid_credentials(ApiErrorBody::detail_from(
            &body,
        )));
    }
    let pair: TokenPairResponse = response.json().await.map_err(|err| {
        warn!(event = "login_decode_failed", error = %err);
        AuthFailure::network(format!("unexpected login response: {err}"))
    })?;

    let user = fetch_profile(client, config, &pair.access).await?;
    debug!(event = "login_succeeded", user_id = %user.id);
    Ok(SignIn {
        tokens: TokenPair {
            access_token: pair.access,
            refresh_token: pair.refresh,
        },
        user,
    })
}

pub async fn fetch_profile(
    client: &reqwest::Client,
    config: &ApiConfig,
    access_token: &str,
) -> Result<UserProfile, AuthFailure> {
    let profile_failed = |message: String| AuthFailure::ProfileFetchFailed { message };
    let response = client
        .get(config.me_url())
        .header(AUTHORIZATION, format!("Bearer {access_token}"))
        .send()
        .await
        .map_err(|err| profile_failed(err.to_string()))?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(event = "profile_fetch_failed", status = %status);
        return Err(profile_failed(format!("{status} {body}")));
    }
    response
        .json::<UserProfile>()
        .await
        .map_err(|err| profile_failed(err.to_string()))
}
