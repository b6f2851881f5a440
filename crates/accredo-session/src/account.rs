//! Public account endpoints: registration, activation and password reset.

use accredo_core::api::auth::{
    ActivationRequest, PasswordResetConfirmRequest, PasswordResetRequest, RegisterRequest,
};
use accredo_core::{endpoints, UserProfile};
use tracing::info;

use crate::error::ClientResult;
use crate::http::{ApiRequest, AuthenticatedClient};

fn users_path(client: &AuthenticatedClient, endpoint: &str) -> String {
    client.config().users_url(endpoint)
}

pub async fn register(
    client: &AuthenticatedClient,
    request: &RegisterRequest,
) -> ClientResult<UserProfile> {
    let url = users_path(client, endpoints::USERS);
    let user: UserProfile = client.post_json(&url, request).await?;
    info!(event = "account_registered", user_id = %user.id);
    Ok(user)
}

pub async fn activate(client: &AuthenticatedClient, uid: &str, token: &str) -> ClientResult<()> {
    let url = users_path(client, endpoints::USERS_ACTIVATION);
    let request = ApiRequest::post(url).json(&ActivationRequest {
        uid: uid.to_string(),
        token: token.to_string(),
    })?;
    client.send_expect_success(request).await?;
    info!(event = "account_activated");
    Ok(())
}

pub async fn request_password_reset(client: &AuthenticatedClient, email: &str) -> ClientResult<()> {
    let url = users_path(client, endpoints::USERS_RESET_PASSWORD);
    let request = ApiRequest::post(url).json(&PasswordResetRequest {
        email: email.trim().to_string(),
    })?;
    client.send_expect_success(request).await
}

pub async fn confirm_password_reset(
    client: &AuthenticatedClient,
    request: &PasswordResetConfirmRequest,
) -> ClientResult<()> {
    let url = users_path(client, endpoints::USERS_RESET_PASSWORD_CONFIRM);
    client
        .send_expect_success(ApiRequest::post(url).json(request)?)
        .await?;
    info!(event = "password_reset_confirmed");
    Ok(())
}
