use accredo_core::api::auth::{RefreshRequest, RefreshResponse};
use accredo_core::AuthFailure;
use tracing::{debug, warn};

use crate::config::ApiConfig;

/// Exchanges a refresh token for a new access token.
///
/// Every failure, rejected token or transport error alike, is reported as
/// [`AuthFailure::RefreshFailed`]. No retries happen here.
pub async fn refresh_access_token(
    client: &reqwest::Client,
    config: &ApiConfig,
    refresh_token: &str,
) -> Result<String, AuthFailure> {
    let payload = RefreshRequest {
        refresh: refresh_token.to_string(),
    };
    let response = match client.post(config.refresh_url()).json(&payload).send().await {
        Ok(response) => response,
        Err(err) => {
            warn!(event = "refresh_failed", reason = "transport", error = %err);
            return Err(AuthFailure::RefreshFailed);
        }
    };
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(event = "refresh_failed", reason = "rejected", status = %status, body = %body);
        return Err(AuthFailure::RefreshFailed);
    }
    match response.json::<RefreshResponse>().await {
        Ok(refreshed) => {
            debug!(event = "refresh_succeeded");
            Ok(refreshed.access)
        }
        Err(err) => {
            warn!(event = "refresh_failed", reason = "decode", error = %err);
            Err(AuthFailure::RefreshFailed)
        }
    }
}
