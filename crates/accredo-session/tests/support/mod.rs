#![allow(dead_code)]

use std::sync::Arc;

use accredo_core::{Session, TokenPair, UserProfile};
use accredo_session::{connect, ApiConfig, AuthenticatedClient, SessionStorage};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Unsigned JWT expiring `offset_secs` from now; `tag` keeps tokens distinct.
pub fn token(offset_secs: i64, tag: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + offset_secs;
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(format!(
            r#"{{"token_type":"access","exp":{exp},"jti":"{tag}","user_id":7}}"#
        ))
    )
}

pub fn user() -> UserProfile {
    UserProfile {
        id: "7".to_string(),
        slug: Some("ada-lovelace".to_string()),
        email: Some("a@b.com".to_string()),
        name: Some("Ada".to_string()),
        first_name: Some("Ada".to_string()),
        last_name: Some("Lovelace".to_string()),
    }
}

pub fn session(access_token: &str, refresh_token: &str) -> Session {
    Session::new(
        TokenPair {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
        },
        user(),
    )
}

pub fn me_body() -> String {
    serde_json::json!({
        "id": 7,
        "slug": "ada-lovelace",
        "email": "a@b.com",
        "name": "Ada",
        "first_name": "Ada",
        "last_name": "Lovelace"
    })
    .to_string()
}

pub async fn client_for(url: &str, storage: Arc<dyn SessionStorage>) -> AuthenticatedClient {
    let client = connect(ApiConfig::new(url), storage).expect("client");
    client.store().restore().await;
    client
}
