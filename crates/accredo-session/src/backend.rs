use std::sync::Arc;

use accredo_core::AuthFailure;
use async_trait::async_trait;

use crate::config::ApiConfig;
use crate::exchange::{exchange_credentials, SignIn};
use crate::refresh::refresh_access_token;

/// Backend calls the session store depends on.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn exchange(&self, email: &str, password: &str) -> Result<SignIn, AuthFailure>;
    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthFailure>;
}

pub struct HttpAuthBackend {
    client: reqwest::Client,
    config: Arc<ApiConfig>,
}

impl HttpAuthBackend {
    pub fn new(client: reqwest::Client, config: Arc<ApiConfig>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn exchange(&self, email: &str, password: &str) -> Result<SignIn, AuthFailure> {
        exchange_credentials(&self.client, &self.config, email, password).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthFailure> {
        refresh_access_token(&self.client, &self.config, refresh_token).await
    }
}
