use std::sync::Arc;
use std::time::Instant;

use accredo_core::AuthFailure;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::store::SessionStore;

/// One logical backend call, with its retry state carried alongside it.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    /// Explicit `Authorization` value; when set the session token is not attached.
    pub authorization: Option<String>,
    pub retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            authorization: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }
}

/// Shared request wrapper that keeps the session's access token attached and fresh.
#[derive(Clone)]
pub struct AuthenticatedClient {
    http: reqwest::Client,
    config: Arc<ApiConfig>,
    store: Arc<SessionStore>,
}

impl AuthenticatedClient {
    pub fn new(http: reqwest::Client, config: Arc<ApiConfig>, store: Arc<SessionStore>) -> Self {
        Self {
            http,
            config,
            store,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Sends `request`; a 401 triggers one forced refresh and at most one resend.
    pub async fn send(&self, mut request: ApiRequest) -> ClientResult<reqwest::Response> {
        let bearer = match request.authorization {
            Some(_) => None,
            None => self.session_token().await,
        };
        let response = self.attempt(&request, bearer.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED || request.retried {
            return Ok(response);
        }

        request.retried = true;
        info!(
            method = %request.method,
            path = %request.path,
            "http request unauthorized; forcing token refresh"
        );
        match self.store.force_refresh(bearer.as_deref()).await {
            Ok(token) => {
                request.authorization = None;
                self.attempt(&request, Some(&token)).await
            }
            Err(AuthFailure::RefreshFailed) => {
                warn!(path = %request.path, "token refresh failed; session invalidated");
                Ok(response)
            }
            Err(err) => {
                debug!(path = %request.path, error = %err, "no session to refresh");
                Ok(response)
            }
        }
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let response = ensure_success(self.send(request).await?).await?;
        decode_json_response(response).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.send_json(ApiRequest::get(path)).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send_json(ApiRequest::post(path).json(body)?).await
    }

    pub async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.send_json(ApiRequest::new(Method::PATCH, path).json(body)?)
            .await
    }

    /// Like `send`, but only checks the status; the body is discarded.
    pub async fn send_expect_success(&self, request: ApiRequest) -> ClientResult<()> {
        ensure_success(self.send(request).await?).await.map(|_| ())
    }

    async fn session_token(&self) -> Option<String> {
        match self.store.get_valid_access_token().await {
            Ok(token) => Some(token),
            Err(err) => {
                debug!(error = %err, "sending request without session token");
                None
            }
        }
    }

    async fn attempt(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> ClientResult<reqwest::Response> {
        let url = self.config.url(&request.path);
        let mut builder = self.http.request(request.method.clone(), &url);
        let authorization = match (&request.authorization, bearer) {
            (Some(explicit), _) => Some(explicit.clone()),
            (None, Some(token)) => Some(format!("Bearer {token}")),
            (None, None) => None,
        };
        if let Some(value) = authorization {
            let value = HeaderValue::from_str(&value)
                .map_err(|err| ClientError::InvalidRequest(err.to_string()))?;
            builder = builder.header(AUTHORIZATION, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        debug!(method = %request.method, url = %url, retried = request.retried, "http request");
        let start = Instant::now();
        let response = builder.send().await?;
        debug!(
            method = %request.method,
            url = %url,
            status = %response.status(),
            elapsed_ms = start.elapsed().as_millis(),
            "http response"
        );
        Ok(response)
    }
}

pub async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}

/// Decodes a JSON body; an empty body decodes as `null`.
pub async fn decode_json_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> ClientResult<T> {
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_str(&body)?)
}
