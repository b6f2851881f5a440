#![allow(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod account;
pub mod backend;
pub mod config;
pub mod error;
pub mod exchange;
pub mod http;
pub mod refresh;
pub mod storage;
pub mod store;

use std::sync::Arc;

pub use backend::{AuthBackend, HttpAuthBackend};
pub use config::ApiConfig;
pub use error::{ClientError, ClientResult};
pub use exchange::{exchange_credentials, fetch_profile, SignIn};
pub use http::{ApiRequest, AuthenticatedClient};
pub use refresh::refresh_access_token;
pub use storage::{
    FileSessionStorage, KeyringSessionStorage, MemorySessionStorage, SessionStorage, StorageError,
};
pub use store::SessionStore;

/// Wires the store and the authenticated client onto one shared `reqwest::Client`.
pub fn connect(
    config: ApiConfig,
    storage: Arc<dyn SessionStorage>,
) -> ClientResult<AuthenticatedClient> {
    let http = config.build_http_client()?;
    let config = Arc::new(config);
    let backend = Arc::new(HttpAuthBackend::new(http.clone(), config.clone()));
    let store = Arc::new(SessionStore::new(backend, storage));
    Ok(AuthenticatedClient::new(http, config, store))
}
