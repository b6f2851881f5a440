use std::sync::Arc;

use accredo_core::{
    is_expired, AuthError, AuthFailure, ProfileUpdate, Session, SessionStatus, UserProfile,
};
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::backend::AuthBackend;
use crate::storage::SessionStorage;

#[derive(Debug, Clone)]
enum SessionState {
    Unauthenticated,
    Loading,
    Authenticated(Session),
    /// Kept for messaging only; its tokens are never handed out.
    Invalid(Session),
}

impl SessionState {
    fn status(&self) -> SessionStatus {
        match self {
            SessionState::Unauthenticated => SessionStatus::Unauthenticated,
            SessionState::Loading => SessionStatus::Loading,
            SessionState::Authenticated(_) => SessionStatus::Authenticated,
            SessionState::Invalid(_) => SessionStatus::Invalid,
        }
    }
}

/// Sole owner of the session. Every read and write goes through here.
pub struct SessionStore {
    state: RwLock<SessionState>,
    refresh_gate: Mutex<()>,
    backend: Arc<dyn AuthBackend>,
    storage: Arc<dyn SessionStorage>,
    status_tx: watch::Sender<SessionStatus>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn AuthBackend>, storage: Arc<dyn SessionStorage>) -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::Unauthenticated);
        Self {
            state: RwLock::new(SessionState::Unauthenticated),
            refresh_gate: Mutex::new(()),
            backend,
            storage,
            status_tx,
        }
    }

    /// Loads the persisted session once. Memory is authoritative afterwards.
    pub async fn restore(&self) -> SessionStatus {
        let mut state = self.state.write().await;
        if !matches!(*state, SessionState::Unauthenticated) {
            return state.status();
        }
        self.transition(&mut state, SessionState::Loading);
        let next = match self.storage.load() {
            Ok(Some(session)) if session.error.is_none() => {
                debug!(event = "session_restored", user_id = %session.user.id);
                SessionState::Authenticated(session)
            }
            Ok(Some(_)) => {
                self.clear_storage();
                SessionState::Unauthenticated
            }
            Ok(None) => SessionState::Unauthenticated,
            Err(err) => {
                warn!(event = "session_restore_failed", error = %err);
                SessionState::Unauthenticated
            }
        };
        self.transition(&mut state, next);
        state.status()
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.read().await.status()
    }

    /// Receives every status change, e.g. to react to a forced sign-out.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    pub async fn snapshot(&self) -> Option<Session> {
        match &*self.state.read().await {
            SessionState::Authenticated(session) | SessionState::Invalid(session) => {
                Some(session.clone())
            }
            SessionState::Unauthenticated | SessionState::Loading => None,
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile, AuthFailure> {
        {
            let mut state = self.state.write().await;
            if matches!(*state, SessionState::Loading) {
                return Err(AuthFailure::SignInInProgress);
            }
            if !matches!(*state, SessionState::Unauthenticated) {
                self.clear_storage();
            }
            self.transition(&mut state, SessionState::Loading);
        }

        let result = self.backend.exchange(email, password).await;

        let mut state = self.state.write().await;
        match result {
            Ok(sign_in) => {
                let session = Session::new(sign_in.tokens, sign_in.user);
                self.persist(&session);
                let user = session.user.clone();
                info!(event = "signed_in", user_id = %user.id);
                self.transition(&mut state, SessionState::Authenticated(session));
                Ok(user)
            }
            Err(err) => {
                info!(event = "sign_in_failed", error = %err);
                self.transition(&mut state, SessionState::Unauthenticated);
                Err(err)
            }
        }
    }

    pub async fn sign_out(&self) {
        let mut state = self.state.write().await;
        self.clear_storage();
        self.transition(&mut state, SessionState::Unauthenticated);
        info!(event = "signed_out");
    }

    /// Returns a usable access token, refreshing it first if it has expired.
    pub async fn get_valid_access_token(&self) -> Result<String, AuthFailure> {
        let stale = {
            let state = self.state.read().await;
            let session = usable_session(&state)?;
            if !is_expired(&session.access_token) {
                return Ok(session.access_token.clone());
            }
            session.access_token.clone()
        };
        self.refresh_coalesced(Some(&stale)).await
    }

    /// Refreshes regardless of the embedded expiry, after the backend rejected `rejected`.
    pub async fn force_refresh(&self, rejected: Option<&str>) -> Result<String, AuthFailure> {
        self.refresh_coalesced(rejected).await
    }

    /// Merges identity fields into the current session without touching tokens.
    pub async fn update_profile_fields(
        &self,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, AuthFailure> {
        let mut state = self.state.write().await;
        let session = match &mut *state {
            SessionState::Authenticated(session) => session,
            other => return Err(unusable(other)),
        };
        session.user.apply(update);
        let snapshot = session.clone();
        self.persist(&snapshot);
        Ok(snapshot.user)
    }

    /// `stale` is the access token the caller found unusable. Once another
    /// caller has replaced it, the replacement is returned without a new refresh.
    async fn refresh_coalesced(&self, stale: Option<&str>) -> Result<String, AuthFailure> {
        let _gate = self.refresh_gate.lock().await;

        let (refresh_token, current) = {
            let state = self.state.read().await;
            let session = usable_session(&state)?;
            (session.refresh_token.clone(), session.access_token.clone())
        };

        if stale.is_some_and(|stale| stale != current) {
            debug!(event = "refresh_coalesced");
            return Ok(current);
        }

        let result = self.backend.refresh(&refresh_token).await;

        let mut state = self.state.write().await;
        let session = match &mut *state {
            SessionState::Authenticated(session) => session,
            other => return Err(unusable(other)),
        };
        if session.refresh_token != refresh_token {
            // Signed out and back in while the refresh was in flight.
            return Ok(session.access_token.clone());
        }
        match result {
            Ok(access_token) => {
                session.access_token = access_token.clone();
                let snapshot = session.clone();
                self.persist(&snapshot);
                info!(event = "access_token_refreshed", user_id = %snapshot.user.id);
                Ok(access_token)
            }
            Err(_) => {
                self.invalidate_locked(&mut state);
                Err(AuthFailure::RefreshFailed)
            }
        }
    }

    /// Marks the session unusable and drops the persisted copy.
    fn invalidate_locked(&self, state: &mut SessionState) {
        let SessionState::Authenticated(session) = state else {
            return;
        };
        let mut session = session.clone();
        session.error = Some(AuthError::RefreshFailed);
        self.clear_storage();
        warn!(event = "session_invalidated", user_id = %session.user.id);
        self.transition(state, SessionState::Invalid(session));
    }

    fn transition(&self, state: &mut SessionState, next: SessionState) {
        *state = next;
        self.status_tx.send_replace(state.status());
    }

    fn persist(&self, session: &Session) {
        if let Err(err) = self.storage.save(session) {
            warn!(event = "session_persist_failed", error = %err);
        }
    }

    fn clear_storage(&self) {
        if let Err(err) = self.storage.clear() {
            warn!(event = "session_clear_failed", error = %err);
        }
    }
}

fn usable_session(state: &SessionState) -> Result<&Session, AuthFailure> {
    match state {
        SessionState::Authenticated(session) => Ok(session),
        other => Err(unusable(other)),
    }
}

fn unusable(state: &SessionState) -> AuthFailure {
    match state {
        SessionState::Invalid(_) => AuthFailure::RefreshFailed,
        _ => AuthFailure::NotAuthenticated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::SignIn;
    use crate::storage::MemorySessionStorage;
    use accredo_core::TokenPair;
    use async_trait::async_trait;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn token(exp_offset: i64, tag: &str) -> String {
        let exp = chrono::Utc::now().timestamp() + exp_offset;
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#),
            URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp},"jti":"{tag}"}}"#))
        )
    }

    fn user() -> UserProfile {
        UserProfile {
            id: "1".to_string(),
            slug: None,
            email: Some("a@b.com".to_string()),
            name: Some("Ada".to_string()),
            first_name: None,
            last_name: None,
        }
    }

    fn session(access_token: String) -> Session {
        Session::new(
            TokenPair {
                access_token,
                refresh_token: "refresh-1".to_string(),
            },
            user(),
        )
    }

    struct FakeBackend {
        refreshes: AtomicUsize,
        exchanges: AtomicUsize,
        refreshed_token: Option<String>,
        delay: Duration,
    }

    impl FakeBackend {
        fn refreshing_to(token: Option<String>) -> Self {
            Self {
                refreshes: AtomicUsize::new(0),
                exchanges: AtomicUsize::new(0),
                refreshed_token: token,
                delay: Duration::from_millis(50),
            }
        }
    }

    #[async_trait]
    impl AuthBackend for FakeBackend {
        async fn exchange(&self, email: &str, password: &str) -> Result<SignIn, AuthFailure> {
            self.exchanges.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if email.is_empty() || password.is_empty() {
                return Err(AuthFailure::MissingCredentials);
            }
            if password != "secret" {
                return Err(AuthFailure::invalid_credentials(None));
            }
            Ok(SignIn {
                tokens: TokenPair {
                    access_token: token(300, "login"),
                    refresh_token: "refresh-login".to_string(),
                },
                user: user(),
            })
        }

        async fn refresh(&self, refresh_token: &str) -> Result<String, AuthFailure> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            assert!(!refresh_token.is_empty());
            self.refreshed_token
                .clone()
                .ok_or(AuthFailure::RefreshFailed)
        }
    }

    async fn store_with(
        backend: Arc<FakeBackend>,
        initial: Option<Session>,
    ) -> (Arc<SessionStore>, Arc<MemorySessionStorage>) {
        let storage = Arc::new(match initial {
            Some(session) => MemorySessionStorage::with_session(session),
            None => MemorySessionStorage::new(),
        });
        let store = Arc::new(SessionStore::new(backend, storage.clone()));
        store.restore().await;
        (store, storage)
    }

    #[tokio::test]
    async fn starts_unauthenticated_without_network() {
        let backend = Arc::new(FakeBackend::refreshing_to(None));
        let (store, _) = store_with(backend.clone(), None).await;
        assert_eq!(store.status().await, SessionStatus::Unauthenticated);
        assert_eq!(
            store.get_valid_access_token().await,
            Err(AuthFailure::NotAuthenticated)
        );
        assert_eq!(backend.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sign_in_then_read_returns_login_token_without_refresh() {
        let backend = Arc::new(FakeBackend::refreshing_to(None));
        let (store, storage) = store_with(backend.clone(), None).await;
        let user = store.sign_in("a@b.com", "secret").await.expect("sign in");
        assert_eq!(user.id, "1");
        let persisted = storage.load().expect("load").expect("persisted");
        let token = store.get_valid_access_token().await.expect("token");
        assert_eq!(token, persisted.access_token);
        assert_eq!(backend.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_sign_in_stays_unauthenticated() {
        let backend = Arc::new(FakeBackend::refreshing_to(None));
        let (store, storage) = store_with(backend, None).await;
        let err = store.sign_in("a@b.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthFailure::InvalidCredentials { .. }));
        assert_eq!(store.status().await, SessionStatus::Unauthenticated);
        assert!(storage.load().expect("load").is_none());
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_refresh() {
        let fresh = token(300, "fresh");
        let backend = Arc::new(FakeBackend::refreshing_to(Some(fresh.clone())));
        let (store, storage) = store_with(backend.clone(), Some(session(token(-600, "old")))).await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.get_valid_access_token().await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.expect("join"), Ok(fresh.clone()));
        }

        assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);
        let persisted = storage.load().expect("load").expect("persisted");
        assert_eq!(persisted.access_token, fresh);
        assert_eq!(persisted.refresh_token, "refresh-1");
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_refresh_when_new_token_has_no_expiry() {
        let backend = Arc::new(FakeBackend::refreshing_to(Some("opaque-access".to_string())));
        let (store, _) = store_with(backend.clone(), Some(session(token(-600, "old")))).await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.get_valid_access_token().await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.expect("join"), Ok("opaque-access".to_string()));
        }

        assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_sign_in_while_first_in_flight_is_rejected() {
        let backend = Arc::new(FakeBackend::refreshing_to(None));
        let (store, _) = store_with(backend.clone(), None).await;

        let first = {
            let store = store.clone();
            tokio::spawn(async move { store.sign_in("a@b.com", "secret").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(store.status().await, SessionStatus::Loading);
        assert_eq!(
            store.sign_in("a@b.com", "secret").await,
            Err(AuthFailure::SignInInProgress)
        );

        first.await.expect("join").expect("first sign in");
        assert_eq!(store.status().await, SessionStatus::Authenticated);
        assert_eq!(backend.exchanges.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_reads_fail_identically_on_refresh_failure() {
        let backend = Arc::new(FakeBackend::refreshing_to(None));
        let (store, storage) = store_with(backend.clone(), Some(session(token(-600, "old")))).await;
        let mut status = store.subscribe();

        let tasks: Vec<_> = (0..5)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.get_valid_access_token().await })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.expect("join"), Err(AuthFailure::RefreshFailed));
        }

        assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(store.status().await, SessionStatus::Invalid);
        assert_eq!(*status.borrow_and_update(), SessionStatus::Invalid);
        assert!(storage.load().expect("load").is_none());
        let snapshot = store.snapshot().await.expect("snapshot");
        assert_eq!(snapshot.error, Some(AuthError::RefreshFailed));
        assert_eq!(snapshot.usable_access_token(), None);
    }

    #[tokio::test]
    async fn invalid_session_needs_new_sign_in() {
        let backend = Arc::new(FakeBackend::refreshing_to(None));
        let (store, _) = store_with(backend.clone(), Some(session(token(-600, "old")))).await;
        assert!(store.get_valid_access_token().await.is_err());
        assert_eq!(
            store.get_valid_access_token().await,
            Err(AuthFailure::RefreshFailed)
        );
        assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);

        store.sign_in("a@b.com", "secret").await.expect("sign in");
        assert_eq!(store.status().await, SessionStatus::Authenticated);
        assert!(store.get_valid_access_token().await.is_ok());
    }

    #[tokio::test]
    async fn force_refresh_skips_when_token_already_replaced() {
        let fresh = token(300, "fresh");
        let backend = Arc::new(FakeBackend::refreshing_to(Some(fresh.clone())));
        let current = token(300, "current");
        let (store, _) = store_with(backend.clone(), Some(session(current.clone()))).await;

        let refreshed = store.force_refresh(Some(&current)).await.expect("refresh");
        assert_eq!(refreshed, fresh);
        let again = store.force_refresh(Some(&current)).await.expect("reuse");
        assert_eq!(again, fresh);
        assert_eq!(backend.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn profile_update_keeps_tokens() {
        let backend = Arc::new(FakeBackend::refreshing_to(None));
        let access = token(300, "a");
        let (store, storage) = store_with(backend, Some(session(access.clone()))).await;
        let user = store
            .update_profile_fields(&ProfileUpdate {
                first_name: Some("Augusta".to_string()),
                ..ProfileUpdate::default()
            })
            .await
            .expect("update");
        assert_eq!(user.first_name.as_deref(), Some("Augusta"));
        assert_eq!(user.name.as_deref(), Some("Ada"));
        let persisted = storage.load().expect("load").expect("persisted");
        assert_eq!(persisted.access_token, access);
        assert_eq!(persisted.user.first_name.as_deref(), Some("Augusta"));
    }

    #[tokio::test]
    async fn sign_out_clears_everything() {
        let backend = Arc::new(FakeBackend::refreshing_to(None));
        let (store, storage) = store_with(backend, Some(session(token(300, "a")))).await;
        assert_eq!(store.status().await, SessionStatus::Authenticated);
        store.sign_out().await;
        assert_eq!(store.status().await, SessionStatus::Unauthenticated);
        assert!(store.snapshot().await.is_none());
        assert!(storage.load().expect("load").is_none());
        assert_eq!(
            store
                .update_profile_fields(&ProfileUpdate::default())
                .await
                .unwrap_err(),
            AuthFailure::NotAuthenticated
        );
    }
}
