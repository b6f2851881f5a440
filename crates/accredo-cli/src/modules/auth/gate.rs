use std::future::Future;

use accredo_core::SessionStatus;
use accredo_session::{ClientResult, SessionStore};

pub(crate) const SESSION_EXPIRED_MESSAGE: &str =
    "Your session has expired. Please sign in again.";
pub(crate) const NOT_SIGNED_IN_MESSAGE: &str = "Not signed in. Run `accredo login`.";

pub(crate) async fn require_session(store: &SessionStore) -> anyhow::Result<()> {
    match store.status().await {
        SessionStatus::Authenticated => Ok(()),
        SessionStatus::Invalid => anyhow::bail!(SESSION_EXPIRED_MESSAGE),
        SessionStatus::Unauthenticated | SessionStatus::Loading => {
            anyhow::bail!(NOT_SIGNED_IN_MESSAGE)
        }
    }
}

/// Runs `action` only with a live session and drops its output if the
/// session was invalidated while it ran.
pub(crate) async fn run_protected<T, F>(store: &SessionStore, action: F) -> anyhow::Result<T>
where
    F: Future<Output = ClientResult<T>>,
{
    require_session(store).await?;
    let result = action.await;
    require_session(store).await?;
    Ok(result?)
}
