//! services/client/src/session.rs
//!
//! The process-wide session store: exchanges credentials for a token, keeps
//! the (token, user id) pair in memory, and persists it across restarts.
//!
//! There is exactly one logical session per process. It is shared by handing
//! an `Arc<SessionStore>` to every consumer; state changes are synchronously
//! visible to all of them through the interior lock.

use crate::error::ClientError;
use postwall_core::domain::Session;
use postwall_core::ports::{BackendService, PortError, SessionStorage};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Fixed durable-storage key for the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Fixed durable-storage key for the stringified user id.
pub const USER_ID_KEY: &str = "userId";

//=========================================================================================
// SessionStore
//=========================================================================================

pub struct SessionStore {
    backend: Arc<dyn BackendService>,
    storage: Arc<dyn SessionStorage>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Creates a store with no active session, skipping restoration.
    pub fn new(backend: Arc<dyn BackendService>, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            backend,
            storage,
            current: RwLock::new(None),
        }
    }

    /// Creates the store and restores any persisted session. Run once at
    /// process start.
    ///
    /// Both fields must be present and well-formed to restore a session; a
    /// malformed user id (the pair is persisted as strings) is treated as no
    /// session at all rather than a crash, honoring the set-together invariant.
    pub async fn restore(
        backend: Arc<dyn BackendService>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        let token = match storage.read(TOKEN_KEY).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read persisted token: {}", e);
                None
            }
        };
        let user_id = match storage.read(USER_ID_KEY).await {
            Ok(value) => value.and_then(|raw| raw.parse::<i64>().ok()),
            Err(e) => {
                warn!("Failed to read persisted user id: {}", e);
                None
            }
        };

        let current = match (token, user_id) {
            (Some(token), Some(user_id)) => {
                debug!("Restored session for user {}", user_id);
                Some(Session { token, user_id })
            }
            _ => None,
        };

        Self {
            backend,
            storage,
            current: RwLock::new(current),
        }
    }

    /// Snapshot of the current session, if any.
    pub fn session(&self) -> Option<Session> {
        self.current.read().expect("session lock poisoned").clone()
    }

    /// Exchanges credentials for a session via the backend's token-issuance
    /// endpoint.
    ///
    /// On success the in-memory session is replaced and both fields are
    /// persisted together under the fixed keys. On failure any prior session
    /// is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let session = self
            .backend
            .request_token(username, password)
            .await
            .map_err(|e| match e {
                PortError::Unauthorized => ClientError::Authentication,
                other => ClientError::Backend(other),
            })?;

        if let Err(e) = self.persist(&session).await {
            // The session is still usable for this process; only restoration
            // after a restart is affected.
            warn!("Failed to persist session: {}", e);
        }

        *self.current.write().expect("session lock poisoned") = Some(session.clone());
        Ok(session)
    }

    /// Clears the in-memory session and durable storage unconditionally.
    /// Idempotent; storage failures are logged, never propagated.
    pub async fn logout(&self) {
        self.clear("Logged out").await;
    }

    /// Reactive counterpart to `logout`, invoked when a protected call comes
    /// back `Unauthorized`: the token was rejected by the backend, so the
    /// session is cleared and the gate will redirect on its next check.
    pub async fn invalidate(&self) {
        self.clear("Session invalidated after backend rejection").await;
    }

    async fn persist(&self, session: &Session) -> Result<(), PortError> {
        self.storage.write(TOKEN_KEY, &session.token).await?;
        self.storage
            .write(USER_ID_KEY, &session.user_id.to_string())
            .await
    }

    async fn clear(&self, reason: &str) {
        *self.current.write().expect("session lock poisoned") = None;

        if let Err(e) = self.storage.remove(TOKEN_KEY).await {
            warn!("Failed to clear persisted token: {}", e);
        }
        if let Err(e) = self.storage.remove(USER_ID_KEY).await {
            warn!("Failed to clear persisted user id: {}", e);
        }
        debug!("{}", reason);
    }
}

//=========================================================================================
// Tests
//=========================================================================================
