//! services/client/src/gate.rs
//!
//! The access-control check placed in front of protected views.
//!
//! A pure, stateless decision over the current session: token presence is
//! sufficient to proceed — the gate never verifies the token against the
//! backend. A token the backend later rejects is handled reactively by the
//! fetcher and coordinator, which invalidate the session so the next gate
//! check redirects.

use crate::session::SessionStore;
use postwall_core::domain::Session;

/// The outcome of a gate check for one protected view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Entry permitted; the session is exposed to descendant views.
    Proceed(Session),
    /// No session: redirect to the login entry point. The attempted
    /// navigation is discarded — no return-URL memory.
    RedirectToLogin,
}

/// Decides whether the caller may enter a protected view.
pub fn check(sessions: &SessionStore) -> GateDecision {
    match sessions.session() {
        Some(session) => GateDecision::Proceed(session),
        None => GateDecision::RedirectToLogin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MemoryStorage, MockBackend};
    use std::sync::Arc;

    #[tokio::test]
    async fn gate_redirects_without_session() {
        let backend = MockBackend::new();
        let store = SessionStore::new(Arc::new(backend), Arc::new(MemoryStorage::new()));

        assert_eq!(check(&store), GateDecision::RedirectToLogin);
    }

    #[tokio::test]
    async fn gate_permits_with_session() {
        let backend = MockBackend::new();
        backend.add_user(7, "maja", "pw");
        let store = SessionStore::new(Arc::new(backend), Arc::new(MemoryStorage::new()));

        let session = store.login("maja", "pw").await.unwrap();
        assert_eq!(check(&store), GateDecision::Proceed(session));
    }

    #[tokio::test]
    async fn gate_redirects_again_after_logout() {
        let backend = MockBackend::new();
        backend.add_user(7, "maja", "pw");
        let store = SessionStore::new(Arc::new(backend), Arc::new(MemoryStorage::new()));

        store.login("maja", "pw").await.unwrap();
        store.logout().await;

        assert_eq!(check(&store), GateDecision::RedirectToLogin);
    }
}
