//! services/client/src/profile.rs
//!
//! Loads the wall owner's profile (display name and bio), independently of
//! the posts page. Follows the same degradation rules as the page fetcher:
//! no session means no request, failures are logged and yield nothing, and a
//! rejected token invalidates the session.

use crate::session::SessionStore;
use postwall_core::domain::UserProfile;
use postwall_core::ports::{BackendService, PortError, PortResult};
use std::sync::Arc;
use tracing::error;

pub struct ProfileFetcher {
    backend: Arc<dyn BackendService>,
    sessions: Arc<SessionStore>,
}

impl ProfileFetcher {
    pub fn new(backend: Arc<dyn BackendService>, sessions: Arc<SessionStore>) -> Self {
        Self { backend, sessions }
    }

    /// Fetches one user's profile.
    pub async fn load(&self, user_id: i64) -> Option<UserProfile> {
        let token = self.sessions.session()?.token;
        self.degrade(self.backend.fetch_profile(user_id, &token).await)
            .await
    }

    /// Fetches the logged-in user's own profile.
    pub async fn load_own(&self) -> Option<UserProfile> {
        let token = self.sessions.session()?.token;
        self.degrade(self.backend.fetch_own_profile(&token).await)
            .await
    }

    async fn degrade(&self, result: PortResult<UserProfile>) -> Option<UserProfile> {
        match result {
            Ok(profile) => Some(profile),
            Err(PortError::Unauthorized) => {
                error!("Token rejected while fetching profile");
                self.sessions.invalidate().await;
                None
            }
            Err(e) => {
                error!("Failed to fetch profile: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MemoryStorage, MockBackend};

    async fn fixture() -> (MockBackend, Arc<SessionStore>, ProfileFetcher) {
        let backend = MockBackend::new();
        backend.add_user(1, "linnea", "pw");
        let sessions = Arc::new(SessionStore::new(
            Arc::new(backend.clone()),
            Arc::new(MemoryStorage::new()),
        ));
        sessions.login("linnea", "pw").await.unwrap();
        let profiles = ProfileFetcher::new(Arc::new(backend.clone()), Arc::clone(&sessions));
        (backend, sessions, profiles)
    }

    #[tokio::test]
    async fn loads_wall_owner_profile() {
        let (backend, _sessions, profiles) = fixture().await;
        backend.add_user(2, "maja", "pw");

        let profile = profiles.load(2).await.unwrap();
        assert_eq!(profile.display_name, "maja");
    }

    #[tokio::test]
    async fn loads_own_profile() {
        let (_backend, _sessions, profiles) = fixture().await;

        let profile = profiles.load_own().await.unwrap();
        assert_eq!(profile.id, 1);
    }

    #[tokio::test]
    async fn no_session_means_no_request() {
        let (backend, sessions, profiles) = fixture().await;
        sessions.logout().await;
        let calls_before = backend.call_count();

        assert_eq!(profiles.load(1).await, None);
        assert_eq!(backend.call_count(), calls_before);
    }

    #[tokio::test]
    async fn unknown_user_degrades_to_none() {
        let (_backend, _sessions, profiles) = fixture().await;
        assert_eq!(profiles.load(999).await, None);
    }
}
