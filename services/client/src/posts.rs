//! services/client/src/posts.rs
//!
//! The post mutation coordinator: create, update, and delete against
//! individual posts, each followed by a deterministic re-fetch of the page
//! the user should be looking at afterwards (page 0 for create, the current
//! page for update and delete).
//!
//! The visible list is never mutated optimistically — it only ever changes by
//! re-fetching through the `PageFetcher` after the backend has accepted the
//! write. Failures leave all local state (draft, page index, visible page)
//! exactly as it was before the attempt.

use crate::error::ClientError;
use crate::fetcher::PageFetcher;
use crate::session::SessionStore;
use postwall_core::domain::{EditDraft, Session};
use postwall_core::ports::{BackendService, PortError};
use std::sync::{Arc, Mutex};
use tracing::error;

//=========================================================================================
// PostCoordinator
//=========================================================================================

pub struct PostCoordinator {
    backend: Arc<dyn BackendService>,
    sessions: Arc<SessionStore>,
    fetcher: Arc<PageFetcher>,
    // At most one active edit; starting another silently replaces it.
    draft: Mutex<Option<EditDraft>>,
}

impl PostCoordinator {
    pub fn new(
        backend: Arc<dyn BackendService>,
        sessions: Arc<SessionStore>,
        fetcher: Arc<PageFetcher>,
    ) -> Self {
        Self {
            backend,
            sessions,
            fetcher,
            draft: Mutex::new(None),
        }
    }

    //-------------------------------------------------------------------------------------
    // Edit draft state machine
    //-------------------------------------------------------------------------------------

    /// Snapshot of the active edit draft, if any.
    pub fn draft(&self) -> Option<EditDraft> {
        self.draft.lock().expect("draft lock poisoned").clone()
    }

    /// Opens an edit draft for one post, seeded with its current text.
    /// Replaces any existing draft without confirmation (last writer wins).
    pub fn start_edit(&self, post_id: i64, current_text: &str) {
        *self.draft.lock().expect("draft lock poisoned") = Some(EditDraft {
            post_id,
            text: current_text.to_string(),
        });
    }

    /// Discards the active draft, if any.
    pub fn cancel_edit(&self) {
        *self.draft.lock().expect("draft lock poisoned") = None;
    }

    //-------------------------------------------------------------------------------------
    // Mutations
    //-------------------------------------------------------------------------------------

    /// Creates a post authored by the logged-in user.
    ///
    /// Empty or whitespace-only text is rejected locally — no request is
    /// sent. On success the fetcher is reset to page 0 so the new post (the
    /// backend orders newest-first) becomes visible.
    pub async fn create(&self, text: &str) -> Result<(), ClientError> {
        if text.trim().is_empty() {
            return Err(ClientError::EmptyPostText);
        }
        let session = self.require_session()?;

        match self
            .backend
            .create_post(session.user_id, text, &session.token)
            .await
        {
            Ok(_) => {
                self.fetcher.set_page(0).await;
                Ok(())
            }
            Err(e) => Err(self.surface("create post", e).await),
        }
    }

    /// Replaces a post's text.
    ///
    /// Empty text is rejected locally, leaving any open draft open. On
    /// success the draft is cleared and the *current* page is re-fetched,
    /// preserving the user's page position.
    pub async fn update(&self, post_id: i64, new_text: &str) -> Result<(), ClientError> {
        if new_text.trim().is_empty() {
            return Err(ClientError::EmptyPostText);
        }
        let session = self.require_session()?;

        match self
            .backend
            .update_post(post_id, new_text, &session.token)
            .await
        {
            Ok(_) => {
                self.cancel_edit();
                self.fetcher.refresh().await;
                Ok(())
            }
            Err(e) => Err(self.surface("update post", e).await),
        }
    }

    /// Deletes a post, then re-fetches the current page.
    ///
    /// Deleting the last item of a non-first page leaves that page selected —
    /// it will simply fetch as empty. Stepping back automatically is a
    /// product decision that has deliberately not been taken here.
    pub async fn delete(&self, post_id: i64) -> Result<(), ClientError> {
        let session = self.require_session()?;

        match self.backend.delete_post(post_id, &session.token).await {
            Ok(()) => {
                self.fetcher.refresh().await;
                Ok(())
            }
            Err(e) => Err(self.surface("delete post", e).await),
        }
    }

    fn require_session(&self) -> Result<Session, ClientError> {
        self.sessions.session().ok_or(ClientError::SessionMissing)
    }

    /// Logs a failed mutation and maps it onto the client error taxonomy.
    /// Local state is untouched by the caller on this path; a rejected token
    /// additionally invalidates the session.
    async fn surface(&self, what: &str, e: PortError) -> ClientError {
        error!("Failed to {}: {}", what, e);
        if matches!(e, PortError::Unauthorized) {
            self.sessions.invalidate().await;
        }
        ClientError::Backend(e)
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MemoryStorage, MockBackend};
    use crate::fetcher::PageStatus;
    use postwall_core::domain::SubjectKey;

    struct Fixture {
        backend: MockBackend,
        sessions: Arc<SessionStore>,
        fetcher: Arc<PageFetcher>,
        coordinator: PostCoordinator,
    }

    async fn wall_fixture(page_size: u32) -> Fixture {
        let backend = MockBackend::new();
        backend.add_user(1, "linnea", "pw");
        let sessions = Arc::new(SessionStore::new(
            Arc::new(backend.clone()),
            Arc::new(MemoryStorage::new()),
        ));
        sessions.login("linnea", "pw").await.unwrap();

        let fetcher = Arc::new(PageFetcher::new(
            Arc::new(backend.clone()),
            Arc::clone(&sessions),
            SubjectKey::Wall(1),
            page_size,
        ));
        let coordinator = PostCoordinator::new(
            Arc::new(backend.clone()),
            Arc::clone(&sessions),
            Arc::clone(&fetcher),
        );
        Fixture {
            backend,
            sessions,
            fetcher,
            coordinator,
        }
    }

    #[tokio::test]
    async fn create_on_empty_wall_appears_on_page_zero() {
        let fx = wall_fixture(5).await;

        fx.coordinator.create("hello").await.unwrap();

        assert_eq!(fx.fetcher.page_index(), 0);
        let status = fx.fetcher.status();
        let page = status.page().unwrap();
        assert!(page.items.iter().any(|p| p.text == "hello"));
    }

    #[tokio::test]
    async fn create_rejects_whitespace_without_request() {
        let fx = wall_fixture(5).await;
        let calls_before = fx.backend.call_count();

        let err = fx.coordinator.create("   ").await.unwrap_err();

        assert!(matches!(err, ClientError::EmptyPostText));
        assert_eq!(fx.backend.call_count(), calls_before);
    }

    #[tokio::test]
    async fn two_creates_both_appear_with_page_reset() {
        let fx = wall_fixture(5).await;

        fx.coordinator.create("first").await.unwrap();
        assert_eq!(fx.fetcher.page_index(), 0);

        fx.fetcher.set_page(0).await;
        fx.coordinator.create("second").await.unwrap();
        assert_eq!(fx.fetcher.page_index(), 0);

        let status = fx.fetcher.status();
        let texts: Vec<&str> = status
            .page()
            .unwrap()
            .items
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(texts, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn update_refreshes_current_page_and_clears_draft() {
        let fx = wall_fixture(1).await;
        fx.backend.add_post(1, "older");
        let target = fx.backend.add_post(1, "newer");

        // Navigate to page 1 so position preservation is observable.
        fx.fetcher.set_page(1).await;
        fx.coordinator.start_edit(target, "newer");

        fx.coordinator.update(target, "edited").await.unwrap();

        assert_eq!(fx.coordinator.draft(), None);
        assert_eq!(fx.fetcher.page_index(), 1);
    }

    #[tokio::test]
    async fn update_with_empty_text_keeps_draft_and_sends_nothing() {
        let fx = wall_fixture(5).await;
        let target = fx.backend.add_post(1, "original");
        fx.coordinator.start_edit(target, "original");
        let calls_before = fx.backend.call_count();

        let err = fx.coordinator.update(target, "").await.unwrap_err();

        assert!(matches!(err, ClientError::EmptyPostText));
        assert_eq!(fx.backend.call_count(), calls_before);
        assert!(fx.coordinator.draft().is_some());
    }

    #[tokio::test]
    async fn delete_last_item_of_second_page_leaves_page_selected() {
        // Page size 1 gives two pages; the user sits on page 1 (0-indexed).
        let fx = wall_fixture(1).await;
        fx.backend.add_post(1, "on page one");
        fx.backend.add_post(1, "on page zero");

        fx.fetcher.set_page(1).await;
        let status = fx.fetcher.status();
        let victim = status.page().unwrap().items[0].id;

        fx.coordinator.delete(victim).await.unwrap();

        // No auto-step-back: the page stays selected and now fetches empty.
        assert_eq!(fx.fetcher.page_index(), 1);
        assert_eq!(fx.fetcher.status(), PageStatus::Empty);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_state_unchanged() {
        let fx = wall_fixture(5).await;
        let target = fx.backend.add_post(1, "original");
        fx.fetcher.load().await;
        let before = fx.fetcher.status();
        fx.coordinator.start_edit(target, "original");

        fx.backend
            .fail_next(PortError::Unexpected("boom".to_string()));
        let err = fx.coordinator.update(target, "edited").await.unwrap_err();

        assert!(matches!(err, ClientError::Backend(_)));
        assert!(fx.coordinator.draft().is_some());
        assert_eq!(fx.fetcher.status(), before);
        assert_eq!(fx.fetcher.page_index(), 0);
    }

    #[tokio::test]
    async fn mutation_without_session_is_rejected_locally() {
        let fx = wall_fixture(5).await;
        fx.sessions.logout().await;
        let calls_before = fx.backend.call_count();

        let err = fx.coordinator.create("hello").await.unwrap_err();

        assert!(matches!(err, ClientError::SessionMissing));
        assert_eq!(fx.backend.call_count(), calls_before);
    }

    #[tokio::test]
    async fn rejected_token_on_delete_invalidates_session() {
        let fx = wall_fixture(5).await;
        let target = fx.backend.add_post(1, "doomed");
        fx.backend.fail_next(PortError::Unauthorized);

        let err = fx.coordinator.delete(target).await.unwrap_err();

        assert!(matches!(err, ClientError::Backend(PortError::Unauthorized)));
        assert_eq!(fx.sessions.session(), None);
    }

    #[tokio::test]
    async fn starting_a_new_edit_replaces_the_draft() {
        let fx = wall_fixture(5).await;

        fx.coordinator.start_edit(1, "one");
        fx.coordinator.start_edit(2, "two");

        let draft = fx.coordinator.draft().unwrap();
        assert_eq!(draft.post_id, 2);
        assert_eq!(draft.text, "two");

        fx.coordinator.cancel_edit();
        assert_eq!(fx.coordinator.draft(), None);
    }
}
