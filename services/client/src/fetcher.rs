//! services/client/src/fetcher.rs
//!
//! The paged collection fetcher: retrieves one page of a remote post
//! collection and tracks the loading/ready/empty state a view renders from.
//!
//! One fetcher instance is owned by one view and scoped to one subject (the
//! global feed or a single user's wall). Page navigation re-issues a load;
//! mutations never re-fetch implicitly — the coordinator calls back in
//! explicitly after a successful write.

use crate::session::SessionStore;
use postwall_core::domain::{Page, Post, SubjectKey};
use postwall_core::ports::{BackendService, PortError};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, error};

//=========================================================================================
// Fetch State
//=========================================================================================

/// The ternary fetch status a view renders from. There is no partial or
/// streaming state: a fetch either fully replaces the page or the prior
/// status stays visible until it does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    /// A request is in flight.
    Loading,
    /// The most recently completed fetch, with at least one item.
    Ready(Page<Post>),
    /// Not loaded: no session, a failed fetch, or a page with zero items.
    Empty,
}

impl PageStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, PageStatus::Loading)
    }

    /// The visible page, when one is ready.
    pub fn page(&self) -> Option<&Page<Post>> {
        match self {
            PageStatus::Ready(page) => Some(page),
            _ => None,
        }
    }
}

//=========================================================================================
// PageFetcher
//=========================================================================================

pub struct PageFetcher {
    backend: Arc<dyn BackendService>,
    sessions: Arc<SessionStore>,
    subject: SubjectKey,
    page_size: u32,
    page_index: AtomicU32,
    status: RwLock<PageStatus>,
    // Incremented per issued load; a completed response is published only if
    // its generation is still the latest, so rapid page flipping can never
    // surface an out-of-date page.
    generation: AtomicU64,
}

impl PageFetcher {
    /// Creates a fetcher scoped to one subject. The page size is the caller's
    /// constant (10 for the global feed, 5 for a wall).
    pub fn new(
        backend: Arc<dyn BackendService>,
        sessions: Arc<SessionStore>,
        subject: SubjectKey,
        page_size: u32,
    ) -> Self {
        Self {
            backend,
            sessions,
            subject,
            page_size,
            page_index: AtomicU32::new(0),
            status: RwLock::new(PageStatus::Empty),
            generation: AtomicU64::new(0),
        }
    }

    pub fn subject(&self) -> SubjectKey {
        self.subject
    }

    pub fn page_index(&self) -> u32 {
        self.page_index.load(Ordering::SeqCst)
    }

    /// Snapshot of the current fetch status.
    pub fn status(&self) -> PageStatus {
        self.status.read().expect("status lock poisoned").clone()
    }

    /// Whether the "next page" control is enabled.
    pub fn can_next(&self) -> bool {
        matches!(self.status(), PageStatus::Ready(page) if !page.last)
    }

    /// Whether the "previous page" control is enabled.
    pub fn can_prev(&self) -> bool {
        matches!(self.status(), PageStatus::Ready(page) if !page.first)
    }

    /// Advances one page and re-fetches. A no-op while the control is
    /// disabled; out-of-range indices are a caller error prevented here, not
    /// defended against server-side.
    pub async fn next_page(&self) {
        if !self.can_next() {
            return;
        }
        self.page_index.fetch_add(1, Ordering::SeqCst);
        self.load().await;
    }

    /// Steps back one page and re-fetches. A no-op while disabled.
    pub async fn prev_page(&self) {
        if !self.can_prev() {
            return;
        }
        self.page_index.fetch_sub(1, Ordering::SeqCst);
        self.load().await;
    }

    /// Jumps to a page index and re-fetches. Used by the coordinator to reset
    /// to page 0 after a create.
    pub async fn set_page(&self, page_index: u32) {
        self.page_index.store(page_index, Ordering::SeqCst);
        self.load().await;
    }

    /// Re-fetches the current page. Used by the coordinator after update and
    /// delete so the user's page position is preserved.
    pub async fn refresh(&self) {
        self.load().await;
    }

    /// Issues one request for exactly one page.
    ///
    /// With no session the request is skipped entirely and the status
    /// resolves to `Empty`. Failures are caught and logged, also resolving to
    /// `Empty` — the view is never left stuck in `Loading` by a completed
    /// call. A rejected token additionally invalidates the session.
    ///
    /// The fetch key is (subject, page index, session token): a response is
    /// published only if no newer load has been issued *and* the token it was
    /// sent with is still the active one, so neither rapid page flipping nor
    /// a logout/re-login while a request is in flight can surface a page the
    /// current state no longer asked for.
    pub async fn load(&self) {
        let Some(session) = self.sessions.session() else {
            // Retire any in-flight request: the session is part of the fetch
            // key, so its response no longer matches the current inputs.
            self.generation.fetch_add(1, Ordering::SeqCst);
            *self.status.write().expect("status lock poisoned") = PageStatus::Empty;
            return;
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let page_index = self.page_index.load(Ordering::SeqCst);
        self.publish_if_current(generation, PageStatus::Loading);

        debug!(subject = ?self.subject, page_index, "Fetching page");
        let result = match self.subject {
            SubjectKey::Feed => {
                self.backend
                    .fetch_feed_page(page_index, self.page_size, &session.token)
                    .await
            }
            SubjectKey::Wall(user_id) => {
                self.backend
                    .fetch_wall_page(user_id, page_index, self.page_size, &session.token)
                    .await
            }
        };

        // A newer load superseded this one while it was in flight; its
        // response must not overwrite the latest request's state.
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(page_index, "Discarding stale page response");
            return;
        }

        // The session changed while the request was in flight (logout or
        // re-login with no follow-up load yet): degrade instead of showing
        // posts fetched under a token that is no longer active.
        let current_token = self.sessions.session().map(|s| s.token);
        if current_token.as_deref() != Some(session.token.as_str()) {
            debug!(page_index, "Discarding page response from a superseded session");
            self.publish_if_current(generation, PageStatus::Empty);
            return;
        }

        let status = match result {
            Ok(page) if page.items.is_empty() => PageStatus::Empty,
            Ok(page) => PageStatus::Ready(page),
            Err(PortError::Unauthorized) => {
                error!("Token rejected while fetching posts");
                self.sessions.invalidate().await;
                PageStatus::Empty
            }
            Err(e) => {
                error!("Failed to fetch posts: {}", e);
                PageStatus::Empty
            }
        };
        self.publish_if_current(generation, status);
    }

    /// Writes a status only while the given generation is still the latest.
    /// The check runs under the status write lock so a stale writer can never
    /// slip in between a newer load's check and its write.
    fn publish_if_current(&self, generation: u64, status: PageStatus) {
        let mut guard = self.status.write().expect("status lock poisoned");
        if self.generation.load(Ordering::SeqCst) == generation {
            *guard = status;
        }
    }
}

//=========================================================================================
// Tests
//=========================================================================================
