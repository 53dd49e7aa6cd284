//! services/client/src/adapters/mock.rs
//!
//! In-memory implementations of the ports, for tests and demos.
//!
//! `MockBackend` keeps a newest-first list of posts, records every call it
//! receives, and supports forced failures and delayed responses so tests can
//! exercise degradation and stale-response handling.

use async_trait::async_trait;
use chrono::Utc;
use postwall_core::domain::{Page, Post, Session, UserProfile};
use postwall_core::ports::{BackendService, PortError, PortResult, SessionStorage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

//=========================================================================================
// MockBackend
//=========================================================================================

/// In-memory backend for testing.
///
/// Allows seeding users and posts, capturing issued calls for verification,
/// and forcing the next call to fail or stall.
#[derive(Default)]
pub struct MockBackend {
    inner: Arc<Mutex<MockBackendInner>>,
}

#[derive(Default)]
struct MockBackendInner {
    next_post_id: i64,
    // Newest first, matching the backend's ordering guarantee.
    posts: Vec<Post>,
    profiles: HashMap<i64, UserProfile>,
    // username -> (password, user id)
    credentials: HashMap<String, (String, i64)>,
    issued_tokens: Vec<String>,
    calls: Vec<String>,
    fail_next: Option<PortError>,
    delay_next: Option<Duration>,
}

impl MockBackend {
    /// Create a new mock backend with no users or posts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user account with credentials and a profile.
    pub fn add_user(&self, user_id: i64, username: &str, password: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .credentials
            .insert(username.to_string(), (password.to_string(), user_id));
        inner.profiles.insert(
            user_id,
            UserProfile {
                id: user_id,
                display_name: username.to_string(),
                bio: String::new(),
            },
        );
    }

    /// Seed an existing post, placed at the top of the collection.
    pub fn add_post(&self, author_id: i64, text: &str) -> i64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.allocate_post_id();
        let post = inner.build_post(id, author_id, text);
        inner.posts.insert(0, post);
        id
    }

    /// Get all calls that were issued, newest last.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Get the total number of calls issued.
    pub fn call_count(&self) -> usize {
        self.inner.lock().unwrap().calls.len()
    }

    /// Number of posts currently held, across all pages.
    pub fn post_count(&self) -> usize {
        self.inner.lock().unwrap().posts.len()
    }

    /// Cause the next call to fail with the given error.
    pub fn fail_next(&self, error: PortError) {
        self.inner.lock().unwrap().fail_next = Some(error);
    }

    /// Cause the next call to sleep before answering.
    pub fn delay_next(&self, delay: Duration) {
        self.inner.lock().unwrap().delay_next = Some(delay);
    }

    /// Runs the per-call bookkeeping: records the call, applies a forced
    /// failure, and returns any pending delay to be awaited outside the lock.
    fn enter(&self, call: &str, token: Option<&str>) -> PortResult<Option<Duration>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call.to_string());

        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        if let Some(token) = token {
            if !inner.issued_tokens.iter().any(|t| t == token) {
                return Err(PortError::Unauthorized);
            }
        }
        Ok(inner.delay_next.take())
    }

    async fn pause(&self, delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl MockBackendInner {
    fn allocate_post_id(&mut self) -> i64 {
        self.next_post_id += 1;
        self.next_post_id
    }

    fn build_post(&self, id: i64, author_id: i64, text: &str) -> Post {
        let author_name = self
            .profiles
            .get(&author_id)
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| format!("user{}", author_id));
        Post {
            id,
            author_id,
            author_name,
            text: text.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Slices a newest-first post list into one page envelope, computing the
    /// positional metadata the way the real backend does. A page index past
    /// the end yields an empty page that still reports the collection's size.
    fn paginate(posts: Vec<Post>, page: u32, size: u32) -> Page<Post> {
        let total = posts.len() as u32;
        let total_pages = total.div_ceil(size);
        let start = (page * size) as usize;
        let items: Vec<Post> = posts.into_iter().skip(start).take(size as usize).collect();
        Page {
            items,
            page_index: page,
            total_pages,
            first: page == 0,
            last: total_pages == 0 || page >= total_pages - 1,
        }
    }
}

impl Clone for MockBackend {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl BackendService for MockBackend {
    async fn request_token(&self, username: &str, password: &str) -> PortResult<Session> {
        let delay = self.enter("request_token", None)?;
        self.pause(delay).await;

        let mut inner = self.inner.lock().unwrap();
        match inner.credentials.get(username) {
            Some((stored, user_id)) if stored == password => {
                let user_id = *user_id;
                let token = format!("token-{}-{}", username, inner.issued_tokens.len());
                inner.issued_tokens.push(token.clone());
                Ok(Session { token, user_id })
            }
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn fetch_feed_page(
        &self,
        page: u32,
        size: u32,
        token: &str,
    ) -> PortResult<Page<Post>> {
        let delay = self.enter("fetch_feed_page", Some(token))?;
        self.pause(delay).await;

        let posts = self.inner.lock().unwrap().posts.clone();
        Ok(MockBackendInner::paginate(posts, page, size))
    }

    async fn fetch_wall_page(
        &self,
        user_id: i64,
        page: u32,
        size: u32,
        token: &str,
    ) -> PortResult<Page<Post>> {
        let delay = self.enter("fetch_wall_page", Some(token))?;
        self.pause(delay).await;

        let posts: Vec<Post> = self
            .inner
            .lock()
            .unwrap()
            .posts
            .iter()
            .filter(|p| p.author_id == user_id)
            .cloned()
            .collect();
        Ok(MockBackendInner::paginate(posts, page, size))
    }

    async fn fetch_profile(&self, user_id: i64, token: &str) -> PortResult<UserProfile> {
        let delay = self.enter("fetch_profile", Some(token))?;
        self.pause(delay).await;

        self.inner
            .lock()
            .unwrap()
            .profiles
            .get(&user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("user {}", user_id)))
    }

    async fn fetch_own_profile(&self, token: &str) -> PortResult<UserProfile> {
        let delay = self.enter("fetch_own_profile", Some(token))?;
        self.pause(delay).await;

        // Recover the user from the token the same way a session lookup would.
        let inner = self.inner.lock().unwrap();
        let username = token.split('-').nth(1).unwrap_or_default();
        inner
            .credentials
            .get(username)
            .and_then(|(_, id)| inner.profiles.get(id))
            .cloned()
            .ok_or_else(|| PortError::NotFound("own profile".to_string()))
    }

    async fn create_post(&self, author_id: i64, text: &str, token: &str) -> PortResult<Post> {
        let delay = self.enter("create_post", Some(token))?;
        self.pause(delay).await;

        let mut inner = self.inner.lock().unwrap();
        let id = inner.allocate_post_id();
        let post = inner.build_post(id, author_id, text);
        inner.posts.insert(0, post.clone());
        Ok(post)
    }

    async fn update_post(&self, post_id: i64, text: &str, token: &str) -> PortResult<Post> {
        let delay = self.enter("update_post", Some(token))?;
        self.pause(delay).await;

        let mut inner = self.inner.lock().unwrap();
        match inner.posts.iter_mut().find(|p| p.id == post_id) {
            Some(post) => {
                post.text = text.to_string();
                Ok(post.clone())
            }
            None => Err(PortError::NotFound(format!("post {}", post_id))),
        }
    }

    async fn delete_post(&self, post_id: i64, token: &str) -> PortResult<()> {
        let delay = self.enter("delete_post", Some(token))?;
        self.pause(delay).await;

        let mut inner = self.inner.lock().unwrap();
        let before = inner.posts.len();
        inner.posts.retain(|p| p.id != post_id);
        if inner.posts.len() == before {
            return Err(PortError::NotFound(format!("post {}", post_id)));
        }
        Ok(())
    }
}

//=========================================================================================
// MemoryStorage
//=========================================================================================

/// In-memory `SessionStorage` for testing restore/persist behavior.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a persisted entry, as if written by an earlier process.
    pub fn seed(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    /// Snapshot of everything currently persisted.
    pub fn entries(&self) -> HashMap<String, String> {
        self.entries.lock().unwrap().clone()
    }
}

impl Clone for MemoryStorage {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn read(&self, key: &str) -> PortResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> PortResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> PortResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
