//! crates/postwall_core/src/domain.rs
//!
//! Defines the pure, core data structures for the client.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};

/// The (token, user id) pair identifying the logged-in user.
///
/// Both fields live or die together: "not logged in" is `Option<Session>::None`,
/// never a token without an id or vice versa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
}

impl Session {
    /// Whether the logged-in user owns the given wall.
    pub fn is_owner(&self, wall_user_id: i64) -> bool {
        self.user_id == wall_user_id
    }
}

/// One fetched slice of a server-side paginated collection.
///
/// Produced fresh on every fetch and swapped in whole; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_index: u32,
    pub total_pages: u32,
    pub first: bool,
    pub last: bool,
}

/// A short text post. Owned by the backend; the client holds read-only
/// copies inside a `Page` until the next re-fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// The wall owner's public profile, fetched independently of posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    pub display_name: String,
    pub bio: String,
}

/// Transient buffer for an in-progress post edit. At most one exists per
/// coordinator; starting a new edit replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub post_id: i64,
    pub text: String,
}

/// The identity of the post collection being paged: the global feed or one
/// user's wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKey {
    Feed,
    Wall(i64),
}
