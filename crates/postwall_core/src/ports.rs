//! crates/postwall_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the client's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like HTTP or the filesystem.

use crate::domain::{Page, Post, Session, UserProfile};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP, disk).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The remote REST backend. Every call except `request_token` carries the
/// bearer token; a 401/403 from the server surfaces as `PortError::Unauthorized`.
#[async_trait]
pub trait BackendService: Send + Sync {
    // --- Authentication ---
    async fn request_token(&self, username: &str, password: &str) -> PortResult<Session>;

    // --- Paginated post collections ---
    async fn fetch_feed_page(&self, page: u32, size: u32, token: &str)
        -> PortResult<Page<Post>>;

    async fn fetch_wall_page(
        &self,
        user_id: i64,
        page: u32,
        size: u32,
        token: &str,
    ) -> PortResult<Page<Post>>;

    // --- Profiles ---
    async fn fetch_profile(&self, user_id: i64, token: &str) -> PortResult<UserProfile>;

    async fn fetch_own_profile(&self, token: &str) -> PortResult<UserProfile>;

    // --- Post Mutations ---
    async fn create_post(&self, author_id: i64, text: &str, token: &str) -> PortResult<Post>;

    async fn update_post(&self, post_id: i64, text: &str, token: &str) -> PortResult<Post>;

    async fn delete_post(&self, post_id: i64, token: &str) -> PortResult<()>;
}

/// Durable client-side key/value storage for the persisted session pair.
/// Plays the role the browser's localStorage played for the original UI.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn read(&self, key: &str) -> PortResult<Option<String>>;

    async fn write(&self, key: &str, value: &str) -> PortResult<()>;

    async fn remove(&self, key: &str) -> PortResult<()>;
}
