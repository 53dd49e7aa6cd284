//! services/client/src/adapters/http.rs
//!
//! This module contains the REST adapter, which is the concrete implementation
//! of the `BackendService` port from the `core` crate. It handles all interactions
//! with the remote social-network backend using `reqwest`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postwall_core::domain::{Page, Post, Session, UserProfile};
use postwall_core::ports::{BackendService, PortError, PortResult};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A REST adapter that implements the `BackendService` port.
#[derive(Clone)]
pub struct RestAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl RestAdapter {
    /// Creates a new `RestAdapter`. The base URL must not end with a slash.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issues one authenticated GET for a page of posts and maps the envelope.
    async fn get_page(&self, path: &str, token: &str) -> PortResult<Page<Post>> {
        let res = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !res.status().is_success() {
            return Err(status_error(res.status(), path));
        }

        let record: PageRecord = res
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn get_profile(&self, path: &str, token: &str) -> PortResult<UserProfile> {
        let res = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !res.status().is_success() {
            return Err(status_error(res.status(), path));
        }

        let record: ProfileRecord = res
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }
}

/// Maps a non-2xx HTTP status onto the port error taxonomy.
fn status_error(status: StatusCode, context: &str) -> PortError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized,
        StatusCode::NOT_FOUND => PortError::NotFound(context.to_string()),
        other => PortError::Unexpected(format!("{} failed with status {}", context, other)),
    }
}

//=========================================================================================
// "Impure" Wire Record Structs
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenRecord {
    token: String,
    user_id: i64,
}
impl TokenRecord {
    fn to_domain(self) -> Session {
        Session {
            token: self.token,
            user_id: self.user_id,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostRecord {
    id: i64,
    user_id: i64,
    username: String,
    text: String,
    created_at: DateTime<Utc>,
}
impl PostRecord {
    fn to_domain(self) -> Post {
        Post {
            id: self.id,
            author_id: self.user_id,
            author_name: self.username,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageRecord {
    content: Vec<PostRecord>,
    number: u32,
    total_pages: u32,
    first: bool,
    last: bool,
}
impl PageRecord {
    fn to_domain(self) -> Page<Post> {
        Page {
            items: self.content.into_iter().map(|r| r.to_domain()).collect(),
            page_index: self.number,
            total_pages: self.total_pages,
            first: self.first,
            last: self.last,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRecord {
    id: i64,
    display_name: String,
    #[serde(default)]
    bio: String,
}
impl ProfileRecord {
    fn to_domain(self) -> UserProfile {
        UserProfile {
            id: self.id,
            display_name: self.display_name,
            bio: self.bio,
        }
    }
}

//=========================================================================================
// `BackendService` Trait Implementation
//=========================================================================================

#[async_trait]
impl BackendService for RestAdapter {
    async fn request_token(&self, username: &str, password: &str) -> PortResult<Session> {
        let res = self
            .client
            .post(self.url("/request-token"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Any non-2xx from the token endpoint means the credentials were rejected.
        if !res.status().is_success() {
            return Err(PortError::Unauthorized);
        }

        let record: TokenRecord = res
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn fetch_feed_page(
        &self,
        page: u32,
        size: u32,
        token: &str,
    ) -> PortResult<Page<Post>> {
        self.get_page(&format!("/posts?page={}&size={}", page, size), token)
            .await
    }

    async fn fetch_wall_page(
        &self,
        user_id: i64,
        page: u32,
        size: u32,
        token: &str,
    ) -> PortResult<Page<Post>> {
        self.get_page(
            &format!("/users/{}/posts?page={}&size={}", user_id, page, size),
            token,
        )
        .await
    }

    async fn fetch_profile(&self, user_id: i64, token: &str) -> PortResult<UserProfile> {
        self.get_profile(&format!("/users/{}", user_id), token).await
    }

    async fn fetch_own_profile(&self, token: &str) -> PortResult<UserProfile> {
        self.get_profile("/users/my-profile", token).await
    }

    async fn create_post(&self, author_id: i64, text: &str, token: &str) -> PortResult<Post> {
        let path = format!("/users/{}/posts", author_id);
        let res = self
            .client
            .post(self.url(&path))
            .bearer_auth(token)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !res.status().is_success() {
            return Err(status_error(res.status(), &path));
        }

        let record: PostRecord = res
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn update_post(&self, post_id: i64, text: &str, token: &str) -> PortResult<Post> {
        let path = format!("/posts/{}", post_id);
        let res = self
            .client
            .put(self.url(&path))
            .bearer_auth(token)
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !res.status().is_success() {
            return Err(status_error(res.status(), &path));
        }

        let record: PostRecord = res
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn delete_post(&self, post_id: i64, token: &str) -> PortResult<()> {
        let path = format!("/posts/{}", post_id);
        let res = self
            .client
            .delete(self.url(&path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !res.status().is_success() {
            return Err(status_error(res.status(), &path));
        }
        Ok(())
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_envelope_maps_to_domain() {
        let raw = r#"{
            "content": [
                {
                    "id": 7,
                    "userId": 3,
                    "username": "linnea",
                    "text": "hello wall",
                    "createdAt": "2024-03-01T12:00:00Z"
                }
            ],
            "number": 2,
            "totalPages": 3,
            "first": false,
            "last": true
        }"#;

        let record: PageRecord = serde_json::from_str(raw).unwrap();
        let page = record.to_domain();

        assert_eq!(page.page_index, 2);
        assert_eq!(page.total_pages, 3);
        assert!(!page.first);
        assert!(page.last);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].author_id, 3);
        assert_eq!(page.items[0].author_name, "linnea");
        assert_eq!(page.items[0].text, "hello wall");
    }

    #[test]
    fn token_response_maps_to_session() {
        let raw = r#"{ "token": "abc123", "userId": 42 }"#;
        let record: TokenRecord = serde_json::from_str(raw).unwrap();
        let session = record.to_domain();
        assert_eq!(session.token, "abc123");
        assert_eq!(session.user_id, 42);
    }

    #[test]
    fn profile_without_bio_defaults_to_empty() {
        let raw = r#"{ "id": 5, "displayName": "Maja" }"#;
        let record: ProfileRecord = serde_json::from_str(raw).unwrap();
        let profile = record.to_domain();
        assert_eq!(profile.display_name, "Maja");
        assert_eq!(profile.bio, "");
    }

    #[test]
    fn status_mapping_follows_taxonomy() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "/posts"),
            PortError::Unauthorized
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "/posts"),
            PortError::Unauthorized
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "/posts/9"),
            PortError::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "/posts"),
            PortError::Unexpected(_)
        ));
    }
}
