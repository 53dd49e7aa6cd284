//! services/client/tests/wall_flow.rs
//!
//! End-to-end flow over the in-memory adapters: login, restore, gate checks,
//! wall pagination, and the create/edit/delete round trips a user would
//! perform in one sitting.

use client_lib::adapters::mock::{MemoryStorage, MockBackend};
use client_lib::fetcher::{PageFetcher, PageStatus};
use client_lib::gate::{self, GateDecision};
use client_lib::posts::PostCoordinator;
use client_lib::profile::ProfileFetcher;
use client_lib::session::SessionStore;
use postwall_core::domain::SubjectKey;
use std::sync::Arc;

#[tokio::test]
async fn full_wall_session() {
    let backend = MockBackend::new();
    backend.add_user(1, "linnea", "hunter2");
    backend.add_user(2, "maja", "pw");
    backend.add_post(2, "someone else's post");

    let storage = MemoryStorage::new();

    // Before login the gate redirects and a fetch is a no-op.
    let sessions = Arc::new(SessionStore::new(
        Arc::new(backend.clone()),
        Arc::new(storage.clone()),
    ));
    assert_eq!(gate::check(&sessions), GateDecision::RedirectToLogin);

    let wall = Arc::new(PageFetcher::new(
        Arc::new(backend.clone()),
        Arc::clone(&sessions),
        SubjectKey::Wall(1),
        5,
    ));
    wall.load().await;
    assert_eq!(wall.status(), PageStatus::Empty);
    assert_eq!(backend.call_count(), 0);

    // Login, then simulate a reload: the restored store carries the session.
    let session = sessions.login("linnea", "hunter2").await.unwrap();
    let sessions = Arc::new(
        SessionStore::restore(Arc::new(backend.clone()), Arc::new(storage.clone())).await,
    );
    assert_eq!(sessions.session(), Some(session.clone()));
    assert!(matches!(gate::check(&sessions), GateDecision::Proceed(_)));

    // The wall header loads the owner's profile independently of posts.
    let profiles = ProfileFetcher::new(Arc::new(backend.clone()), Arc::clone(&sessions));
    let profile = profiles.load(1).await.unwrap();
    assert_eq!(profile.display_name, "linnea");
    assert!(session.is_owner(profile.id));

    let wall = Arc::new(PageFetcher::new(
        Arc::new(backend.clone()),
        Arc::clone(&sessions),
        SubjectKey::Wall(1),
        5,
    ));
    let coordinator = PostCoordinator::new(
        Arc::new(backend.clone()),
        Arc::clone(&sessions),
        Arc::clone(&wall),
    );

    // Create on an empty wall: page 0 must show the new post.
    coordinator.create("hello").await.unwrap();
    assert_eq!(wall.page_index(), 0);
    let status = wall.status();
    let page = status.page().unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].text, "hello");

    // Edit through a draft: saving clears it and refreshes in place.
    let post_id = page.items[0].id;
    coordinator.start_edit(post_id, "hello");
    coordinator.update(post_id, "hello again").await.unwrap();
    assert_eq!(coordinator.draft(), None);
    let status = wall.status();
    assert_eq!(status.page().unwrap().items[0].text, "hello again");

    // The other user's post never appeared on this wall.
    assert!(status
        .page()
        .unwrap()
        .items
        .iter()
        .all(|p| p.author_id == 1));

    // Delete the only post: the wall fetches empty, the page stays selected.
    coordinator.delete(post_id).await.unwrap();
    assert_eq!(wall.status(), PageStatus::Empty);
    assert_eq!(wall.page_index(), 0);

    // Logout twice; both gate checks redirect and storage is cleared.
    sessions.logout().await;
    sessions.logout().await;
    assert_eq!(gate::check(&sessions), GateDecision::RedirectToLogin);
    assert!(storage.entries().is_empty());
}

#[tokio::test]
async fn feed_pagination_walks_forward_and_back() {
    let backend = MockBackend::new();
    backend.add_user(1, "linnea", "pw");
    for i in 0..25 {
        backend.add_post(1, &format!("post {}", i));
    }

    let sessions = Arc::new(SessionStore::new(
        Arc::new(backend.clone()),
        Arc::new(MemoryStorage::new()),
    ));
    sessions.login("linnea", "pw").await.unwrap();

    let feed = PageFetcher::new(
        Arc::new(backend.clone()),
        sessions,
        SubjectKey::Feed,
        10,
    );
    feed.load().await;

    let status = feed.status();
    let page = status.page().unwrap();
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 10);
    assert!(page.first);

    feed.next_page().await;
    feed.next_page().await;
    let status = feed.status();
    let page = status.page().unwrap();
    assert_eq!(page.page_index, 2);
    assert_eq!(page.items.len(), 5);
    assert!(page.last);
    assert!(!feed.can_next());

    feed.prev_page().await;
    assert_eq!(feed.page_index(), 1);
    assert!(feed.can_next());
    assert!(feed.can_prev());
}
