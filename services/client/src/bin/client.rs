//! services/client/src/bin/client.rs
//!
//! A thin command-line front end over the client library, playing the role
//! the React views played: it renders whatever the core exposes and carries
//! no logic of its own.

use client_lib::{
    adapters::{http::RestAdapter, storage::FileStorage},
    config::Config,
    error::ClientError,
    fetcher::{PageFetcher, PageStatus},
    gate::{self, GateDecision},
    posts::PostCoordinator,
    profile::ProfileFetcher,
    session::SessionStore,
};
use postwall_core::domain::{Page, Post, Session, SubjectKey};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- 2. Initialize Adapters & Restore the Session ---
    let backend = Arc::new(RestAdapter::new(config.api_base_url.clone()));
    let storage = Arc::new(FileStorage::new(config.session_file.clone()));
    let sessions = Arc::new(SessionStore::restore(backend.clone(), storage).await);

    // --- 3. Dispatch the Subcommand ---
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        Some((cmd, rest)) if cmd == "login" => match rest {
            [username, password] => {
                let session = sessions.login(username, password).await?;
                info!("Logged in as user {}", session.user_id);
                println!("Logged in as user {}", session.user_id);
                Ok(())
            }
            _ => usage(),
        },
        Some((cmd, _)) if cmd == "logout" => {
            sessions.logout().await;
            println!("Logged out");
            Ok(())
        }
        Some((cmd, rest)) => {
            // Everything else is a protected view; the gate decides whether
            // the caller proceeds or is sent to the login entry point.
            let session = match gate::check(&sessions) {
                GateDecision::Proceed(session) => session,
                GateDecision::RedirectToLogin => {
                    println!("Not logged in. Run: client login <username> <password>");
                    return Ok(());
                }
            };
            dispatch(cmd, rest, &config, backend, sessions, session).await
        }
        None => usage(),
    }
}

async fn dispatch(
    cmd: &str,
    rest: &[String],
    config: &Config,
    backend: Arc<RestAdapter>,
    sessions: Arc<SessionStore>,
    session: Session,
) -> Result<(), ClientError> {
    match (cmd, rest) {
        ("whoami", _) => {
            let profiles = ProfileFetcher::new(backend, sessions);
            match profiles.load_own().await {
                Some(profile) => println!("{} (id {})\n{}", profile.display_name, profile.id, profile.bio),
                None => println!("Profile unavailable"),
            }
            Ok(())
        }
        ("feed", rest) => {
            let Some(page) = parse_page(rest.first()) else {
                return usage();
            };
            let fetcher = PageFetcher::new(
                backend,
                sessions,
                SubjectKey::Feed,
                config.feed_page_size,
            );
            fetcher.set_page(page).await;
            render(&fetcher);
            Ok(())
        }
        ("wall", [user_id, rest @ ..]) => {
            let Some(user_id) = parse_id(user_id) else {
                return usage();
            };
            let Some(page) = parse_page(rest.first()) else {
                return usage();
            };

            let profiles = ProfileFetcher::new(backend.clone(), sessions.clone());
            if let Some(profile) = profiles.load(user_id).await {
                println!("=== {} ===", profile.display_name);
                if !profile.bio.is_empty() {
                    println!("About: {}", profile.bio);
                }
                if session.is_owner(user_id) {
                    println!("(this is your wall)");
                }
            }

            let fetcher = PageFetcher::new(
                backend,
                sessions,
                SubjectKey::Wall(user_id),
                config.wall_page_size,
            );
            fetcher.set_page(page).await;
            render(&fetcher);
            Ok(())
        }
        ("post", rest) if !rest.is_empty() => {
            let fetcher = own_wall_fetcher(config, backend.clone(), sessions.clone(), &session);
            let coordinator = PostCoordinator::new(backend, sessions, Arc::clone(&fetcher));
            coordinator.create(&rest.join(" ")).await?;
            println!("Posted.");
            render(&fetcher);
            Ok(())
        }
        ("edit", [post_id, text @ ..]) if !text.is_empty() => {
            let Some(post_id) = parse_id(post_id) else {
                return usage();
            };
            let fetcher = own_wall_fetcher(config, backend.clone(), sessions.clone(), &session);
            fetcher.load().await;
            let coordinator = PostCoordinator::new(backend, sessions, Arc::clone(&fetcher));
            // The draft opens seeded with the post's current text, as the
            // edit control on a rendered post would.
            if let Some(current) = fetcher
                .status()
                .page()
                .and_then(|page| page.items.iter().find(|p| p.id == post_id))
                .map(|p| p.text.clone())
            {
                coordinator.start_edit(post_id, &current);
            }
            coordinator.update(post_id, &text.join(" ")).await?;
            println!("Updated post {}.", post_id);
            render(&fetcher);
            Ok(())
        }
        ("delete", [post_id]) => {
            let Some(post_id) = parse_id(post_id) else {
                return usage();
            };
            let fetcher = own_wall_fetcher(config, backend.clone(), sessions.clone(), &session);
            fetcher.load().await;
            let coordinator = PostCoordinator::new(backend, sessions, Arc::clone(&fetcher));
            coordinator.delete(post_id).await?;
            println!("Deleted post {}.", post_id);
            render(&fetcher);
            Ok(())
        }
        _ => usage(),
    }
}

fn own_wall_fetcher(
    config: &Config,
    backend: Arc<RestAdapter>,
    sessions: Arc<SessionStore>,
    session: &Session,
) -> Arc<PageFetcher> {
    Arc::new(PageFetcher::new(
        backend,
        sessions,
        SubjectKey::Wall(session.user_id),
        config.wall_page_size,
    ))
}

fn render(fetcher: &PageFetcher) {
    match fetcher.status() {
        PageStatus::Loading => println!("Loading posts..."),
        PageStatus::Empty => println!("No posts found"),
        PageStatus::Ready(page) => render_page(&page),
    }
}

fn render_page(page: &Page<Post>) {
    for post in &page.items {
        println!("#{} by {} ({})", post.id, post.author_name, post.created_at);
        println!("  {}", post.text);
    }
    println!(
        "Page {} of {}{}{}",
        page.page_index + 1,
        page.total_pages,
        if page.first { "" } else { " [prev]" },
        if page.last { "" } else { " [next]" },
    );
}

fn parse_page(arg: Option<&String>) -> Option<u32> {
    match arg {
        Some(raw) => raw.parse::<u32>().ok(),
        None => Some(0),
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok()
}

fn usage() -> Result<(), ClientError> {
    println!(
        "Usage:\n  client login <username> <password>\n  client logout\n  client whoami\n  client feed [page]\n  client wall <user-id> [page]\n  client post <text>\n  client edit <post-id> <text>\n  client delete <post-id>"
    );
    Ok(())
}
