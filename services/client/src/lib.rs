//! services/client/src/lib.rs
//!
//! The client-side data layer for the postwall social network UI: a session
//! store, an access gate, a paged post fetcher, and a post mutation
//! coordinator, all wired to the REST backend through the `postwall_core` ports.

pub mod adapters;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod gate;
pub mod posts;
pub mod profile;
pub mod session;
