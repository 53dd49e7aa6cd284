//! services/client/src/adapters/mod.rs
//!
//! Concrete implementations of the ports defined in the `postwall_core` crate.

pub mod http;
pub mod mock;
pub mod storage;
