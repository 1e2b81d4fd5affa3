//! Core types and logic for the screening-campaign record store.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! SQLite backend, the JSON API and the terminal client all depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod browse;
pub mod error;
pub mod export;
pub mod fallback;
pub mod intake;
pub mod memory;
pub mod record;
pub mod sequence;
pub mod stats;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{Classify, Error, ErrorKind, Result};
