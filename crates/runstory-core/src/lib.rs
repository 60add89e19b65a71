//! Core types and trait definitions for runstory.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend, the upstream clients and the HTTP surface all depend on
//! it; it depends on nothing but small utility crates.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod cache;
pub mod error;
pub mod link;
pub mod profile;
pub mod prompt;
pub mod record;
pub mod store;
pub mod token;
pub mod upstream;

pub use error::{Error, Result};
pub use token::Token;
