//! Core types and trait definitions for the Hireboard analytics service.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the engagement recorder, the metrics aggregator, and the identity model
//! both of them (and the HTTP guard) share.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod analytics;
pub mod engagement;
pub mod error;
pub mod identity;
pub mod job;
pub mod recorder;
pub mod store;

#[cfg(test)]
mod memory;

pub use error::{Error, Result};
