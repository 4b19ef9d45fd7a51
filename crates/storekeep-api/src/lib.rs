//! `storekeep-api` — async Rust client for the storekeep REST backend.
//!
//! Thin, hand-crafted wrapper over JSON endpoints for products, users,
//! product categories, and the service info/health probes. One request per
//! call — no retries, no auth, no pagination; the backend exposes full
//! collections.
//!
//! Entry point is [`ApiClient`]; all failures surface as [`Error`].

mod client;
mod error;
pub mod types;

pub use client::ApiClient;
pub use error::Error;
