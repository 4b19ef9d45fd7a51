//! `storekeep-core` — business logic for the storekeep admin client.
//!
//! Sits between the raw REST client (`storekeep-api`) and any frontend.
//! Three responsibilities:
//!
//! - **Snapshot store**: the last successfully fetched full list of each
//!   entity kind, replaced atomically on reload and never partially
//!   applied. Change notification via `watch` channels.
//! - **Filter engine** and **form validation**: pure functions over the
//!   snapshot — no network access.
//! - **[`Backend`]**: a clone-able facade that performs every mutation as
//!   "call the API, then refetch the affected snapshots". Consistency by
//!   discard-and-refetch, not incremental patching.

mod backend;
mod error;
pub mod filter;
pub mod form;
mod store;

pub use backend::Backend;
pub use error::CoreError;
pub use store::Store;

// Re-export the wire types consumers render from.
pub use storekeep_api::types::{AppInfo, HealthStatus, Product, ProductDraft, User, UserDraft};
