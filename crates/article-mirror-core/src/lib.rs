//! # Article Mirror Core
//!
//! Backend-agnostic logic for Article Mirror: data models, the projection
//! builder, the primary store and search index traits, the synchronization
//! controller, and the query router.
//!
//! This crate contains no tokio, sqlx, or HTTP dependencies. Concrete
//! backends live in the `article-mirror` crate; the in-memory adapters here
//! back the unit tests and embedders that do not need durability.
//!
//! ```text
//!   mutation ──▶ SyncController ──▶ ArticleStore ──▶ projection ──▶ SearchIndex
//!   read     ──▶ QueryRouter ──┬──▶ ArticleStore      (list / get)
//!                              └──▶ SearchIndex       (search)
//! ```

pub mod auth;
pub mod error;
pub mod index;
pub mod models;
pub mod projection;
pub mod query;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
