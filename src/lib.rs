//! # Article Mirror
//!
//! Article CRUD over SQLite with a best-effort full-text search mirror.
//!
//! The primary database is the source of truth. Every create, update and
//! delete is written there first, then mirrored into an FTS5 index kept in
//! a separate SQLite file. A failed mirror write never fails the request;
//! the mirror stays behind until `reindex` rebuilds it from the primary
//! store.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────┐
//!   mutations ──▶ │  SyncController  │──▶ primary (articles.sqlite)
//!                 └────────┬─────────┘
//!                          │ best-effort
//!                          ▼
//!                    mirror (search.sqlite, FTS5)
//!                          ▲
//!                 ┌────────┴─────────┐
//!   reads ──────▶ │   QueryRouter    │──▶ primary for get/list
//!                 └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! artmirror init
//! artmirror category add Tech
//! artmirror serve
//! artmirror search "ownership"
//! artmirror reindex --token "$ARTICLE_TOKEN"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | SQLite pools for both databases |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | Primary article store |
//! | [`sqlite_index`] | FTS5 search mirror |
//! | [`auth`] | HS256 bearer token verification |
//! | [`app`] | Wiring shared by the CLI and the server |
//! | [`server`] | HTTP API |
//! | [`telemetry`] | `tracing` subscriber setup |

pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod get;
pub mod migrate;
pub mod reindex;
pub mod search;
pub mod server;
pub mod sqlite_index;
pub mod sqlite_store;
pub mod telemetry;
