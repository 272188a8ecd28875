//! Wiring: builds the controller and router over the SQLite backends.
//!
//! [`App`] is what the CLI commands and the HTTP server share. It owns one
//! pool per database, the [`SyncController`] for writes, the
//! [`QueryRouter`] for reads, and the [`Verifier`] that guards mutations.

use anyhow::Result;
use std::sync::Arc;

use article_mirror_core::auth::{Principal, Verifier};
use article_mirror_core::query::QueryRouter;
use article_mirror_core::sync::SyncController;
use article_mirror_core::Error;

use crate::auth::JwtVerifier;
use crate::config::Config;
use crate::db;
use crate::sqlite_index::SqliteSearchIndex;
use crate::sqlite_store::SqliteArticleStore;

pub struct App {
    pub sync: SyncController,
    pub query: QueryRouter,
    pub store: Arc<SqliteArticleStore>,
    pub index: Arc<SqliteSearchIndex>,
    verifier: Option<Arc<dyn Verifier>>,
}

impl App {
    /// Open both databases, verifying tokens with the secret named by
    /// `[auth].secret_env`.
    pub async fn open(config: &Config) -> Result<Self> {
        let verifier = JwtVerifier::from_env(&config.auth.secret_env)?;
        Self::open_with_verifier(config, Arc::new(verifier)).await
    }

    /// Open both databases with a caller-supplied verifier.
    pub async fn open_with_verifier(config: &Config, verifier: Arc<dyn Verifier>) -> Result<Self> {
        Self::build(config, Some(verifier)).await
    }

    /// Open both databases for commands that never mutate. Every
    /// capability check is refused.
    pub async fn open_read_only(config: &Config) -> Result<Self> {
        Self::build(config, None).await
    }

    async fn build(config: &Config, verifier: Option<Arc<dyn Verifier>>) -> Result<Self> {
        let store = Arc::new(SqliteArticleStore::new(db::connect(config).await?));
        let index = Arc::new(SqliteSearchIndex::new(
            db::connect_index(config).await?,
            &config.index.name,
        )?);

        let sync = SyncController::new(store.clone(), store.clone(), index.clone())
            .with_batch_size(config.reindex.batch_size);
        let query = QueryRouter::new(store.clone(), index.clone())
            .with_pagination(config.pagination.to_pagination())
            .with_search_limit(config.search.max_results);

        Ok(Self {
            sync,
            query,
            store,
            index,
            verifier,
        })
    }

    /// Run the capability check on a raw bearer credential.
    pub fn authorize(&self, credential: Option<&str>) -> article_mirror_core::Result<Principal> {
        match &self.verifier {
            Some(verifier) => verifier.verify(credential),
            None => Err(Error::Forbidden("no token verifier configured".into())),
        }
    }

    pub async fn close(&self) {
        self.store.pool().close().await;
        self.index.pool().close().await;
    }
}
