//! Primary store abstraction.
//!
//! The primary store is the system of record. [`ArticleStore`] covers the
//! canonical article table; [`CategoryLookup`] resolves the category names
//! the projection needs. Both are async (via `async-trait`) and must be
//! `Send + Sync` so one instance can serve concurrent requests.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`insert`](ArticleStore::insert) | Create an article, assigning id and timestamp |
//! | [`update`](ArticleStore::update) | Apply a partial update |
//! | [`delete`](ArticleStore::delete) | Remove an article |
//! | [`get`](ArticleStore::get) | Fetch one article with author and category joined |
//! | [`list`](ArticleStore::list) | Page through articles, newest first |
//! | [`count`](ArticleStore::count) | Total number of articles |
//! | [`batch_after`](ArticleStore::batch_after) | Keyset scan by id, for reindex |

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Article, ArticleChanges, ArticleDetail, Category, NewArticle};

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert a new article. The store assigns `id` and `created_at`.
    async fn insert(&self, new: &NewArticle) -> Result<Article>;

    /// Apply `changes` to article `id` and return the stored result.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) when the id does not exist.
    async fn update(&self, id: i64, changes: &ArticleChanges) -> Result<Article>;

    /// Delete article `id`.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) when the id does not exist.
    async fn delete(&self, id: i64) -> Result<()>;

    async fn get(&self, id: i64) -> Result<Option<ArticleDetail>>;

    /// Articles ordered by `created_at` descending (ties: id descending).
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<ArticleDetail>>;

    async fn count(&self) -> Result<i64>;

    /// Up to `limit` articles with `id > after_id`, ascending by id.
    async fn batch_after(&self, after_id: i64, limit: i64) -> Result<Vec<Article>>;
}

#[async_trait]
pub trait CategoryLookup: Send + Sync {
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) when the category does not exist.
    async fn category(&self, id: i64) -> Result<Category>;
}
