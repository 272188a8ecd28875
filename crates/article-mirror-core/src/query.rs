//! Query router: canonical reads go to the primary store, free-text reads
//! go to the search index.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::index::SearchIndex;
use crate::models::{ArticleDetail, SearchField, SearchHit};
use crate::store::ArticleStore;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const DEFAULT_MAX_PAGE_LIMIT: i64 = 100;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Pagination defaults and bounds.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: DEFAULT_MAX_PAGE_LIMIT,
        }
    }
}

impl Pagination {
    /// Resolve optional `page`/`limit` into a usable pair.
    ///
    /// Missing values and values below 1 take the defaults (page 1,
    /// `default_limit`); limits above `max_limit` are capped.
    pub fn resolve(&self, page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit.filter(|l| *l >= 1).unwrap_or(self.default_limit);
        (page, limit.min(self.max_limit))
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub articles: Vec<T>,
}

/// `ceil(total / limit)`; zero when there is nothing to page through.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        0
    } else {
        (total + limit - 1) / limit
    }
}

#[derive(Clone)]
pub struct QueryRouter {
    store: Arc<dyn ArticleStore>,
    index: Arc<dyn SearchIndex>,
    pagination: Pagination,
    search_limit: usize,
}

impl QueryRouter {
    pub fn new(store: Arc<dyn ArticleStore>, index: Arc<dyn SearchIndex>) -> Self {
        Self {
            store,
            index,
            pagination: Pagination::default(),
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit.max(1);
        self
    }

    /// Newest-first page of articles. Pages past the end are empty, not errors.
    pub async fn list(&self, page: Option<i64>, limit: Option<i64>) -> Result<Page<ArticleDetail>> {
        let (page, limit) = self.pagination.resolve(page, limit);
        let total = self.store.count().await?;
        let offset = (page - 1).saturating_mul(limit);

        let articles = if offset >= total {
            Vec::new()
        } else {
            self.store.list(offset, limit).await?
        };

        Ok(Page {
            page,
            limit,
            total,
            total_pages: total_pages(total, limit),
            articles,
        })
    }

    pub async fn get(&self, id: i64) -> Result<ArticleDetail> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| Error::article_not_found(id))
    }

    /// Free-text search over title, content and category name.
    pub async fn search(&self, text: &str) -> Result<Vec<SearchHit>> {
        if text.trim().is_empty() {
            return Err(Error::validation("query must not be empty"));
        }
        self.index
            .query(text, &SearchField::ALL, self.search_limit)
            .await
    }
}
