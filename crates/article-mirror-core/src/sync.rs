//! Synchronization controller: every mutation, fanned out to both stores.
//!
//! # Ordering
//!
//! The canonical write always happens first. The mirror write follows as a
//! separate, best-effort step, so the mirror is either equal to the primary
//! store or behind it, never ahead. A mirror failure after a committed
//! canonical write is logged and reported as [`MirrorStatus::Degraded`]; it
//! is never rolled back and never turned into a request failure.
//!
//! # Repair
//!
//! [`SyncController::reindex`] is the only repair path. It walks the
//! primary store in keyset batches, projects every article, and replaces
//! the mirror's whole document set in one call. Running it twice with no
//! writes in between leaves the mirror unchanged.
//!
//! The replace writes the snapshot read during the walk. An article deleted
//! after its batch was read but before the replace lands is written back
//! into the mirror and stays there until the next reindex. Writes that race
//! a reindex can leave drift of this kind; they never touch the primary
//! store.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::Principal;
use crate::error::{Error, Result};
use crate::index::{DocumentFailure, SearchIndex};
use crate::models::{Article, ArticleChanges, ArticleFields, Category, NewArticle};
use crate::projection::project;
use crate::store::{ArticleStore, CategoryLookup};

/// Default number of articles read per reindex round trip.
pub const DEFAULT_REINDEX_BATCH: i64 = 500;

/// State of the mirror after a mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MirrorStatus {
    Synced,
    /// The canonical write committed but the mirror write did not. The
    /// record stays drifted until the next reindex.
    Degraded { reason: String },
}

/// Result of a mutation: the canonical value plus the mirror outcome.
#[derive(Debug, Clone)]
pub struct Synced<T> {
    pub value: T,
    pub mirror: MirrorStatus,
}

impl<T> Synced<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self.mirror, MirrorStatus::Degraded { .. })
    }

    /// Soft warning for transports that can carry one.
    pub fn warning(&self) -> Option<&str> {
        match &self.mirror {
            MirrorStatus::Synced => None,
            MirrorStatus::Degraded { reason } => Some(reason),
        }
    }
}

/// An article reindex could not project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedArticle {
    pub id: i64,
    pub reason: String,
}

/// Outcome of [`SyncController::reindex`].
///
/// `count < expected` means some articles are not mirrored; `skipped` and
/// `failed` say which ones and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReindexReport {
    /// Documents in the mirror after the replace.
    pub count: usize,
    /// Articles read from the primary store.
    pub expected: usize,
    pub skipped: Vec<SkippedArticle>,
    pub failed: Vec<DocumentFailure>,
}

impl ReindexReport {
    pub fn is_complete(&self) -> bool {
        self.count == self.expected && self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Canonical versus mirrored document counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftStatus {
    pub canonical: i64,
    pub mirrored: usize,
}

impl DriftStatus {
    pub fn drift(&self) -> i64 {
        self.canonical - self.mirrored as i64
    }
}

/// Orchestrates mutations across the primary store and the search index.
#[derive(Clone)]
pub struct SyncController {
    store: Arc<dyn ArticleStore>,
    categories: Arc<dyn CategoryLookup>,
    index: Arc<dyn SearchIndex>,
    batch_size: i64,
}

impl SyncController {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        categories: Arc<dyn CategoryLookup>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        Self {
            store,
            categories,
            index,
            batch_size: DEFAULT_REINDEX_BATCH,
        }
    }

    /// Set the reindex batch size. Values below 1 are clamped to 1.
    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Create an article authored by `principal`.
    pub async fn create(
        &self,
        fields: &ArticleFields,
        principal: &Principal,
    ) -> Result<Synced<Article>> {
        let title = required_text("title", fields.title.as_deref())?;
        let content = required_text("content", fields.content.as_deref())?;
        let category_id = fields
            .category_id
            .ok_or_else(|| Error::validation("categoryId is required"))?;
        let category = self.resolve_category(category_id).await?;

        let new = NewArticle {
            title,
            content,
            category_id,
            author_id: principal.user_id,
        };
        let article = self.store.insert(&new).await?;
        info!(article_id = article.id, author_id = article.author_id, "article created");

        let mirror = self.mirror_upsert(&article, Some(&category.name)).await;
        Ok(Synced {
            value: article,
            mirror,
        })
    }

    /// Apply a partial update to article `id`.
    pub async fn update(
        &self,
        id: i64,
        fields: &ArticleFields,
        principal: &Principal,
    ) -> Result<Synced<Article>> {
        if self.store.get(id).await?.is_none() {
            return Err(Error::article_not_found(id));
        }

        let changes = ArticleChanges {
            title: optional_text("title", fields.title.as_deref())?,
            content: optional_text("content", fields.content.as_deref())?,
            category_id: fields.category_id,
        };
        let mut category_name = None;
        if let Some(category_id) = changes.category_id {
            category_name = Some(self.resolve_category(category_id).await?.name);
        }

        let article = self.store.update(id, &changes).await?;
        info!(article_id = id, updated_by = principal.user_id, "article updated");

        let category_name = match category_name {
            Some(name) => Some(name),
            None => self.category_name_for_mirror(&article).await,
        };
        let mirror = self.mirror_upsert(&article, category_name.as_deref()).await;
        Ok(Synced {
            value: article,
            mirror,
        })
    }

    /// Delete article `id` from the primary store, then from the mirror.
    pub async fn delete(&self, id: i64, principal: &Principal) -> Result<Synced<()>> {
        self.store.delete(id).await?;
        info!(article_id = id, deleted_by = principal.user_id, "article deleted");

        let mirror = match self.index.delete(&id.to_string()).await {
            Ok(()) => MirrorStatus::Synced,
            Err(e) => {
                warn!(
                    article_id = id,
                    error = %e,
                    "mirror delete failed; stale document remains until reindex"
                );
                MirrorStatus::Degraded {
                    reason: format!("search document not deleted: {}", e),
                }
            }
        };
        Ok(Synced { value: (), mirror })
    }

    /// Rebuild the mirror from the primary store.
    ///
    /// A primary store failure aborts before the mirror is touched. Articles
    /// whose category cannot be resolved are skipped and reported.
    pub async fn reindex(&self, principal: &Principal) -> Result<ReindexReport> {
        info!(
            requested_by = principal.user_id,
            batch_size = self.batch_size,
            "reindex started"
        );

        let mut names: HashMap<i64, Option<String>> = HashMap::new();
        let mut docs = Vec::new();
        let mut skipped = Vec::new();
        let mut expected = 0usize;
        let mut cursor = 0i64;

        loop {
            let batch = self.store.batch_after(cursor, self.batch_size).await?;
            let Some(last) = batch.last() else {
                break;
            };
            cursor = last.id;
            expected += batch.len();

            for article in &batch {
                let name = match names.get(&article.category_id) {
                    Some(cached) => cached.clone(),
                    None => {
                        let resolved = match self.categories.category(article.category_id).await {
                            Ok(category) => Some(category.name),
                            Err(Error::NotFound(_)) => None,
                            Err(e) => return Err(e),
                        };
                        names.insert(article.category_id, resolved.clone());
                        resolved
                    }
                };
                match project(article, name.as_deref()) {
                    Ok(doc) => docs.push(doc),
                    Err(e) => skipped.push(SkippedArticle {
                        id: article.id,
                        reason: e.to_string(),
                    }),
                }
            }

            if (batch.len() as i64) < self.batch_size {
                break;
            }
        }

        let bulk = self.index.bulk_replace(&docs).await?;
        let report = ReindexReport {
            count: bulk.written,
            expected,
            skipped,
            failed: bulk.failed,
        };

        if report.is_complete() {
            info!(count = report.count, "reindex finished");
        } else {
            warn!(
                count = report.count,
                expected = report.expected,
                skipped = report.skipped.len(),
                failed = report.failed.len(),
                "reindex finished with missing documents"
            );
        }
        Ok(report)
    }

    /// Compare canonical and mirrored counts.
    pub async fn drift_status(&self) -> Result<DriftStatus> {
        Ok(DriftStatus {
            canonical: self.store.count().await?,
            mirrored: self.index.count().await?,
        })
    }

    async fn resolve_category(&self, id: i64) -> Result<Category> {
        match self.categories.category(id).await {
            Ok(category) => Ok(category),
            Err(Error::NotFound(_)) => Err(Error::validation(format!(
                "categoryId {} does not reference an existing category",
                id
            ))),
            Err(e) => Err(e),
        }
    }

    /// Category name for a mirror write after the canonical write has
    /// committed. Lookup failures only degrade the mirror.
    async fn category_name_for_mirror(&self, article: &Article) -> Option<String> {
        match self.categories.category(article.category_id).await {
            Ok(category) => Some(category.name),
            Err(e) => {
                warn!(
                    article_id = article.id,
                    category_id = article.category_id,
                    error = %e,
                    "category lookup failed for mirror write"
                );
                None
            }
        }
    }

    async fn mirror_upsert(&self, article: &Article, category_name: Option<&str>) -> MirrorStatus {
        let written = match project(article, category_name) {
            Ok(doc) => self.index.upsert(&doc).await,
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => MirrorStatus::Synced,
            Err(e) => {
                warn!(
                    article_id = article.id,
                    error = %e,
                    "mirror upsert failed; article left for reindex"
                );
                MirrorStatus::Degraded {
                    reason: format!("search document not updated: {}", e),
                }
            }
        }
    }
}

fn required_text(field: &str, value: Option<&str>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(Error::validation(format!("{} is required", field))),
    }
}

fn optional_text(field: &str, value: Option<&str>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => {
            Err(Error::validation(format!("{} must not be empty", field)))
        }
        Some(v) => Ok(Some(v.to_string())),
    }
}
