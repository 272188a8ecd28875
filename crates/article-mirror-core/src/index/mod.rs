//! Search index abstraction.
//!
//! The search index is the mirror: a rebuildable projection of the primary
//! store tuned for free-text queries. Every write is keyed by the document
//! id, so re-applying the same write overwrites instead of duplicating.

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::models::{SearchDocument, SearchField, SearchHit};

/// Outcome of a [`SearchIndex::bulk_replace`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkReport {
    /// Documents present in the index after the replace.
    pub written: usize,
    /// Documents the backend rejected.
    pub failed: Vec<DocumentFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentFailure {
    pub id: String,
    pub reason: String,
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert or overwrite the document with `doc.id`.
    async fn upsert(&self, doc: &SearchDocument) -> Result<()>;

    /// Remove the document with `id`. Removing an absent id succeeds.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Replace the entire document set with `docs`.
    ///
    /// Documents not in `docs` are removed. Readers observe either the old
    /// set or the new one.
    async fn bulk_replace(&self, docs: &[SearchDocument]) -> Result<BulkReport>;

    /// Multi-field relevance match, best first, at most `limit` hits.
    ///
    /// Tie order is backend-defined. Text without any searchable term
    /// yields no hits.
    async fn query(
        &self,
        text: &str,
        fields: &[SearchField],
        limit: usize,
    ) -> Result<Vec<SearchHit>>;

    /// Number of documents currently indexed.
    async fn count(&self) -> Result<usize>;
}
