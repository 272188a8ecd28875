//! In-memory [`SearchIndex`] for tests and embedders.
//!
//! Scores are a boosted term-frequency sum, length-normalized per field:
//! `Σ boost(field) × tf(term, field) / √len(field)`. Good enough to rank a
//! title hit above a content hit; not meant to match BM25.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{terms, SearchDocument, SearchField, SearchHit};

use super::{BulkReport, DocumentFailure, SearchIndex};

#[derive(Default)]
pub struct InMemorySearchIndex {
    docs: RwLock<HashMap<String, SearchDocument>>,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// All documents, sorted by id. Used to compare mirror states.
    pub fn snapshot(&self) -> Result<Vec<SearchDocument>> {
        let docs = self.docs.read().map_err(poisoned)?;
        let mut all: Vec<SearchDocument> = docs.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    pub fn get(&self, id: &str) -> Result<Option<SearchDocument>> {
        Ok(self.docs.read().map_err(poisoned)?.get(id).cloned())
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::Index("in-memory index lock poisoned".to_string())
}

fn score(doc: &SearchDocument, query_terms: &[String], fields: &[SearchField]) -> f64 {
    let mut total = 0.0;
    for field in fields {
        let field_terms = terms(field.of(doc));
        if field_terms.is_empty() {
            continue;
        }
        let norm = (field_terms.len() as f64).sqrt();
        for term in query_terms {
            let tf = field_terms.iter().filter(|t| *t == term).count();
            total += field.boost() * tf as f64 / norm;
        }
    }
    total
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn upsert(&self, doc: &SearchDocument) -> Result<()> {
        if doc.id.is_empty() {
            return Err(Error::Index("document id must not be empty".to_string()));
        }
        self.docs
            .write()
            .map_err(poisoned)?
            .insert(doc.id.clone(), doc.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.docs.write().map_err(poisoned)?.remove(id);
        Ok(())
    }

    async fn bulk_replace(&self, docs: &[SearchDocument]) -> Result<BulkReport> {
        let mut fresh = HashMap::with_capacity(docs.len());
        let mut failed = Vec::new();
        for doc in docs {
            if doc.id.is_empty() {
                failed.push(DocumentFailure {
                    id: doc.id.clone(),
                    reason: "document id must not be empty".to_string(),
                });
                continue;
            }
            fresh.insert(doc.id.clone(), doc.clone());
        }
        let written = fresh.len();
        *self.docs.write().map_err(poisoned)? = fresh;
        Ok(BulkReport { written, failed })
    }

    async fn query(
        &self,
        text: &str,
        fields: &[SearchField],
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let query_terms = terms(text);
        if query_terms.is_empty() || fields.is_empty() {
            return Ok(Vec::new());
        }
        let docs = self.docs.read().map_err(poisoned)?;
        let mut hits: Vec<SearchHit> = docs
            .values()
            .filter_map(|doc| {
                let s = score(doc, &query_terms, fields);
                (s > 0.0).then(|| SearchHit {
                    document: doc.clone(),
                    score: s,
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.docs.read().map_err(poisoned)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str, content: &str, category: &str) -> SearchDocument {
        SearchDocument {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            category_id: 1,
            category_name: category.to_string(),
            author_id: 1,
        }
    }

    #[tokio::test]
    async fn test_upsert_overwrites_same_id() {
        let index = InMemorySearchIndex::new();
        index.upsert(&doc("1", "Old", "x", "Tech")).await.unwrap();
        index.upsert(&doc("1", "New", "x", "Tech")).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 1);
        assert_eq!(index.get("1").unwrap().unwrap().title, "New");
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok() {
        let index = InMemorySearchIndex::new();
        index.delete("nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_title_match_outranks_content_match() {
        let index = InMemorySearchIndex::new();
        index
            .upsert(&doc("1", "Cooking", "ownership of the kitchen", "Food"))
            .await
            .unwrap();
        index
            .upsert(&doc("2", "Rust ownership", "borrowing", "Tech"))
            .await
            .unwrap();
        let hits = index
            .query("ownership", &SearchField::ALL, 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.id, "2");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_query_respects_field_selection() {
        let index = InMemorySearchIndex::new();
        index.upsert(&doc("1", "Go basics", "x", "Tech")).await.unwrap();
        let hits = index
            .query("tech", &[SearchField::Title], 10)
            .await
            .unwrap();
        assert!(hits.is_empty());
        let hits = index
            .query("tech", &[SearchField::CategoryName], 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_replace_drops_absent_documents() {
        let index = InMemorySearchIndex::new();
        index.upsert(&doc("stale", "Gone", "x", "Tech")).await.unwrap();
        let report = index
            .bulk_replace(&[doc("1", "A", "x", "Tech"), doc("", "bad", "x", "Tech")])
            .await
            .unwrap();
        assert_eq!(report.written, 1);
        assert_eq!(report.failed.len(), 1);
        assert!(index.get("stale").unwrap().is_none());
        assert_eq!(index.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_query_without_terms_is_empty() {
        let index = InMemorySearchIndex::new();
        index.upsert(&doc("1", "A", "x", "Tech")).await.unwrap();
        assert!(index
            .query("?!", &SearchField::ALL, 10)
            .await
            .unwrap()
            .is_empty());
    }
}
