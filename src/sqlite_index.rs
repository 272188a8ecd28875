//! SQLite FTS5-backed search mirror.
//!
//! The mirror lives in its own database file (see [`crate::db::connect_index`])
//! as a single FTS5 table, one row per article, keyed by the string article
//! id in the `doc_id` column. Every write commits before returning, so a
//! document is searchable as soon as the call completes.
//!
//! Ranking is FTS5 BM25 with per-column weights: title 3.0, category name
//! 2.0, content 1.0. Scores are negated so that higher is better.

use anyhow::bail;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::collections::BTreeMap;

use article_mirror_core::index::{BulkReport, DocumentFailure, SearchIndex};
use article_mirror_core::models::{terms, SearchDocument, SearchField, SearchHit};
use article_mirror_core::{Error, Result};

use crate::config::is_valid_table_name;

pub struct SqliteSearchIndex {
    pool: SqlitePool,
    table: String,
}

impl SqliteSearchIndex {
    /// Wrap `pool`, writing to the FTS5 table `table`.
    pub fn new(pool: SqlitePool, table: &str) -> anyhow::Result<Self> {
        if !is_valid_table_name(table) {
            bail!("invalid index table name: '{}'", table);
        }
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Every indexed document, ordered by id.
    pub async fn documents(&self) -> Result<Vec<SearchDocument>> {
        let rows = sqlx::query(&format!(
            "SELECT doc_id, title, content, category_id, category_name, author_id FROM {} ORDER BY doc_id",
            self.table
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(index_err)?;
        rows.iter().map(document_from_row).collect()
    }

    async fn insert(&self, conn: &mut SqliteConnection, doc: &SearchDocument) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO {} (doc_id, title, content, category_id, category_name, author_id) VALUES (?, ?, ?, ?, ?, ?)",
            self.table
        ))
        .bind(&doc.id)
        .bind(&doc.title)
        .bind(&doc.content)
        .bind(doc.category_id)
        .bind(&doc.category_name)
        .bind(doc.author_id)
        .execute(conn)
        .await
        .map_err(index_err)?;
        Ok(())
    }
}

fn index_err(e: sqlx::Error) -> Error {
    Error::Index(e.to_string())
}

fn column(field: SearchField) -> &'static str {
    match field {
        SearchField::Title => "title",
        SearchField::Content => "content",
        SearchField::CategoryName => "category_name",
    }
}

/// Build an FTS5 MATCH expression: any of the query terms, restricted to
/// `fields`. Terms are quoted so user input never reaches the FTS5 query
/// grammar. Returns `None` when there is nothing to match.
pub fn match_expression(text: &str, fields: &[SearchField]) -> Option<String> {
    let query_terms = terms(text);
    if query_terms.is_empty() || fields.is_empty() {
        return None;
    }
    let columns: Vec<&str> = fields.iter().map(|f| column(*f)).collect();
    let phrases: Vec<String> = query_terms.iter().map(|t| format!("\"{}\"", t)).collect();
    Some(format!(
        "{{{}}} : ({})",
        columns.join(" "),
        phrases.join(" OR ")
    ))
}

fn document_from_row(row: &SqliteRow) -> Result<SearchDocument> {
    Ok(SearchDocument {
        id: row.try_get("doc_id").map_err(index_err)?,
        title: row.try_get("title").map_err(index_err)?,
        content: row.try_get("content").map_err(index_err)?,
        category_id: row.try_get("category_id").map_err(index_err)?,
        category_name: row.try_get("category_name").map_err(index_err)?,
        author_id: row.try_get("author_id").map_err(index_err)?,
    })
}

#[async_trait]
impl SearchIndex for SqliteSearchIndex {
    async fn upsert(&self, doc: &SearchDocument) -> Result<()> {
        if doc.id.is_empty() {
            return Err(Error::Index("document id must not be empty".to_string()));
        }
        let mut tx = self.pool.begin().await.map_err(index_err)?;
        sqlx::query(&format!("DELETE FROM {} WHERE doc_id = ?", self.table))
            .bind(&doc.id)
            .execute(&mut *tx)
            .await
            .map_err(index_err)?;
        self.insert(&mut *tx, doc).await?;
        tx.commit().await.map_err(index_err)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query(&format!("DELETE FROM {} WHERE doc_id = ?", self.table))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(index_err)?;
        Ok(())
    }

    async fn bulk_replace(&self, docs: &[SearchDocument]) -> Result<BulkReport> {
        let mut failed = Vec::new();
        let mut unique: BTreeMap<&str, &SearchDocument> = BTreeMap::new();
        for doc in docs {
            if doc.id.is_empty() {
                failed.push(DocumentFailure {
                    id: doc.id.clone(),
                    reason: "document id must not be empty".to_string(),
                });
                continue;
            }
            unique.insert(doc.id.as_str(), doc);
        }

        let mut tx = self.pool.begin().await.map_err(index_err)?;
        sqlx::query(&format!("DELETE FROM {}", self.table))
            .execute(&mut *tx)
            .await
            .map_err(index_err)?;
        for doc in unique.values() {
            self.insert(&mut *tx, doc).await?;
        }
        tx.commit().await.map_err(index_err)?;

        Ok(BulkReport {
            written: unique.len(),
            failed,
        })
    }

    async fn query(
        &self,
        text: &str,
        fields: &[SearchField],
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let expression = match match_expression(text, fields) {
            Some(expr) => expr,
            None => return Ok(Vec::new()),
        };

        let rows = sqlx::query(&format!(
            r#"
            SELECT doc_id, title, content, category_id, category_name, author_id,
                   bm25({t}, 0.0, 3.0, 1.0, 0.0, 2.0, 0.0) AS bm25_rank
            FROM {t}
            WHERE {t} MATCH ?
            ORDER BY bm25_rank
            LIMIT ?
            "#,
            t = self.table
        ))
        .bind(&expression)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(index_err)?;

        rows.iter()
            .map(|row| -> Result<SearchHit> {
                let rank: f64 = row.try_get("bm25_rank").map_err(index_err)?;
                Ok(SearchHit {
                    document: document_from_row(row)?,
                    score: -rank,
                })
            })
            .collect()
    }

    async fn count(&self) -> Result<usize> {
        let n: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table))
            .fetch_one(&self.pool)
            .await
            .map_err(index_err)?;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_expression_quotes_terms() {
        let expr = match_expression("Rust \"ownership\" OR", &SearchField::ALL).unwrap();
        assert_eq!(
            expr,
            r#"{title content category_name} : ("rust" OR "ownership" OR "or")"#
        );
    }

    #[test]
    fn test_match_expression_single_field() {
        let expr = match_expression("tech", &[SearchField::CategoryName]).unwrap();
        assert_eq!(expr, r#"{category_name} : ("tech")"#);
    }

    #[test]
    fn test_match_expression_empty() {
        assert!(match_expression("  *** ", &SearchField::ALL).is_none());
        assert!(match_expression("rust", &[]).is_none());
    }
}
