//! Core data models.
//!
//! [`Article`] is the canonical record owned by the primary store.
//! [`SearchDocument`] is its denormalized projection owned by the search
//! index. Everything serializes in camelCase, which is the shape the HTTP
//! API exposes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical article record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Store-assigned, immutable once created.
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category_id: i64,
    /// Acting principal at creation. Never changes afterwards.
    pub author_id: i64,
    /// Assigned at creation; default list ordering key.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Public view of an article's author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: i64,
    pub email: String,
}

/// An article with its author and category joined in.
///
/// Returned by `get` and by every row of `list`. The joins are optional so a
/// dangling reference degrades to a missing summary instead of a failed read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: Article,
    pub author: Option<AuthorSummary>,
    pub category: Option<Category>,
}

/// Caller-supplied article fields, as they arrive from a transport.
///
/// Create requires all three; update applies whichever are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<i64>,
}

/// A validated insert, ready for the primary store.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub category_id: i64,
    pub author_id: i64,
}

/// A validated partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<i64>,
}

impl ArticleChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.category_id.is_none()
    }

    /// Apply the changes to an in-memory copy of an article.
    pub fn apply_to(&self, article: &mut Article) {
        if let Some(ref title) = self.title {
            article.title = title.clone();
        }
        if let Some(ref content) = self.content {
            article.content = content.clone();
        }
        if let Some(category_id) = self.category_id {
            article.category_id = category_id;
        }
    }
}

/// The document shape stored in the search index.
///
/// Always derived from an [`Article`] plus its category name by
/// [`crate::projection::project`]; never edited on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    /// String form of the article id.
    pub id: String,
    pub title: String,
    pub content: String,
    pub category_id: i64,
    /// Denormalized at write time.
    pub category_name: String,
    pub author_id: i64,
}

/// Text fields a query can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Title,
    Content,
    CategoryName,
}

impl SearchField {
    /// Every text field, in the order the router queries them.
    pub const ALL: [SearchField; 3] = [
        SearchField::Title,
        SearchField::Content,
        SearchField::CategoryName,
    ];

    /// Relative weight of a match in this field.
    pub fn boost(self) -> f64 {
        match self {
            SearchField::Title => 3.0,
            SearchField::CategoryName => 2.0,
            SearchField::Content => 1.0,
        }
    }

    pub fn of(self, doc: &SearchDocument) -> &str {
        match self {
            SearchField::Title => &doc.title,
            SearchField::Content => &doc.content,
            SearchField::CategoryName => &doc.category_name,
        }
    }
}

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub document: SearchDocument,
    /// Backend relevance score; higher is better.
    pub score: f64,
}

/// Split text into lowercase alphanumeric terms.
///
/// Shared by the in-memory index and the FTS5 query builder so both
/// backends agree on what counts as a searchable term.
pub fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article {
            id: 4,
            title: "Rust ownership".to_string(),
            content: "Borrowing rules".to_string(),
            category_id: 1,
            author_id: 9,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_article_serializes_camel_case() {
        let json = serde_json::to_value(article()).unwrap();
        assert_eq!(json["categoryId"], 1);
        assert_eq!(json["authorId"], 9);
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_detail_flattens_article() {
        let detail = ArticleDetail {
            article: article(),
            author: Some(AuthorSummary {
                id: 9,
                email: "a@example.com".to_string(),
            }),
            category: None,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["author"]["email"], "a@example.com");
        assert!(json["category"].is_null());
    }

    #[test]
    fn test_changes_apply_only_present_fields() {
        let mut a = article();
        let changes = ArticleChanges {
            content: Some("New body".to_string()),
            ..Default::default()
        };
        changes.apply_to(&mut a);
        assert_eq!(a.title, "Rust ownership");
        assert_eq!(a.content, "New body");
        assert!(!changes.is_empty());
        assert!(ArticleChanges::default().is_empty());
    }

    #[test]
    fn test_terms_lowercases_and_splits_punctuation() {
        assert_eq!(terms("Go, basics!  RUST"), vec!["go", "basics", "rust"]);
        assert!(terms("  --- ").is_empty());
    }
}
