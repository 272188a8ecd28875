//! Projection builder: canonical article → search document.
//!
//! Create, update and reindex all go through [`project`], so the document
//! shape is defined in exactly one place.

use crate::error::{Error, Result};
use crate::models::{Article, SearchDocument};

/// Build the search document for `article`.
///
/// Fails with [`Error::Validation`] when the category name could not be
/// resolved; a document without its category name is never written.
pub fn project(article: &Article, category_name: Option<&str>) -> Result<SearchDocument> {
    let category_name = match category_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            return Err(Error::validation(format!(
                "category name for category {} could not be resolved",
                article.category_id
            )))
        }
    };

    Ok(SearchDocument {
        id: article.id.to_string(),
        title: article.title.clone(),
        content: article.content.clone(),
        category_id: article.category_id,
        category_name: category_name.to_string(),
        author_id: article.author_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article() -> Article {
        Article {
            id: 42,
            title: "Go basics".to_string(),
            content: "Goroutines and channels".to_string(),
            category_id: 3,
            author_id: 7,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_project_copies_fields_and_stringifies_id() {
        let doc = project(&article(), Some("Tech")).unwrap();
        assert_eq!(doc.id, "42");
        assert_eq!(doc.title, "Go basics");
        assert_eq!(doc.content, "Goroutines and channels");
        assert_eq!(doc.category_id, 3);
        assert_eq!(doc.category_name, "Tech");
        assert_eq!(doc.author_id, 7);
    }

    #[test]
    fn test_project_requires_category_name() {
        let err = project(&article(), None).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = project(&article(), Some("   ")).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_project_is_deterministic() {
        let a = article();
        assert_eq!(project(&a, Some("Tech")).unwrap(), project(&a, Some("Tech")).unwrap());
    }
}
