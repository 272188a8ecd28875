//! In-memory [`ArticleStore`] and [`CategoryLookup`] for tests and
//! embedders that do not need durability.
//!
//! All state lives behind one `std::sync::RwLock`, so every operation is
//! atomic with respect to the others.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::models::{
    Article, ArticleChanges, ArticleDetail, AuthorSummary, Category, NewArticle,
};

use super::{ArticleStore, CategoryLookup};

#[derive(Default)]
struct State {
    articles: BTreeMap<i64, Article>,
    categories: HashMap<i64, Category>,
    authors: HashMap<i64, AuthorSummary>,
    next_article_id: i64,
    next_category_id: i64,
    next_author_id: i64,
}

/// In-memory primary store.
#[derive(Default)]
pub struct InMemoryArticleStore {
    state: RwLock<State>,
}

impl InMemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a category and return it with its assigned id.
    pub fn add_category(&self, name: &str) -> Result<Category> {
        let mut state = self.write()?;
        state.next_category_id += 1;
        let category = Category {
            id: state.next_category_id,
            name: name.to_string(),
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    /// Rename a category. Existing search documents keep the old name
    /// until the article is rewritten or reindexed.
    pub fn rename_category(&self, id: i64, name: &str) -> Result<()> {
        let mut state = self.write()?;
        let category = state
            .categories
            .get_mut(&id)
            .ok_or_else(|| Error::category_not_found(id))?;
        category.name = name.to_string();
        Ok(())
    }

    /// Register an author and return its summary.
    pub fn add_author(&self, email: &str) -> Result<AuthorSummary> {
        let mut state = self.write()?;
        state.next_author_id += 1;
        let author = AuthorSummary {
            id: state.next_author_id,
            email: email.to_string(),
        };
        state.authors.insert(author.id, author.clone());
        Ok(author)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| Error::Store("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| Error::Store("in-memory store lock poisoned".to_string()))
    }
}

fn detail(state: &State, article: &Article) -> ArticleDetail {
    ArticleDetail {
        article: article.clone(),
        author: state.authors.get(&article.author_id).cloned(),
        category: state.categories.get(&article.category_id).cloned(),
    }
}

#[async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn insert(&self, new: &NewArticle) -> Result<Article> {
        let mut state = self.write()?;
        if !state.categories.contains_key(&new.category_id) {
            return Err(Error::Store(format!(
                "foreign key violation: category {} does not exist",
                new.category_id
            )));
        }
        state.next_article_id += 1;
        let article = Article {
            id: state.next_article_id,
            title: new.title.clone(),
            content: new.content.clone(),
            category_id: new.category_id,
            author_id: new.author_id,
            created_at: Utc::now(),
        };
        state.articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn update(&self, id: i64, changes: &ArticleChanges) -> Result<Article> {
        let mut state = self.write()?;
        if let Some(category_id) = changes.category_id {
            if !state.categories.contains_key(&category_id) {
                return Err(Error::Store(format!(
                    "foreign key violation: category {} does not exist",
                    category_id
                )));
            }
        }
        let article = state
            .articles
            .get_mut(&id)
            .ok_or_else(|| Error::article_not_found(id))?;
        changes.apply_to(article);
        Ok(article.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut state = self.write()?;
        state
            .articles
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::article_not_found(id))
    }

    async fn get(&self, id: i64) -> Result<Option<ArticleDetail>> {
        let state = self.read()?;
        Ok(state.articles.get(&id).map(|a| detail(&state, a)))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<ArticleDetail>> {
        let state = self.read()?;
        let mut articles: Vec<&Article> = state.articles.values().collect();
        articles.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(articles
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|a| detail(&state, a))
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.read()?.articles.len() as i64)
    }

    async fn batch_after(&self, after_id: i64, limit: i64) -> Result<Vec<Article>> {
        let state = self.read()?;
        Ok(state
            .articles
            .range(after_id.saturating_add(1)..)
            .take(limit.max(0) as usize)
            .map(|(_, a)| a.clone())
            .collect())
    }
}

#[async_trait]
impl CategoryLookup for InMemoryArticleStore {
    async fn category(&self, id: i64) -> Result<Category> {
        self.read()?
            .categories
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::category_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_article(title: &str, category_id: i64) -> NewArticle {
        NewArticle {
            title: title.to_string(),
            content: format!("{} body", title),
            category_id,
            author_id: 1,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = InMemoryArticleStore::new();
        let tech = store.add_category("Tech").unwrap();
        let a = store.insert(&new_article("A", tech.id)).await.unwrap();
        let b = store.insert(&new_article("B", tech.id)).await.unwrap();
        assert!(b.id > a.id);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_rejects_unknown_category() {
        let store = InMemoryArticleStore::new();
        let err = store.insert(&new_article("A", 99)).await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn test_get_joins_author_and_category() {
        let store = InMemoryArticleStore::new();
        let tech = store.add_category("Tech").unwrap();
        let author = store.add_author("ada@example.com").unwrap();
        let mut new = new_article("A", tech.id);
        new.author_id = author.id;
        let a = store.insert(&new).await.unwrap();

        let detail = store.get(a.id).await.unwrap().unwrap();
        assert_eq!(detail.author, Some(author));
        assert_eq!(detail.category, Some(tech));
        assert!(store.get(a.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_are_not_found() {
        let store = InMemoryArticleStore::new();
        let err = store
            .update(5, &ArticleChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let err = store.delete(5).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = InMemoryArticleStore::new();
        let tech = store.add_category("Tech").unwrap();
        for title in ["first", "second", "third"] {
            store.insert(&new_article(title, tech.id)).await.unwrap();
        }
        let titles: Vec<String> = store
            .list(0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.article.title)
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);

        let page = store.list(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].article.title, "second");
    }

    #[tokio::test]
    async fn test_batch_after_walks_by_id() {
        let store = InMemoryArticleStore::new();
        let tech = store.add_category("Tech").unwrap();
        for i in 0..5 {
            store
                .insert(&new_article(&format!("a{}", i), tech.id))
                .await
                .unwrap();
        }
        let first = store.batch_after(0, 2).await.unwrap();
        assert_eq!(first.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);
        let rest = store.batch_after(2, 10).await.unwrap();
        assert_eq!(rest.iter().map(|a| a.id).collect::<Vec<_>>(), vec![3, 4, 5]);
        assert!(store.batch_after(5, 10).await.unwrap().is_empty());
    }
}
