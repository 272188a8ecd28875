//! SQLite-backed primary store.
//!
//! Implements [`ArticleStore`] and [`CategoryLookup`] over the `articles`,
//! `categories` and `users` tables created by [`crate::migrate`].
//! Timestamps are stored as Unix milliseconds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use article_mirror_core::models::{
    Article, ArticleChanges, ArticleDetail, AuthorSummary, Category, NewArticle,
};
use article_mirror_core::store::{ArticleStore, CategoryLookup};
use article_mirror_core::{Error, Result};

const DETAIL_SELECT: &str = r#"
    SELECT a.id, a.title, a.content, a.category_id, a.author_id, a.created_at,
           u.email AS author_email, c.name AS category_name
    FROM articles a
    LEFT JOIN users u ON u.id = a.author_id
    LEFT JOIN categories c ON c.id = a.category_id
"#;

/// SQLite implementation of the primary store.
pub struct SqliteArticleStore {
    pool: SqlitePool,
}

impl SqliteArticleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a category. Category management is otherwise external; this
    /// exists for seeding and tests.
    pub async fn add_category(&self, name: &str) -> Result<Category> {
        let id = sqlx::query("INSERT INTO categories (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(store_err)?
            .last_insert_rowid();
        Ok(Category {
            id,
            name: name.to_string(),
        })
    }

    pub async fn rename_category(&self, id: i64, name: &str) -> Result<()> {
        let affected = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?
            .rows_affected();
        if affected == 0 {
            return Err(Error::category_not_found(id));
        }
        Ok(())
    }

    /// Insert a user row so author summaries can be joined.
    pub async fn add_author(&self, email: &str) -> Result<AuthorSummary> {
        let id = sqlx::query("INSERT INTO users (email) VALUES (?)")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(store_err)?
            .last_insert_rowid();
        Ok(AuthorSummary {
            id,
            email: email.to_string(),
        })
    }
}

fn store_err(e: sqlx::Error) -> Error {
    Error::Store(e.to_string())
}

fn millis_to_utc(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| Error::Store(format!("created_at out of range: {}", ms)))
}

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    let created_at: i64 = row.try_get("created_at").map_err(store_err)?;
    Ok(Article {
        id: row.try_get("id").map_err(store_err)?,
        title: row.try_get("title").map_err(store_err)?,
        content: row.try_get("content").map_err(store_err)?,
        category_id: row.try_get("category_id").map_err(store_err)?,
        author_id: row.try_get("author_id").map_err(store_err)?,
        created_at: millis_to_utc(created_at)?,
    })
}

fn detail_from_row(row: &SqliteRow) -> Result<ArticleDetail> {
    let article = article_from_row(row)?;
    let author_email: Option<String> = row.try_get("author_email").map_err(store_err)?;
    let category_name: Option<String> = row.try_get("category_name").map_err(store_err)?;
    Ok(ArticleDetail {
        author: author_email.map(|email| AuthorSummary {
            id: article.author_id,
            email,
        }),
        category: category_name.map(|name| Category {
            id: article.category_id,
            name,
        }),
        article,
    })
}

#[async_trait]
impl ArticleStore for SqliteArticleStore {
    async fn insert(&self, new: &NewArticle) -> Result<Article> {
        let created_ms = Utc::now().timestamp_millis();
        let id = sqlx::query(
            r#"
            INSERT INTO articles (title, content, category_id, author_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.category_id)
        .bind(new.author_id)
        .bind(created_ms)
        .execute(&self.pool)
        .await
        .map_err(store_err)?
        .last_insert_rowid();

        Ok(Article {
            id,
            title: new.title.clone(),
            content: new.content.clone(),
            category_id: new.category_id,
            author_id: new.author_id,
            created_at: millis_to_utc(created_ms)?,
        })
    }

    async fn update(&self, id: i64, changes: &ArticleChanges) -> Result<Article> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let affected = sqlx::query(
            r#"
            UPDATE articles SET
                title = COALESCE(?, title),
                content = COALESCE(?, content),
                category_id = COALESCE(?, category_id)
            WHERE id = ?
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(changes.category_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?
        .rows_affected();

        if affected == 0 {
            return Err(Error::article_not_found(id));
        }

        let row = sqlx::query(
            "SELECT id, title, content, category_id, author_id, created_at FROM articles WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(store_err)?;
        let article = article_from_row(&row)?;

        tx.commit().await.map_err(store_err)?;
        Ok(article)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let affected = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?
            .rows_affected();
        if affected == 0 {
            return Err(Error::article_not_found(id));
        }
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<ArticleDetail>> {
        let row = sqlx::query(&format!("{} WHERE a.id = ?", DETAIL_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.as_ref().map(detail_from_row).transpose()
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<ArticleDetail>> {
        let rows = sqlx::query(&format!(
            "{} ORDER BY a.created_at DESC, a.id DESC LIMIT ? OFFSET ?",
            DETAIL_SELECT
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.iter().map(detail_from_row).collect()
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)
    }

    async fn batch_after(&self, after_id: i64, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, category_id, author_id, created_at
            FROM articles
            WHERE id > ?
            ORDER BY id ASC
            LIMIT ?
            "#,
        )
        .bind(after_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;
        rows.iter().map(article_from_row).collect()
    }
}

#[async_trait]
impl CategoryLookup for SqliteArticleStore {
    async fn category(&self, id: i64) -> Result<Category> {
        let row = sqlx::query("SELECT id, name FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?
            .ok_or_else(|| Error::category_not_found(id))?;
        Ok(Category {
            id: row.try_get("id").map_err(store_err)?,
            name: row.try_get("name").map_err(store_err)?,
        })
    }
}
