//! Database schema migrations (idempotent).
//!
//! Creates the canonical tables in the primary database and the FTS5 table
//! in the mirror database. Safe to run any number of times.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate_primary(&pool).await?;
    pool.close().await;

    let index_pool = db::connect_index(config).await?;
    migrate_index(&index_pool, &config.index.name).await?;
    index_pool.close().await;

    Ok(())
}

pub async fn migrate_primary(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // author_id carries the verified principal; users are managed elsewhere,
    // so it is joined but not constrained.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            author_id INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (category_id) REFERENCES categories(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_articles_created_at ON articles(created_at DESC, id DESC)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_category_id ON articles(category_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the FTS5 mirror table `name`. The caller validates `name`.
pub async fn migrate_index(pool: &SqlitePool, name: &str) -> Result<()> {
    // FTS5 CREATE is not idempotent natively, so we check first
    let exists: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name = ?",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    if !exists {
        sqlx::query(&format!(
            r#"
            CREATE VIRTUAL TABLE {} USING fts5(
                doc_id UNINDEXED,
                title,
                content,
                category_id UNINDEXED,
                category_name,
                author_id UNINDEXED
            )
            "#,
            name
        ))
        .execute(pool)
        .await?;
    }

    Ok(())
}
