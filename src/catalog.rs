//! Reference data the articles point at: `artmirror category add` and
//! `artmirror author add`.
//!
//! Categories and authors are owned by the surrounding application. These
//! commands exist so a fresh database can be seeded without it.

use anyhow::Result;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteArticleStore;

pub async fn run_add_category(config: &Config, name: &str) -> Result<()> {
    let store = SqliteArticleStore::new(db::connect(config).await?);
    let result = store.add_category(name).await;
    store.pool().close().await;
    let category = result?;
    println!("Category {} created: {}", category.id, category.name);
    Ok(())
}

pub async fn run_add_author(config: &Config, email: &str) -> Result<()> {
    let store = SqliteArticleStore::new(db::connect(config).await?);
    let result = store.add_author(email).await;
    store.pool().close().await;
    let author = result?;
    println!("Author {} created: {}", author.id, author.email);
    Ok(())
}

pub async fn run_rename_category(config: &Config, id: i64, name: &str) -> Result<()> {
    let store = SqliteArticleStore::new(db::connect(config).await?);
    let result = store.rename_category(id, name).await;
    store.pool().close().await;
    result?;
    println!("Category {} renamed to {}.", id, name);
    println!("Mirrored documents keep the old name until the next reindex.");
    Ok(())
}
