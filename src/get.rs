//! Article retrieval: `artmirror get` and `artmirror list`.
//!
//! Both read the primary store only; the search mirror is never consulted.

use anyhow::Result;

use article_mirror_core::models::ArticleDetail;

use crate::app::App;
use crate::config::Config;

/// CLI entry point: print one article with its author and category.
pub async fn run_get(config: &Config, id: i64) -> Result<()> {
    let app = App::open_read_only(config).await?;
    let result = app.query.get(id).await;
    app.close().await;
    let detail = result?;

    println!("--- Article ---");
    println!("id:           {}", detail.article.id);
    println!("title:        {}", detail.article.title);
    println!("category:     {}", category_label(&detail));
    println!("author:       {}", author_label(&detail));
    println!(
        "created_at:   {}",
        detail.article.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!();
    println!("--- Content ---");
    println!("{}", detail.article.content);
    Ok(())
}

/// CLI entry point: print one page of articles, newest first.
pub async fn run_list(config: &Config, page: Option<i64>, limit: Option<i64>) -> Result<()> {
    let app = App::open_read_only(config).await?;
    let result = app.query.list(page, limit).await;
    app.close().await;
    let page = result?;

    if page.articles.is_empty() {
        println!("No articles.");
    }
    for detail in &page.articles {
        println!(
            "{:>6}  {}  [{}]  {}",
            detail.article.id,
            detail.article.created_at.format("%Y-%m-%d"),
            category_label(detail),
            detail.article.title
        );
    }
    println!(
        "page {}/{} ({} total, {} per page)",
        page.page, page.total_pages, page.total, page.limit
    );
    Ok(())
}

fn category_label(detail: &ArticleDetail) -> String {
    match &detail.category {
        Some(category) => category.name.clone(),
        None => format!("#{}", detail.article.category_id),
    }
}

fn author_label(detail: &ArticleDetail) -> String {
    match &detail.author {
        Some(author) => author.email.clone(),
        None => format!("#{}", detail.article.author_id),
    }
}
