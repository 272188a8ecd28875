//! Full-text search over the mirror: `artmirror search`.

use anyhow::Result;

use crate::app::App;
use crate::config::Config;

/// CLI entry point: print ranked hits for `query`.
pub async fn run_search(config: &Config, query: &str) -> Result<()> {
    let app = App::open_read_only(config).await?;
    let result = app.query.search(query).await;
    app.close().await;
    let hits = result?;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        let doc = &hit.document;
        println!(
            "{}. [{:.2}] {} / {}",
            i + 1,
            hit.score,
            doc.category_name,
            doc.title
        );
        println!("    excerpt: \"{}\"", excerpt(&doc.content, 120));
        println!("    id: {}", doc.id);
        println!();
    }
    Ok(())
}

/// First `max_chars` characters of `text` on a single line.
fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    let flat = flat.trim();
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat.to_string(),
    }
}
