//! Mirror maintenance: `artmirror reindex` and `artmirror status`.

use anyhow::{bail, Result};

use crate::app::App;
use crate::config::Config;

/// CLI entry point: rebuild the mirror from the primary store.
///
/// Exits non-zero when the capability check fails. A partial rebuild is
/// reported, not treated as an error.
pub async fn run_reindex(config: &Config, token: Option<&str>) -> Result<()> {
    let app = App::open(config).await?;
    let result = match app.authorize(token) {
        Ok(principal) => app.sync.reindex(&principal).await,
        Err(e) => Err(e),
    };
    app.close().await;
    let report = result?;

    println!("Reindex complete.");
    println!("  expected:  {}", report.expected);
    println!("  indexed:   {}", report.count);
    for skipped in &report.skipped {
        println!("  skipped:   article {} ({})", skipped.id, skipped.reason);
    }
    for failed in &report.failed {
        println!("  failed:    article {} ({})", failed.id, failed.reason);
    }
    if !report.is_complete() {
        println!(
            "  warning:   {} article(s) not mirrored",
            report.expected.saturating_sub(report.count)
        );
    }
    Ok(())
}

/// CLI entry point: compare canonical and mirrored document counts.
pub async fn run_status(config: &Config) -> Result<()> {
    let app = App::open_read_only(config).await?;
    let result = app.sync.drift_status().await;
    app.close().await;
    let status = match result {
        Ok(status) => status,
        Err(e) => bail!("status check failed: {}", e),
    };

    println!("Article Mirror Status");
    println!("=====================");
    println!("  Primary:   {}", config.db.path.display());
    println!("  Mirror:    {} ({})", config.index.path.display(), config.index.name);
    println!();
    println!("  Articles:  {}", status.canonical);
    println!("  Mirrored:  {}", status.mirrored);
    println!("  Drift:     {}", status.drift());
    if status.drift() != 0 {
        println!();
        println!("  Run `artmirror reindex` to repair the mirror.");
    }
    Ok(())
}
