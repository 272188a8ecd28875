//! Configuration parsing and validation.
//!
//! Article Mirror is configured via a TOML file (default:
//! `./config/articles.toml`). Only `[db]`, `[index]` and `[server]` are
//! required; every other section falls back to its defaults.
//!
//! # Example
//!
//! ```toml
//! [db]
//! path = "./data/articles.sqlite"
//!
//! [index]
//! path = "./data/search.sqlite"
//! name = "articles"
//!
//! [pagination]
//! default_limit = 10
//! max_limit = 100
//!
//! [reindex]
//! batch_size = 500
//!
//! [search]
//! max_results = 20
//!
//! [server]
//! bind = "127.0.0.1:3000"
//!
//! [auth]
//! secret_env = "JWT_SECRET"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use article_mirror_core::query::{
    Pagination, DEFAULT_MAX_PAGE_LIMIT, DEFAULT_PAGE_LIMIT, DEFAULT_SEARCH_LIMIT,
};
use article_mirror_core::sync::DEFAULT_REINDEX_BATCH;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub index: IndexConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub reindex: ReindexConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Primary store: the canonical SQLite database.
#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Search mirror: a separate SQLite database holding one FTS5 table.
#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    pub path: PathBuf,
    /// FTS5 table name.
    #[serde(default = "default_index_name")]
    pub name: String,
}

fn default_index_name() -> String {
    "articles".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    #[serde(default = "default_limit")]
    pub default_limit: i64,
    #[serde(default = "default_max_limit")]
    pub max_limit: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_LIMIT,
            max_limit: DEFAULT_MAX_PAGE_LIMIT,
        }
    }
}

impl PaginationConfig {
    pub fn to_pagination(&self) -> Pagination {
        Pagination {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}
fn default_max_limit() -> i64 {
    DEFAULT_MAX_PAGE_LIMIT
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReindexConfig {
    /// Articles read from the primary store per round trip.
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
}

impl Default for ReindexConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_REINDEX_BATCH,
        }
    }
}

fn default_batch_size() -> i64 {
    DEFAULT_REINDEX_BATCH
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_SEARCH_LIMIT,
        }
    }
}

fn default_max_results() -> usize {
    DEFAULT_SEARCH_LIMIT
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Name of the environment variable holding the HS256 signing secret.
    #[serde(default = "default_secret_env")]
    pub secret_env: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_env: default_secret_env(),
        }
    }
}

fn default_secret_env() -> String {
    "JWT_SECRET".to_string()
}

/// Whether `name` is safe to splice into SQL as a table name.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.db.path == config.index.path {
        anyhow::bail!("db.path and index.path must point at different files");
    }

    if !is_valid_table_name(&config.index.name) {
        anyhow::bail!(
            "index.name must be an identifier (letters, digits, underscore): '{}'",
            config.index.name
        );
    }

    if config.pagination.default_limit < 1 {
        anyhow::bail!("pagination.default_limit must be >= 1");
    }
    if config.pagination.max_limit < config.pagination.default_limit {
        anyhow::bail!("pagination.max_limit must be >= pagination.default_limit");
    }

    if config.reindex.batch_size < 1 {
        anyhow::bail!("reindex.batch_size must be >= 1");
    }

    if config.search.max_results == 0 {
        anyhow::bail!("search.max_results must be > 0");
    }

    if config.auth.secret_env.trim().is_empty() {
        anyhow::bail!("auth.secret_env must name an environment variable");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &str) -> Result<Config> {
        let content = format!(
            r#"
[db]
path = "/tmp/a.sqlite"

[index]
path = "/tmp/b.sqlite"

[server]
bind = "127.0.0.1:3000"
{}
"#,
            extra
        );
        let config: Config = toml::from_str(&content)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.index.name, "articles");
        assert_eq!(config.pagination.default_limit, 10);
        assert_eq!(config.pagination.max_limit, 100);
        assert_eq!(config.reindex.batch_size, 500);
        assert_eq!(config.search.max_results, 20);
        assert_eq!(config.auth.secret_env, "JWT_SECRET");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse("[pagination]\ndefault_limit = 0").is_err());
        assert!(parse("[pagination]\ndefault_limit = 50\nmax_limit = 10").is_err());
        assert!(parse("[reindex]\nbatch_size = 0").is_err());
        assert!(parse("[search]\nmax_results = 0").is_err());
    }

    #[test]
    fn test_rejects_shared_database_file() {
        let content = r#"
[db]
path = "/tmp/same.sqlite"

[index]
path = "/tmp/same.sqlite"

[server]
bind = "127.0.0.1:3000"
"#;
        let config: Config = toml::from_str(content).unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_table_name_validation() {
        assert!(is_valid_table_name("articles"));
        assert!(is_valid_table_name("_idx2"));
        assert!(!is_valid_table_name("2idx"));
        assert!(!is_valid_table_name("a; DROP TABLE x"));
        assert!(!is_valid_table_name(""));
    }
}
