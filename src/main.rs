//! # Article Mirror CLI (`artmirror`)
//!
//! ## Usage
//!
//! ```bash
//! artmirror --config ./config/articles.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `artmirror init` | Create both databases and run schema migrations |
//! | `artmirror serve` | Start the HTTP API |
//! | `artmirror list` | List articles, newest first |
//! | `artmirror get <id>` | Print one article |
//! | `artmirror search "<query>"` | Search the mirror |
//! | `artmirror reindex` | Rebuild the mirror from the primary store |
//! | `artmirror status` | Compare primary and mirror counts |
//! | `artmirror category add <name>` | Seed a category |
//! | `artmirror author add <email>` | Seed an author |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use article_mirror::{catalog, config, get, migrate, reindex, search, server, telemetry};

/// Article Mirror: article storage with a full-text search mirror.
#[derive(Parser)]
#[command(
    name = "artmirror",
    about = "Article storage with a best-effort full-text search mirror",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/articles.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize both database schemas.
    ///
    /// Idempotent; running it multiple times is safe.
    Init,

    /// Start the HTTP server.
    ///
    /// The token signing secret is read from the variable named by
    /// `[auth].secret_env`.
    Serve,

    /// List articles, newest first.
    List {
        /// Page number, starting at 1.
        #[arg(long)]
        page: Option<i64>,

        /// Articles per page.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Print an article with its author and category.
    Get {
        /// Article id.
        id: i64,
    },

    /// Search titles, content, and category names.
    Search {
        /// The search query string.
        query: String,
    },

    /// Rebuild the search mirror from the primary store.
    Reindex {
        /// Bearer token authorizing the rebuild.
        #[arg(long, env = "ARTICLE_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Show how far the mirror has drifted from the primary store.
    Status,

    /// Manage categories.
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Manage authors.
    Author {
        #[command(subcommand)]
        action: AuthorAction,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Add a category.
    Add { name: String },
    /// Rename a category. The mirror picks up the new name on reindex.
    Rename { id: i64, name: String },
}

#[derive(Subcommand)]
enum AuthorAction {
    /// Add an author.
    Add { email: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Databases initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::List { page, limit } => {
            get::run_list(&cfg, page, limit).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, id).await?;
        }
        Commands::Search { query } => {
            search::run_search(&cfg, &query).await?;
        }
        Commands::Reindex { token } => {
            reindex::run_reindex(&cfg, token.as_deref()).await?;
        }
        Commands::Status => {
            reindex::run_status(&cfg).await?;
        }
        Commands::Category { action } => match action {
            CategoryAction::Add { name } => catalog::run_add_category(&cfg, &name).await?,
            CategoryAction::Rename { id, name } => {
                catalog::run_rename_category(&cfg, id, &name).await?
            }
        },
        Commands::Author { action } => match action {
            AuthorAction::Add { email } => catalog::run_add_author(&cfg, &email).await?,
        },
    }

    Ok(())
}
