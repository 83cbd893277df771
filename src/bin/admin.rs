//! CLI administration tool for shortlink-analytics.
//!
//! Runs the same engine as the HTTP service directly against PostgreSQL.
//!
//! # Usage
//!
//! ```bash
//! # Create a link (prompts for the URL when omitted)
//! cargo run --bin admin -- links create --url https://example.com --code Promo-2026
//!
//! # List and delete links
//! cargo run --bin admin -- links list --owner alice
//! cargo run --bin admin -- links delete 42
//!
//! # Analytics
//! cargo run --bin admin -- stats summary
//! cargo run --bin admin -- stats top -n 5
//! cargo run --bin admin -- stats history --days 7
//! cargo run --bin admin -- stats breakdown country
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use shortlink_analytics::application::services::{
    AnalyticsService, CodeGenerator, CreateLink, Dimension, LinkRegistry,
};
use shortlink_analytics::config::mask_connection_string;
use shortlink_analytics::domain::entities::{LinkStatus, Scope};
use shortlink_analytics::domain::repositories::PersistenceStore;
use shortlink_analytics::infrastructure::persistence::{PgStore, PoolSettings};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for managing shortlink-analytics.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage short links
    Links {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show analytics
    Stats {
        #[command(subcommand)]
        action: StatsAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Create a new short link
    Create {
        /// Target URL (prompted when omitted)
        #[arg(short, long)]
        url: Option<String>,

        /// Custom short code (generated when omitted)
        #[arg(short, long)]
        code: Option<String>,

        /// Days until the link expires
        #[arg(short, long, allow_negative_numbers = true)]
        expires_in: Option<i64>,

        /// Owner the link is attributed to
        #[arg(short, long)]
        owner: Option<String>,

        /// Public origin used to print the short URL
        #[arg(long, env = "BASE_URL", default_value = "http://localhost:3000")]
        base_url: String,
    },

    /// List links, newest first
    List {
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Delete a link by id
    Delete {
        id: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum StatsAction {
    /// Link, click and active counts
    Summary {
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Most clicked links
    Top {
        #[arg(short, default_value_t = 10)]
        n: usize,

        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Daily clicks over the trailing window
    History {
        #[arg(short, long, default_value_t = 30)]
        days: u32,

        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Clicks grouped by source, country, device or hour
    Breakdown {
        dimension: String,

        #[arg(short, long)]
        owner: Option<String>,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection and apply migrations
    Check,
}

type Store = dyn PersistenceStore;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let settings = PoolSettings {
        max_connections: 2,
        min_connections: 1,
        connect_timeout: Duration::from_secs(10),
        idle_timeout: Duration::from_secs(60),
        max_lifetime: Duration::from_secs(300),
    };

    let store: Arc<Store> = Arc::new(
        PgStore::connect(&database_url, &settings)
            .await
            .context("Failed to connect to database")?,
    );
    store.open().await.context("Failed to apply migrations")?;

    let result = match cli.command {
        Commands::Links { action } => handle_link_action(action, store.clone()).await,
        Commands::Stats { action } => handle_stats_action(action, store.clone()).await,
        Commands::Db { action } => handle_db_action(action, store.clone(), &database_url).await,
    };

    store.close().await?;
    result
}

fn registry(store: Arc<Store>) -> LinkRegistry<Store> {
    let generator = Arc::new(CodeGenerator::new(store.clone()));
    LinkRegistry::new(store, generator)
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, store: Arc<Store>) -> Result<()> {
    let registry = registry(store);

    match action {
        LinkAction::Create {
            url,
            code,
            expires_in,
            owner,
            base_url,
        } => create_link(&registry, url, code, expires_in, owner, &base_url).await,
        LinkAction::List { owner } => list_links(&registry, owner).await,
        LinkAction::Delete { id, yes } => delete_link(&registry, id, yes).await,
    }
}

async fn create_link(
    registry: &LinkRegistry<Store>,
    url: Option<String>,
    code: Option<String>,
    expires_in: Option<i64>,
    owner: Option<String>,
    base_url: &str,
) -> Result<()> {
    println!("{}", "🔗 Create Short Link".bright_blue().bold());
    println!();

    let url = match url {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Target URL")
            .with_initial_text("https://")
            .interact_text()?,
    };

    let link = registry
        .create(CreateLink {
            original_url: url,
            custom_code: code,
            expiration_days: expires_in,
            owner,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!("{}", "✅ Link created successfully!".green().bold());
    println!();
    println!("  ID:        {}", link.id.to_string().bright_black());
    println!("  Code:      {}", link.code.cyan());
    println!(
        "  Short URL: {}",
        LinkRegistry::<Store>::short_url(base_url, &link.code).bright_yellow()
    );
    println!("  Target:    {}", link.original_url);
    if let Some(expires_at) = link.expires_at {
        println!(
            "  Expires:   {}",
            expires_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
        );
    }
    println!();

    Ok(())
}

/// Lists links with status indicators.
///
/// ```text
///   ID    Code         Clicks   Created            Status
///   ───────────────────────────────────────────────────────
///   2     Promo-2026   12       2026-01-16 14:20   ACTIVE
///   1     x7Kp2Q       0        2026-01-15 10:30   EXPIRED
/// ```
async fn list_links(registry: &LinkRegistry<Store>, owner: Option<String>) -> Result<()> {
    println!("{}", "📋 Short Links".bright_blue().bold());
    println!();

    let links = registry
        .list(&Scope::from_owner(owner))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<5} {:<14} {:<8} {:<18} {:<8}",
        "ID".bright_white().bold(),
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(60).bright_black());

    let now = Utc::now();
    for link in &links {
        let status = match link.status(now) {
            LinkStatus::Active => "ACTIVE".green(),
            LinkStatus::Expired => "EXPIRED".yellow(),
            LinkStatus::Deleted => "DELETED".red(),
        };

        println!(
            "  {:<5} {:<14} {:<8} {:<18} {}",
            link.id.to_string().bright_black(),
            link.code.cyan(),
            link.clicks,
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(registry: &LinkRegistry<Store>, id: i64, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑  Delete Short Link".bright_blue().bold());
    println!();
    println!(
        "{}",
        "Its code and click history are retired permanently.".yellow()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete link {id}?"))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    registry
        .remove(id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!("{}", "✅ Link deleted".green().bold());
    println!();

    Ok(())
}

/// Dispatches analytics commands.
async fn handle_stats_action(action: StatsAction, store: Arc<Store>) -> Result<()> {
    let analytics = AnalyticsService::new(store);

    match action {
        StatsAction::Summary { owner } => {
            let summary = analytics.summary(&Scope::from_owner(owner)).await?;

            println!("{}", "📊 Summary".bright_blue().bold());
            println!();
            println!(
                "  Links:        {}",
                summary.total_urls.to_string().bright_green().bold()
            );
            println!(
                "  Clicks:       {}",
                summary.total_clicks.to_string().bright_green().bold()
            );
            println!(
                "  Active links: {}",
                summary.active_urls.to_string().bright_green().bold()
            );
        }
        StatsAction::Top { n, owner } => {
            let top = analytics.top_links(&Scope::from_owner(owner), n, 0).await?;

            println!("{}", "🏆 Top Links".bright_blue().bold());
            println!();
            for (rank, entry) in top.iter().enumerate() {
                println!(
                    "  {:>2}. {:<14} {:>6}  {}",
                    rank + 1,
                    entry.link.code.cyan(),
                    entry.link.clicks.to_string().bright_green(),
                    entry.link.original_url.bright_black()
                );
            }
        }
        StatsAction::History { days, owner } => {
            let history = analytics
                .click_history(&Scope::from_owner(owner), days)
                .await?;

            println!("{}", "📈 Click History".bright_blue().bold());
            println!();
            for day in &history {
                println!(
                    "  {}  {:>6}  {}",
                    day.date.format("%Y-%m-%d").to_string().bright_black(),
                    day.clicks,
                    "▇".repeat(day.clicks.min(50) as usize).green()
                );
            }
        }
        StatsAction::Breakdown { dimension, owner } => {
            let dimension: Dimension = dimension.parse()?;
            let breakdown = analytics
                .breakdown(&Scope::from_owner(owner), dimension)
                .await?;

            println!(
                "{}",
                format!("🧭 Clicks by {dimension}").bright_blue().bold()
            );
            println!();
            if breakdown.is_empty() {
                println!("{}", "  No clicks recorded".yellow());
            }
            for (category, count) in breakdown.entries() {
                println!("  {:<24} {:>6}", category.cyan(), count);
            }
        }
    }

    println!();
    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, store: Arc<Store>, database_url: &str) -> Result<()> {
    match action {
        DbAction::Check => {
            println!(
                "{} {}",
                "🔍 Checking".bright_blue(),
                mask_connection_string(database_url)
            );

            store.health_check().await?;

            println!("{}", "✅ Database connection OK, schema up to date".green().bold());
        }
    }

    Ok(())
}
