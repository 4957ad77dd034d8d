//! CLI administration tool for link-resolver.
//!
//! Manages links directly in PostgreSQL without going through the HTTP API.
//! Creation and edits use the same resolver as the server, so slugs are
//! validated against the same pattern and reserved set.
//!
//! # Usage
//!
//! ```bash
//! # Create a link with a generated slug
//! cargo run --bin admin -- link create --url https://example.com
//!
//! # Create a link with a custom slug that expires in 24 hours
//! cargo run --bin admin -- link create --url https://example.com --slug promo --expires-in 86400
//!
//! # Show and delete
//! cargo run --bin admin -- link show promo
//! cargo run --bin admin -- link delete promo
//!
//! # Counts and connectivity
//! cargo run --bin admin -- stats
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - Slug settings (`SLUG_REGEX`, `RESERVED_SLUGS`, ...) as for the server

use link_resolver::application::services::RedirectResolver;
use link_resolver::config::{self, Config};
use link_resolver::domain::entities::{LinkRecord, NewLink};
use link_resolver::infrastructure::cache::NullCache;
use link_resolver::infrastructure::persistence::PgSlugStore;
use link_resolver::utils::clock::SystemClock;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing link-resolver.
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
    /// Manage links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show link and click counts
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Create a link
    Create {
        /// Destination URL (prompted if omitted)
        #[arg(short, long)]
        url: Option<String>,

        /// Custom slug (generated if omitted)
        #[arg(short, long)]
        slug: Option<String>,

        /// Cache ttl in seconds
        #[arg(long)]
        ttl: Option<i64>,

        /// Expire the link this many seconds from now
        #[arg(long)]
        expires_in: Option<i64>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show a link
    Show { slug: String },

    /// Delete a link
    Delete {
        slug: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &config, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Builds a resolver over the database with caching disabled.
fn resolver(config: &Config, pool: &PgPool) -> Result<RedirectResolver> {
    let store = Arc::new(PgSlugStore::new(Arc::new(pool.clone())));
    let validator = config.slug_validator().context("Invalid SLUG_REGEX")?;

    Ok(RedirectResolver::new(
        store,
        Arc::new(NullCache::new()),
        validator,
        Arc::new(SystemClock),
        config.resolver_options(),
    ))
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, config: &Config, pool: &PgPool) -> Result<()> {
    let resolver = resolver(config, pool)?;

    match action {
        LinkAction::Create {
            url,
            slug,
            ttl,
            expires_in,
            yes,
        } => create_link(&resolver, url, slug, ttl, expires_in, yes).await?,
        LinkAction::Show { slug } => show_link(&resolver, &slug).await?,
        LinkAction::Delete { slug, yes } => delete_link(&resolver, &slug, yes).await?,
    }

    Ok(())
}

/// Creates a link with interactive prompts.
///
/// # Flow
///
/// 1. Prompt for the destination (or use provided)
/// 2. Display link details
/// 3. Confirm creation (unless `--yes` flag)
/// 4. Store through the resolver
async fn create_link(
    resolver: &RedirectResolver,
    url: Option<String>,
    slug: Option<String>,
    ttl: Option<i64>,
    expires_in: Option<i64>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔗 Create Link".bright_blue().bold());
    println!();

    let target = match url {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Destination URL")
            .with_initial_text("https://")
            .interact_text()?,
    };

    let mut new_link = NewLink::new(slug.clone(), target.clone());
    if let Some(ttl) = ttl {
        let ttl = chrono::Duration::try_seconds(ttl).context("--ttl is out of range")?;
        new_link = new_link.with_ttl(ttl);
    }
    if let Some(secs) = expires_in {
        let expires_at = chrono::Duration::try_seconds(secs)
            .and_then(|offset| resolver.clock().now().checked_add_signed(offset))
            .context("--expires-in is out of range")?;
        new_link = new_link.with_expires_at(expires_at);
    }

    println!("{}", "Link details:".bright_white().bold());
    println!("  URL:  {}", target.cyan());
    println!(
        "  Slug: {}",
        slug.as_deref().unwrap_or("(generated)").bright_yellow()
    );
    if let Some(at) = new_link.expires_at {
        println!("  Expires: {}", at.format("%Y-%m-%d %H:%M UTC").to_string().cyan());
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this link?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let record = resolver
        .create(new_link)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create link: {}", e))?;

    println!();
    println!("{}", "✅ Link created successfully!".green().bold());
    print_record(&record);

    Ok(())
}

async fn show_link(resolver: &RedirectResolver, slug: &str) -> Result<()> {
    let record = resolver
        .get_link(slug)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load link: {}", e))?;

    print_record(&record);

    let now = resolver.clock().now();
    if record.is_expired_at(now) {
        println!("  Status:  {}", "EXPIRED".red());
    } else {
        println!("  Status:  {}", "ACTIVE".green());
    }
    println!();

    Ok(())
}

/// Deletes a link with a confirmation prompt (default: No).
async fn delete_link(resolver: &RedirectResolver, slug: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Link".bright_blue().bold());
    println!();

    let record = resolver
        .get_link(slug)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load link: {}", e))?;
    print_record(&record);

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    resolver
        .delete(&record.slug)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!();
    println!("{}", "✅ Link deleted".green().bold());
    println!(
        "{}",
        "Running servers may serve it from cache until the entry expires.".bright_black()
    );
    println!();

    Ok(())
}

fn print_record(record: &LinkRecord) {
    println!("  Slug:    {}", record.slug.bright_yellow().bold());
    println!("  URL:     {}", record.target.as_str().cyan());
    println!(
        "  Created: {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    match record.expires_at {
        Some(at) => println!("  Expires: {}", at.format("%Y-%m-%d %H:%M").to_string().cyan()),
        None => println!("  Expires: {}", "never".bright_black()),
    }
    if let Some(ttl) = record.cache_ttl {
        println!("  Cache:   {}s", ttl.num_seconds());
    }
    if let Some(owner) = &record.owner_id {
        println!("  Owner:   {}", owner.cyan());
    }
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of links
/// - Number of expired links
/// - Total number of clicks
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
        .fetch_one(pool)
        .await?;

    let expired_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE expires_at <= NOW()")
            .fetch_one(pool)
            .await?;

    let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks")
        .fetch_one(pool)
        .await?;

    println!(
        "  Links:   {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Expired: {}",
        expired_count.to_string().bright_yellow().bold()
    );
    println!(
        "  Clicks:  {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
