use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use feedstash::card::{detail_route, ArticleBigCard, ArticleCard};
use feedstash::config::{Config, MAX_RETENTION_DAYS, MIN_RETENTION_DAYS};
use feedstash::storage::{Article, Database, DatabaseHandle, ParsedArticle, StoreError};

/// Get the config directory path (~/.config/feedstash/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("feedstash"))
}

#[derive(Parser, Debug)]
#[command(name = "feedstash", version, about = "Local article store for an RSS reader")]
struct Cli {
    /// Database file (overrides the config file)
    #[arg(long, global = true, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Config file (default: ~/.config/feedstash/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the article database if it does not exist
    Init,
    /// Import a JSON array of articles into a feed (all or nothing)
    Import {
        /// Feed the articles belong to
        #[arg(long)]
        feed: i64,
        /// JSON file containing an array of articles
        file: PathBuf,
    },
    /// List the articles of a feed
    List {
        #[arg(long)]
        feed: i64,
        /// Only show the N most recently published articles
        #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "0")]
        newest: Option<i64>,
    },
    /// Show a single article
    Show { id: i64 },
    /// Mark an article as read
    Read { id: i64 },
    /// Mark an article as unread
    Unread { id: i64 },
    /// Delete a single article
    Delete { id: i64 },
    /// Delete every article of a feed
    DeleteFeed { feed: i64 },
    /// Delete articles ingested more than the retention window ago
    Prune {
        /// Retention window in days, at least 1 (default from config, 31)
        #[arg(long, value_parser = clap::value_parser!(i64).range(MIN_RETENTION_DAYS..=MAX_RETENTION_DAYS))]
        days: Option<i64>,
    },
}

fn resolve_db_path(cli: &Cli, config: &Config, config_dir: &Path) -> Result<String> {
    let path = cli
        .db
        .clone()
        .or_else(|| config.database_path.clone())
        .unwrap_or_else(|| config_dir.join("articles.db"));

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))
}

fn read_articles(file: &Path) -> Result<Vec<ParsedArticle>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of articles", file.display()))
}

fn print_row(article: &Article, width: usize) {
    let card = ArticleCard::from_article(article, width);
    let marker = if card.unread { "●" } else { " " };
    println!("{marker} [{}] {}", article.id, card.title);
    if !card.description.is_empty() {
        println!("      {}", card.description);
    }
}

fn print_detail(article: &Article, width: usize) {
    let card = ArticleBigCard::from_article(article, width);
    println!("{}", card.title);
    if let Some(published) = card.published {
        println!("Published: {}", published.format("%Y-%m-%d %H:%M UTC"));
    }
    if let Some(updated) = article.updated {
        println!("Updated:   {}", updated.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("URL:       {}", article.url);
    println!("Route:     {}", detail_route(article.id));
    println!("Feed:      {}", article.feed_id);
    println!("State:     {}", if article.unread { "unread" } else { "read" });
    if !article.authors.is_empty() {
        println!("Authors:   {}", article.authors.join(", "));
    }
    if !article.categories.is_empty() {
        println!("Tags:      {}", article.categories.join(", "));
    }
    if let Some(image) = &card.image_url {
        println!("Image:     {image}");
    }
    if !card.description.is_empty() {
        println!();
        println!("{}", card.description);
    }
}

async fn run(db: &Database, command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Init => {
            println!("Article database ready.");
        }
        Command::Import { feed, file } => {
            let articles = read_articles(&file)?;
            match db.insert_articles(feed, &articles).await {
                Ok(count) => println!("Imported {count} articles into feed {feed}."),
                Err(StoreError::DuplicateUrl(url)) => {
                    anyhow::bail!("Import aborted, nothing was stored: {url} is already in the database")
                }
                Err(e) => return Err(e).context("Import failed, nothing was stored"),
            }
        }
        Command::List { feed, newest } => {
            let articles = match newest {
                Some(n) => {
                    let limit = if n > 0 { n } else { config.newest_limit };
                    db.get_newest_articles(feed, limit).await?
                }
                None => db.get_articles_for_feed(feed).await?,
            };
            if articles.is_empty() {
                println!("No articles for feed {feed}.");
            }
            for article in &articles {
                print_row(article, config.card_width);
            }
            let unread = db.count_unread(feed).await?;
            let total = db.count_articles(feed).await?;
            println!("{unread} unread of {total}");
        }
        Command::Show { id } => {
            let article = db.get_article(id).await?;
            print_detail(&article, config.card_width);
        }
        Command::Read { id } => {
            db.mark_article_read(id).await?;
            println!("Marked {id} as read.");
        }
        Command::Unread { id } => {
            db.mark_article_unread(id).await?;
            println!("Marked {id} as unread.");
        }
        Command::Delete { id } => {
            db.delete_article(id).await?;
            println!("Deleted article {id}.");
        }
        Command::DeleteFeed { feed } => {
            let deleted = db.delete_articles_for_feed(feed).await?;
            println!("Deleted {deleted} articles of feed {feed}.");
        }
        Command::Prune { days } => {
            let days = days.unwrap_or(config.retention_days);
            println!("Deleting articles older than {days} days...");
            let deleted = db.delete_articles_older_than(days).await?;
            if deleted > 0 {
                println!("Deleted {deleted} old articles.");
            } else {
                println!("No articles to clean up.");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_dir = get_config_dir()?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;

    let handle = DatabaseHandle::new(resolve_db_path(&cli, &config, &config_dir)?);
    let db = handle
        .get()
        .await
        .with_context(|| format!("Failed to open database {}", handle.path()))?;

    let result = run(&db, cli.command, &config).await;
    handle.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prune_days(args: &[&str]) -> Result<Option<i64>, clap::Error> {
        let cli = Cli::try_parse_from(args)?;
        match cli.command {
            Command::Prune { days } => Ok(days),
            other => panic!("expected prune, got {other:?}"),
        }
    }

    #[test]
    fn test_prune_days_accepts_window() {
        assert_eq!(prune_days(&["feedstash", "prune", "--days", "7"]).unwrap(), Some(7));
        assert_eq!(prune_days(&["feedstash", "prune"]).unwrap(), None);
    }

    #[test]
    fn test_prune_days_rejects_zero_and_negative() {
        assert!(prune_days(&["feedstash", "prune", "--days", "0"]).is_err());
        assert!(prune_days(&["feedstash", "prune", "--days=-3"]).is_err());
    }

    #[test]
    fn test_prune_days_rejects_oversized_window() {
        assert!(prune_days(&["feedstash", "prune", "--days", "1000000000"]).is_err());
    }
}
