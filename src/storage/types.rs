use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::codec;

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfaced by the article store.
///
/// Not-found and constraint violations get their own variants so callers can
/// tell "no data" apart from "the database is broken".
#[derive(Debug, Error)]
pub enum StoreError {
    /// No article row with the given id
    #[error("Article {0} not found")]
    NotFound(i64),

    /// Another article already uses this URL (urls are unique store-wide)
    #[error("An article with URL '{0}' already exists")]
    DuplicateUrl(String),

    /// Article rejected before reaching SQLite
    #[error("Invalid article: {0}")]
    InvalidArticle(String),

    /// Authors, categories or image could not be serialized
    #[error("Failed to encode article field: {0}")]
    Encode(#[from] serde_json::Error),

    /// Schema creation failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Map a failed INSERT/UPDATE, turning unique violations into `DuplicateUrl`.
    pub(crate) fn from_write(err: sqlx::Error, url: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateUrl(url.to_string())
            }
            _ => StoreError::Database(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// Image attached to an article. Only `url` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl ArticleImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            width: None,
            height: None,
        }
    }
}

fn default_unread() -> bool {
    true
}

/// An article as handed to the store: what a feed parser produces on ingest,
/// and the full replacement payload for `update_article`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedArticle {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub image: Option<ArticleImage>,
    #[serde(default = "default_unread")]
    pub unread: bool,
}

impl ParsedArticle {
    /// Minimal unread article with just a title and URL.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: None,
            description: None,
            published: None,
            updated: None,
            authors: Vec::new(),
            categories: Vec::new(),
            image: None,
            unread: true,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), StoreError> {
        if self.title.trim().is_empty() {
            return Err(StoreError::InvalidArticle("title must not be empty".into()));
        }
        if self.url.trim().is_empty() {
            return Err(StoreError::InvalidArticle("url must not be empty".into()));
        }
        Ok(())
    }
}

/// Article row from the database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: i64,
    pub feed_id: i64,
    pub title: String,
    pub url: String,
    pub content: Option<String>,
    pub description: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub image: Option<ArticleImage>,
    pub unread: bool,
    /// When the row was ingested; governs retention
    pub fetched_at: DateTime<Utc>,
}

impl Article {
    /// The mutable part of the row, suitable for `update_article`.
    pub fn to_parsed(&self) -> ParsedArticle {
        ParsedArticle {
            title: self.title.clone(),
            url: self.url.clone(),
            content: self.content.clone(),
            description: self.description.clone(),
            published: self.published,
            updated: self.updated,
            authors: self.authors.clone(),
            categories: self.categories.clone(),
            image: self.image.clone(),
            unread: self.unread,
        }
    }
}

// ============================================================================
// Helper Types
// ============================================================================

/// Internal row type for article queries (used by sqlx FromRow).
/// Text columns are decoded leniently by `into_article`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ArticleDbRow {
    pub id: i64,
    pub feed_id: i64,
    pub title: String,
    pub url: String,
    pub content: Option<String>,
    pub description: Option<String>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub authors: Option<String>,
    pub categories: Option<String>,
    pub image: Option<String>,
    pub unread: bool,
    pub fetched_at: String,
}

impl ArticleDbRow {
    pub(crate) fn into_article(self) -> Article {
        let id = self.id;
        Article {
            id,
            feed_id: self.feed_id,
            published: codec::decode_timestamp(id, "published", self.published.as_deref()),
            updated: codec::decode_timestamp(id, "updated", self.updated.as_deref()),
            authors: codec::decode_list(id, "authors", self.authors.as_deref()),
            categories: codec::decode_list(id, "categories", self.categories.as_deref()),
            image: codec::decode_image(id, self.image.as_deref()),
            fetched_at: codec::decode_timestamp(id, "fetched_at", Some(self.fetched_at.as_str()))
                .unwrap_or_default(),
            title: self.title,
            url: self.url,
            content: self.content,
            description: self.description,
            unread: self.unread,
        }
    }
}

/// Column values for one article, serialized and ready to bind.
pub(crate) struct EncodedArticle<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub content: Option<&'a str>,
    pub description: Option<&'a str>,
    pub published: Option<String>,
    pub updated: Option<String>,
    pub authors: String,
    pub categories: String,
    pub image: Option<String>,
    pub unread: bool,
}

impl<'a> EncodedArticle<'a> {
    pub(crate) fn encode(article: &'a ParsedArticle) -> Result<Self, StoreError> {
        article.validate()?;
        Ok(Self {
            title: &article.title,
            url: &article.url,
            content: article.content.as_deref(),
            description: article.description.as_deref(),
            published: article.published.as_ref().map(codec::encode_timestamp),
            updated: article.updated.as_ref().map(codec::encode_timestamp),
            authors: serde_json::to_string(&article.authors)?,
            categories: serde_json::to_string(&article.categories)?,
            image: article
                .image
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            unread: article.unread,
        })
    }
}
