use chrono::Utc;
use sqlx::SqliteConnection;

use super::codec::encode_timestamp;
use super::schema::Database;
use super::types::{Article, ArticleDbRow, EncodedArticle, ParsedArticle, StoreError};

/// Articles ingested longer ago than this are removed by `delete_old_articles`.
pub const DEFAULT_RETENTION_DAYS: i64 = 31;

const ARTICLE_COLUMNS: &str = "id, feed_id, title, url, content, description, published, \
     updated, authors, categories, image, unread, fetched_at";

type Result<T> = std::result::Result<T, StoreError>;

/// Insert one encoded article on the given connection, returning its id.
async fn insert_encoded(
    conn: &mut SqliteConnection,
    feed_id: i64,
    row: &EncodedArticle<'_>,
    fetched_at: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO articles
            (feed_id, title, url, content, description, published, updated,
             authors, categories, image, unread, fetched_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    "#,
    )
    .bind(feed_id)
    .bind(row.title)
    .bind(row.url)
    .bind(row.content)
    .bind(row.description)
    .bind(&row.published)
    .bind(&row.updated)
    .bind(&row.authors)
    .bind(&row.categories)
    .bind(&row.image)
    .bind(row.unread)
    .bind(fetched_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| StoreError::from_write(e, row.url))?;

    Ok(result.last_insert_rowid())
}

impl Database {
    // ========================================================================
    // Article Inserts
    // ========================================================================

    /// Insert a single article for a feed and return its new id.
    ///
    /// # Errors
    ///
    /// `DuplicateUrl` if any article (in any feed) already has this URL; the
    /// existing row is left untouched. `InvalidArticle` for a blank title or URL.
    pub async fn insert_article(&self, feed_id: i64, article: &ParsedArticle) -> Result<i64> {
        let row = EncodedArticle::encode(article)?;
        let fetched_at = encode_timestamp(&Utc::now());

        let mut conn = self.pool.acquire().await?;
        let id = insert_encoded(&mut *conn, feed_id, &row, &fetched_at).await?;

        tracing::debug!(feed_id, article_id = id, title = %article.title, "Inserted article");
        Ok(id)
    }

    /// Insert a batch of articles atomically, returning how many were inserted.
    ///
    /// Either every article is stored or none is: the first failure (duplicate
    /// URL, invalid article, database error) rolls back the whole batch.
    pub async fn insert_articles(&self, feed_id: i64, articles: &[ParsedArticle]) -> Result<usize> {
        if articles.is_empty() {
            return Ok(0);
        }

        // Encode up front so a bad article never opens a transaction
        let rows = articles
            .iter()
            .map(EncodedArticle::encode)
            .collect::<Result<Vec<_>>>()?;
        let fetched_at = encode_timestamp(&Utc::now());

        let mut tx = self.pool.begin().await?;
        for row in &rows {
            // Dropping `tx` on error rolls the batch back
            insert_encoded(&mut *tx, feed_id, row, &fetched_at).await?;
        }
        tx.commit().await?;

        tracing::info!(feed_id, count = rows.len(), "Inserted article batch");
        Ok(rows.len())
    }

    // ========================================================================
    // Article Queries
    // ========================================================================

    /// Get every article of a feed in insertion order.
    pub async fn get_articles_for_feed(&self, feed_id: i64) -> Result<Vec<Article>> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE feed_id = ? ORDER BY id");
        let rows = sqlx::query_as::<_, ArticleDbRow>(&sql)
            .bind(feed_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ArticleDbRow::into_article).collect())
    }

    /// Get up to `limit` articles of a feed, most recently published first.
    ///
    /// Articles without a publish date sort after dated ones; equal dates fall
    /// back to the newest id first.
    pub async fn get_newest_articles(&self, feed_id: i64, limit: i64) -> Result<Vec<Article>> {
        let limit = limit.max(0);
        tracing::debug!(feed_id, limit, "get_newest_articles");

        let sql = format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE feed_id = ? \
             ORDER BY published DESC, id DESC LIMIT ?"
        );
        let rows = sqlx::query_as::<_, ArticleDbRow>(&sql)
            .bind(feed_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ArticleDbRow::into_article).collect())
    }

    /// Get a single article by its id.
    pub async fn get_article(&self, article_id: i64) -> Result<Article> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?");
        let row = sqlx::query_as::<_, ArticleDbRow>(&sql)
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ArticleDbRow::into_article)
            .ok_or(StoreError::NotFound(article_id))
    }

    /// Number of articles stored for a feed
    pub async fn count_articles(&self, feed_id: i64) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles WHERE feed_id = ?")
            .bind(feed_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of unread articles stored for a feed
    pub async fn count_unread(&self, feed_id: i64) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM articles WHERE feed_id = ? AND unread = 1")
                .bind(feed_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    // ========================================================================
    // Article Mutations
    // ========================================================================

    /// Overwrite every mutable field of an article, including `unread`.
    ///
    /// `id`, `feed_id` and `fetched_at` never change.
    pub async fn update_article(&self, article_id: i64, article: &ParsedArticle) -> Result<()> {
        let row = EncodedArticle::encode(article)?;

        let result = sqlx::query(
            r#"
            UPDATE articles
            SET title = ?,
                url = ?,
                content = ?,
                description = ?,
                published = ?,
                updated = ?,
                authors = ?,
                categories = ?,
                image = ?,
                unread = ?
            WHERE id = ?
        "#,
        )
        .bind(row.title)
        .bind(row.url)
        .bind(row.content)
        .bind(row.description)
        .bind(&row.published)
        .bind(&row.updated)
        .bind(&row.authors)
        .bind(&row.categories)
        .bind(&row.image)
        .bind(row.unread)
        .bind(article_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, row.url))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(article_id));
        }
        tracing::debug!(article_id, "Updated article");
        Ok(())
    }

    /// Mark article as read. Marking an already-read article succeeds.
    pub async fn mark_article_read(&self, article_id: i64) -> Result<()> {
        self.set_unread(article_id, false).await
    }

    /// Mark article as unread. Marking an already-unread article succeeds.
    pub async fn mark_article_unread(&self, article_id: i64) -> Result<()> {
        self.set_unread(article_id, true).await
    }

    async fn set_unread(&self, article_id: i64, unread: bool) -> Result<()> {
        let result = sqlx::query("UPDATE articles SET unread = ? WHERE id = ?")
            .bind(unread)
            .bind(article_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(article_id));
        }
        tracing::debug!(article_id, unread, "Changed read state");
        Ok(())
    }

    // ========================================================================
    // Article Deletion
    // ========================================================================

    /// Delete a single article
    pub async fn delete_article(&self, article_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(article_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(article_id));
        }
        tracing::debug!(article_id, "Deleted article");
        Ok(())
    }

    /// Delete every article of a feed (used when the feed is removed).
    /// Returns the number of articles deleted.
    pub async fn delete_articles_for_feed(&self, feed_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM articles WHERE feed_id = ?")
            .bind(feed_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(feed_id, deleted = result.rows_affected(), "Deleted feed articles");
        Ok(result.rows_affected())
    }

    /// Delete articles ingested more than `DEFAULT_RETENTION_DAYS` ago.
    pub async fn delete_old_articles(&self) -> Result<u64> {
        self.delete_articles_older_than(DEFAULT_RETENTION_DAYS).await
    }

    /// Delete articles whose `fetched_at` is more than `days` days in the past.
    /// Negative values are treated as zero. A window reaching past the earliest
    /// representable date deletes nothing.
    pub async fn delete_articles_older_than(&self, days: i64) -> Result<u64> {
        let Some(cutoff) = chrono::Duration::try_days(days.max(0))
            .and_then(|window| Utc::now().checked_sub_signed(window))
        else {
            tracing::debug!(retention_days = days, "Retention window exceeds calendar range, nothing to delete");
            return Ok(0);
        };
        let cutoff = encode_timestamp(&cutoff);

        let result = sqlx::query("DELETE FROM articles WHERE fetched_at < ?")
            .bind(&cutoff)
            .execute(&self.pool)
            .await?;

        tracing::info!(
            retention_days = days,
            cutoff = %cutoff,
            deleted = result.rows_affected(),
            "Deleted old articles"
        );
        Ok(result.rows_affected())
    }
}
