use tokio::sync::OnceCell;

use super::schema::Database;
use super::types::StoreError;

/// Owner of the application's single article database.
///
/// The database is opened on first use and shared by every later caller.
/// `close` is the teardown point, normally called once at shutdown.
pub struct DatabaseHandle {
    path: String,
    db: OnceCell<Database>,
}

impl DatabaseHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            db: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.db.initialized()
    }

    /// Get the database, opening it if this is the first call.
    ///
    /// Concurrent first callers wait on the same open. A failed open is not
    /// cached; the next call tries again.
    pub async fn get(&self) -> Result<Database, StoreError> {
        let db = self
            .db
            .get_or_try_init(|| async {
                tracing::debug!(path = %self.path, "Opening article database");
                Database::open(&self.path).await
            })
            .await?;
        Ok(db.clone())
    }

    /// Close the database if it was ever opened.
    pub async fn close(self) {
        if let Some(db) = self.db.into_inner() {
            db.close().await;
            tracing::debug!(path = %self.path, "Closed article database");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ParsedArticle;

    #[tokio::test]
    async fn test_handle_opens_lazily() {
        let handle = DatabaseHandle::new(":memory:");
        assert!(!handle.is_open());
        assert_eq!(handle.path(), ":memory:");

        handle.get().await.unwrap();
        assert!(handle.is_open());
        handle.close().await;
    }

    #[tokio::test]
    async fn test_handle_shares_one_database() {
        let handle = DatabaseHandle::new(":memory:");

        let first = handle.get().await.unwrap();
        let id = first
            .insert_article(1, &ParsedArticle::new("Shared", "https://example.com/shared"))
            .await
            .unwrap();

        // A second in-memory open would be empty; seeing the row proves reuse
        let second = handle.get().await.unwrap();
        assert_eq!(second.get_article(id).await.unwrap().title, "Shared");

        handle.close().await;
        assert!(first.get_article(id).await.is_err());
    }

    #[tokio::test]
    async fn test_close_without_open_is_noop() {
        let handle = DatabaseHandle::new(":memory:");
        handle.close().await;
    }

    #[tokio::test]
    async fn test_failed_open_is_retried() {
        let dir = std::env::temp_dir().join(format!("feedstash_retry_{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        let path = dir.join("articles.db");
        let handle = DatabaseHandle::new(path.to_str().unwrap());

        // Parent directory missing: open fails and nothing is cached
        assert!(handle.get().await.is_err());
        assert!(!handle.is_open());

        std::fs::create_dir_all(&dir).unwrap();
        let db = handle.get().await.unwrap();
        assert!(handle.is_open());
        assert_eq!(db.count_articles(1).await.unwrap(), 0);

        handle.close().await;
        std::fs::remove_dir_all(&dir).ok();
    }
}
