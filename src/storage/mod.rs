mod articles;
mod codec;
mod handle;
mod schema;
mod types;

pub use articles::DEFAULT_RETENTION_DAYS;
pub use handle::DatabaseHandle;
pub use schema::Database;
pub use types::{Article, ArticleImage, ParsedArticle, StoreError};
