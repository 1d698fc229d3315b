use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Maximum content length enforced by the `message.content` column
pub const MAX_CONTENT_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
