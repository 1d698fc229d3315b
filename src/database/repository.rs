use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Message, MAX_CONTENT_CHARS};

/// Storage operations behind the board's HTTP routes.
///
/// Every call is a single autocommitted statement. Lookups of an absent id
/// return [`DatabaseError::NotFound`].
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert a new message stamped with the current UTC time
    async fn create(&self, content: &str) -> Result<Message, DatabaseError>;

    /// All messages, oldest first
    async fn list(&self) -> Result<Vec<Message>, DatabaseError>;

    async fn get_404(&self, id: i64) -> Result<Message, DatabaseError>;

    /// Overwrite the content of an existing message. `created_at` is untouched.
    async fn update_content(&self, id: i64, content: &str) -> Result<Message, DatabaseError>;

    async fn delete(&self, id: i64) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

#[derive(Clone, Debug)]
pub struct SqliteMessageStore {
    manager: DatabaseManager,
}

impl SqliteMessageStore {
    pub fn new(manager: DatabaseManager) -> Self {
        Self { manager }
    }

    fn pool(&self) -> &SqlitePool {
        self.manager.pool()
    }

    // SQLite's length() stops at the first NUL, so the column CHECK alone
    // does not bound the content.
    fn check_length(content: &str) -> Result<(), DatabaseError> {
        let chars = content.chars().count();
        if chars > MAX_CONTENT_CHARS {
            return Err(DatabaseError::ContentTooLong {
                chars,
                max: MAX_CONTENT_CHARS,
            });
        }
        Ok(())
    }

    fn not_found(id: i64) -> DatabaseError {
        DatabaseError::NotFound(format!("message {}", id))
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn create(&self, content: &str) -> Result<Message, DatabaseError> {
        Self::check_length(content)?;
        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO message (content, created_at) VALUES (?1, ?2) \
             RETURNING id, content, created_at",
        )
        .bind(content)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;
        Ok(message)
    }

    async fn list(&self) -> Result<Vec<Message>, DatabaseError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, content, created_at FROM message ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(messages)
    }

    async fn get_404(&self, id: i64) -> Result<Message, DatabaseError> {
        sqlx::query_as::<_, Message>("SELECT id, content, created_at FROM message WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<Message, DatabaseError> {
        Self::check_length(content)?;
        sqlx::query_as::<_, Message>(
            "UPDATE message SET content = ?1 WHERE id = ?2 \
             RETURNING id, content, created_at",
        )
        .bind(content)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| Self::not_found(id))
    }

    async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM message WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        self.manager.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteMessageStore {
        SqliteMessageStore::new(DatabaseManager::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamp() {
        let store = store().await;
        let before = Utc::now();
        let message = store.create("hello").await.unwrap();
        assert_eq!(message.id, 1);
        assert_eq!(message.content, "hello");
        assert!(message.created_at >= before);
        assert!(message.created_at <= Utc::now());
    }

    #[tokio::test]
    async fn list_returns_creation_order() {
        let store = store().await;
        for content in ["first", "second", "third"] {
            store.create(content).await.unwrap();
        }
        let contents: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn content_limit_is_enforced_by_storage() {
        let store = store().await;
        let at_limit = "a".repeat(MAX_CONTENT_CHARS);
        store.create(&at_limit).await.unwrap();

        let too_long = "a".repeat(MAX_CONTENT_CHARS + 1);
        let err = store.create(&too_long).await.unwrap_err();
        assert!(
            matches!(err, DatabaseError::ContentTooLong { chars: 201, max: MAX_CONTENT_CHARS }),
            "unexpected error: {err:?}"
        );
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn nul_characters_do_not_bypass_the_limit() {
        let store = store().await;
        let content = format!("a\0{}", "b".repeat(500));

        let err = store.create(&content).await.unwrap_err();
        assert!(matches!(err, DatabaseError::ContentTooLong { chars: 502, .. }), "{err:?}");
        assert!(store.list().await.unwrap().is_empty());

        let created = store.create("short").await.unwrap();
        let err = store.update_content(created.id, &content).await.unwrap_err();
        assert!(matches!(err, DatabaseError::ContentTooLong { chars: 502, .. }), "{err:?}");
        assert_eq!(store.get_404(created.id).await.unwrap().content, "short");
    }

    #[tokio::test]
    async fn limit_counts_characters_not_bytes() {
        let store = store().await;
        let accented = "é".repeat(MAX_CONTENT_CHARS);
        store.create(&accented).await.unwrap();
    }

    #[tokio::test]
    async fn update_keeps_created_at() {
        let store = store().await;
        let created = store.create("hello").await.unwrap();
        let updated = store.update_content(created.id, "world").await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.content, "world");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = store().await;
        assert!(matches!(store.get_404(7).await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(store.update_content(7, "x").await, Err(DatabaseError::NotFound(_))));
        assert!(matches!(store.delete(7).await, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = store().await;
        let first = store.create("one").await.unwrap();
        let second = store.create("two").await.unwrap();
        store.delete(second.id).await.unwrap();
        let third = store.create("three").await.unwrap();
        assert!(third.id > second.id);
        assert!(second.id > first.id);
    }
}
