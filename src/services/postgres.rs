use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::core::store::{
    MatchRegistry, MessageArchive, NotificationSink, RatingLedger, StorageError,
};
use crate::models::{Match, Message, Rating, RatingKind, UserSummary};

/// PostgreSQL store for the interaction state
///
/// This database holds only what this service owns: ratings, matches,
/// messages, and the notification outbox. User profiles stay in the
/// external directory, so none of these tables carry a users FK.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
        idle_timeout_secs: u64,
    ) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StorageError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            acquire_timeout_secs.unwrap_or(5),
            idle_timeout_secs.unwrap_or(600),
        )
        .await
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StorageError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl RatingLedger for PostgresStore {
    async fn record(
        &self,
        rater_id: Uuid,
        rated_user_id: Uuid,
        kind: RatingKind,
    ) -> Result<bool, StorageError> {
        let query = r#"
            INSERT INTO ratings (id, rater_id, rated_user_id, kind)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (rater_id, rated_user_id) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(rater_id)
            .bind(rated_user_id)
            .bind(kind)
            .execute(&self.pool)
            .await?;

        let inserted = result.rows_affected() > 0;
        tracing::debug!(
            "Recorded rating: {} -> {} ({:?}, inserted: {})",
            rater_id,
            rated_user_id,
            kind,
            inserted
        );

        Ok(inserted)
    }

    async fn between(
        &self,
        rater_id: Uuid,
        rated_user_id: Uuid,
    ) -> Result<Option<Rating>, StorageError> {
        let query = r#"
            SELECT id, rater_id, rated_user_id, kind, created_at
            FROM ratings
            WHERE rater_id = $1 AND rated_user_id = $2
        "#;

        let rating = sqlx::query_as::<_, Rating>(query)
            .bind(rater_id)
            .bind(rated_user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rating)
    }

    async fn reciprocal(
        &self,
        rater_id: Uuid,
        rated_user_id: Uuid,
    ) -> Result<Option<Rating>, StorageError> {
        self.between(rated_user_id, rater_id).await
    }
}

#[async_trait]
impl MatchRegistry for PostgresStore {
    async fn by_id(&self, match_id: Uuid) -> Result<Option<Match>, StorageError> {
        let query = r#"
            SELECT id, user1_id, user2_id, is_active, matched_at
            FROM matches
            WHERE id = $1
        "#;

        let m = sqlx::query_as::<_, Match>(query)
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(m)
    }

    async fn exists_between(&self, user_a: Uuid, user_b: Uuid) -> Result<bool, StorageError> {
        let query = r#"
            SELECT EXISTS (
                SELECT 1 FROM matches
                WHERE (user1_id = $1 AND user2_id = $2)
                   OR (user1_id = $2 AND user2_id = $1)
            )
        "#;

        let exists: bool = sqlx::query_scalar(query)
            .bind(user_a)
            .bind(user_b)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn create(&self, user1_id: Uuid, user2_id: Uuid) -> Result<Option<Match>, StorageError> {
        // The unique index on (LEAST, GREATEST) makes this safe against a
        // concurrent reciprocal rate(): exactly one insert wins, the
        // loser sees no row come back.
        let query = r#"
            INSERT INTO matches (id, user1_id, user2_id, is_active)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT ((LEAST(user1_id, user2_id)), (GREATEST(user1_id, user2_id))) DO NOTHING
            RETURNING id, user1_id, user2_id, is_active, matched_at
        "#;

        let created = sqlx::query_as::<_, Match>(query)
            .bind(Uuid::new_v4())
            .bind(user1_id)
            .bind(user2_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(created)
    }

    async fn for_user(&self, user_id: Uuid, active_only: bool) -> Result<Vec<Match>, StorageError> {
        let query = if active_only {
            r#"
                SELECT id, user1_id, user2_id, is_active, matched_at
                FROM matches
                WHERE (user1_id = $1 OR user2_id = $1) AND is_active = TRUE
                ORDER BY matched_at DESC
            "#
        } else {
            r#"
                SELECT id, user1_id, user2_id, is_active, matched_at
                FROM matches
                WHERE user1_id = $1 OR user2_id = $1
                ORDER BY matched_at DESC
            "#
        };

        let matches = sqlx::query_as::<_, Match>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(matches)
    }

    async fn deactivate(&self, match_id: Uuid) -> Result<bool, StorageError> {
        let query = r#"
            UPDATE matches
            SET is_active = FALSE
            WHERE id = $1 AND is_active = TRUE
        "#;

        let result = sqlx::query(query).bind(match_id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn hard_delete(&self, match_id: Uuid) -> Result<bool, StorageError> {
        let query = r#"
            DELETE FROM matches
            WHERE id = $1
        "#;

        let result = sqlx::query(query).bind(match_id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MessageArchive for PostgresStore {
    async fn append(
        &self,
        match_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
    ) -> Result<Message, StorageError> {
        let query = r#"
            INSERT INTO messages (id, match_id, sender_id, receiver_id, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, match_id, sender_id, receiver_id, content, is_read, sent_at
        "#;

        let message = sqlx::query_as::<_, Message>(query)
            .bind(Uuid::new_v4())
            .bind(match_id)
            .bind(sender_id)
            .bind(receiver_id)
            .bind(content)
            .fetch_one(&self.pool)
            .await?;

        Ok(message)
    }

    async fn by_id(&self, message_id: Uuid) -> Result<Option<Message>, StorageError> {
        let query = r#"
            SELECT id, match_id, sender_id, receiver_id, content, is_read, sent_at
            FROM messages
            WHERE id = $1
        "#;

        let message = sqlx::query_as::<_, Message>(query)
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    async fn for_match(&self, match_id: Uuid) -> Result<Vec<Message>, StorageError> {
        // seq breaks ties between messages stamped in the same instant
        let query = r#"
            SELECT id, match_id, sender_id, receiver_id, content, is_read, sent_at
            FROM messages
            WHERE match_id = $1
            ORDER BY sent_at ASC, seq ASC
        "#;

        let messages = sqlx::query_as::<_, Message>(query)
            .bind(match_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(messages)
    }

    async fn latest_for_match(&self, match_id: Uuid) -> Result<Option<Message>, StorageError> {
        let query = r#"
            SELECT id, match_id, sender_id, receiver_id, content, is_read, sent_at
            FROM messages
            WHERE match_id = $1
            ORDER BY sent_at DESC, seq DESC
            LIMIT 1
        "#;

        let message = sqlx::query_as::<_, Message>(query)
            .bind(match_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    async fn mark_read(&self, message_id: Uuid) -> Result<bool, StorageError> {
        let query = r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE id = $1 AND is_read = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(message_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_conversation_read(
        &self,
        match_id: Uuid,
        reader_id: Uuid,
    ) -> Result<u64, StorageError> {
        let query = r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE match_id = $1 AND receiver_id = $2 AND is_read = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(match_id)
            .bind(reader_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_for_match(&self, match_id: Uuid) -> Result<u64, StorageError> {
        let query = r#"
            DELETE FROM messages
            WHERE match_id = $1
        "#;

        let result = sqlx::query(query).bind(match_id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_message(&self, message_id: Uuid) -> Result<bool, StorageError> {
        let query = r#"
            DELETE FROM messages
            WHERE id = $1
        "#;

        let result = sqlx::query(query)
            .bind(message_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn unread_count_for_match(
        &self,
        match_id: Uuid,
        user_id: Uuid,
    ) -> Result<i64, StorageError> {
        let query = r#"
            SELECT COUNT(*)
            FROM messages
            WHERE match_id = $1 AND receiver_id = $2 AND is_read = FALSE
        "#;

        let count: i64 = sqlx::query_scalar(query)
            .bind(match_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn unread_count_for_user(&self, user_id: Uuid) -> Result<i64, StorageError> {
        let query = r#"
            SELECT COUNT(*)
            FROM messages
            WHERE receiver_id = $1 AND is_read = FALSE
        "#;

        let count: i64 = sqlx::query_scalar(query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn match_body(other: &UserSummary) -> String {
    format!("You have a new match with {}!", other.name)
}

fn message_body(sender: &UserSummary) -> String {
    format!("{} sent you a message", sender.name)
}

#[async_trait]
impl NotificationSink for PostgresStore {
    async fn match_created(
        &self,
        user_id: Uuid,
        other: &UserSummary,
        match_id: Uuid,
    ) -> Result<(), StorageError> {
        let query = r#"
            INSERT INTO notifications (id, user_id, kind, body, related_user_id, match_id)
            VALUES ($1, $2, 'new_match', $3, $4, $5)
        "#;

        sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(match_body(other))
            .bind(other.user_id)
            .bind(match_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Queued new_match notification for user {}", user_id);
        Ok(())
    }

    async fn message_sent(
        &self,
        receiver_id: Uuid,
        sender: &UserSummary,
        match_id: Uuid,
    ) -> Result<(), StorageError> {
        let query = r#"
            INSERT INTO notifications (id, user_id, kind, body, related_user_id, match_id)
            VALUES ($1, $2, 'new_message', $3, $4, $5)
        "#;

        sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(receiver_id)
            .bind(message_body(sender))
            .bind(sender.user_id)
            .bind(match_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Queued new_message notification for user {}", receiver_id);
        Ok(())
    }
}
