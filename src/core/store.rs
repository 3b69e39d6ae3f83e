use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Match, Message, Rating, RatingKind, UserSummary};

/// Errors raised by the interaction stores
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Errors raised by the user directory
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("user not found with id: {0}")]
    NotFound(Uuid),

    #[error("directory request failed: {0}")]
    Transport(String),
}

/// One-directional LIKE/DISLIKE ledger.
///
/// Uniqueness of the ordered (rater, rated) pair is the store's problem:
/// `record` reports a duplicate as "not inserted" rather than erroring, so
/// re-rating a profile stays a silent no-op all the way up.
#[async_trait]
pub trait RatingLedger: Send + Sync {
    /// Insert a rating; returns false when the pair was already rated.
    async fn record(
        &self,
        rater_id: Uuid,
        rated_user_id: Uuid,
        kind: RatingKind,
    ) -> Result<bool, StorageError>;

    /// The rating for the exact ordered (rater, rated) pair.
    async fn between(
        &self,
        rater_id: Uuid,
        rated_user_id: Uuid,
    ) -> Result<Option<Rating>, StorageError>;

    /// The rating in the opposite direction (rated -> rater), if any.
    async fn reciprocal(
        &self,
        rater_id: Uuid,
        rated_user_id: Uuid,
    ) -> Result<Option<Rating>, StorageError>;
}

/// Symmetric match registry.
#[async_trait]
pub trait MatchRegistry: Send + Sync {
    async fn by_id(&self, match_id: Uuid) -> Result<Option<Match>, StorageError>;

    /// Order-independent existence check for the unordered pair.
    async fn exists_between(&self, user_a: Uuid, user_b: Uuid) -> Result<bool, StorageError>;

    /// Insert a new active match.
    ///
    /// Returns None when the unordered pair is already matched; the
    /// unique index on the canonical pair ordering is the authoritative
    /// de-duplication point, not the caller's existence check.
    async fn create(&self, user1_id: Uuid, user2_id: Uuid) -> Result<Option<Match>, StorageError>;

    /// All matches where the user is either participant.
    async fn for_user(&self, user_id: Uuid, active_only: bool) -> Result<Vec<Match>, StorageError>;

    /// Flip `is_active` to false; returns false when the match was already
    /// inactive or missing.
    async fn deactivate(&self, match_id: Uuid) -> Result<bool, StorageError>;

    /// Remove the match row. Dependent messages must be deleted first;
    /// the schema does not cascade.
    async fn hard_delete(&self, match_id: Uuid) -> Result<bool, StorageError>;
}

/// Per-match ordered message log with read/unread state.
#[async_trait]
pub trait MessageArchive: Send + Sync {
    async fn append(
        &self,
        match_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
    ) -> Result<Message, StorageError>;

    async fn by_id(&self, message_id: Uuid) -> Result<Option<Message>, StorageError>;

    /// All messages of a match, `sent_at` ascending, insertion order as
    /// tie-break.
    async fn for_match(&self, match_id: Uuid) -> Result<Vec<Message>, StorageError>;

    async fn latest_for_match(&self, match_id: Uuid) -> Result<Option<Message>, StorageError>;

    async fn mark_read(&self, message_id: Uuid) -> Result<bool, StorageError>;

    /// Flip every unread message addressed to `reader_id` in the match;
    /// returns how many flipped.
    async fn mark_conversation_read(
        &self,
        match_id: Uuid,
        reader_id: Uuid,
    ) -> Result<u64, StorageError>;

    async fn delete_for_match(&self, match_id: Uuid) -> Result<u64, StorageError>;

    async fn delete_message(&self, message_id: Uuid) -> Result<bool, StorageError>;

    async fn unread_count_for_match(
        &self,
        match_id: Uuid,
        user_id: Uuid,
    ) -> Result<i64, StorageError>;

    async fn unread_count_for_user(&self, user_id: Uuid) -> Result<i64, StorageError>;
}

/// Lookup into the external profile directory.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn by_id(&self, user_id: Uuid) -> Result<UserSummary, LookupError>;
}

/// Downstream notification sink.
///
/// Deliveries are best-effort: callers log failures and carry on, the
/// write path never fails because of the sink.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn match_created(
        &self,
        user_id: Uuid,
        other: &UserSummary,
        match_id: Uuid,
    ) -> Result<(), StorageError>;

    async fn message_sent(
        &self,
        receiver_id: Uuid,
        sender: &UserSummary,
        match_id: Uuid,
    ) -> Result<(), StorageError>;
}
