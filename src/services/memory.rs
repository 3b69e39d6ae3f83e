use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::core::store::{
    LookupError, MatchRegistry, MessageArchive, NotificationSink, RatingLedger, StorageError,
    UserLookup,
};
use crate::models::{Match, Message, Rating, RatingKind, UserSummary};

/// In-memory interaction store
///
/// Backs the test suites and local development; behaves like the
/// PostgreSQL store, including the uniqueness guarantees, because every
/// check-and-insert runs under one write lock.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    ratings: Vec<Rating>,
    matches: Vec<Match>,
    messages: Vec<Message>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RatingLedger for MemoryStore {
    async fn record(
        &self,
        rater_id: Uuid,
        rated_user_id: Uuid,
        kind: RatingKind,
    ) -> Result<bool, StorageError> {
        let mut state = self.state.write().await;

        let exists = state
            .ratings
            .iter()
            .any(|r| r.rater_id == rater_id && r.rated_user_id == rated_user_id);
        if exists {
            return Ok(false);
        }

        state.ratings.push(Rating {
            id: Uuid::new_v4(),
            rater_id,
            rated_user_id,
            kind,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn between(
        &self,
        rater_id: Uuid,
        rated_user_id: Uuid,
    ) -> Result<Option<Rating>, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .ratings
            .iter()
            .find(|r| r.rater_id == rater_id && r.rated_user_id == rated_user_id)
            .cloned())
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
impl MatchRegistry for MemoryStore {
    async fn by_id(&self, match_id: Uuid) -> Result<Option<Match>, StorageError> {
        let state = self.state.read().await;
        Ok(state.matches.iter().find(|m| m.id == match_id).cloned())
    }

    async fn exists_between(&self, user_a: Uuid, user_b: Uuid) -> Result<bool, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .matches
            .iter()
            .any(|m| pairs_match(m, user_a, user_b)))
    }

    async fn create(&self, user1_id: Uuid, user2_id: Uuid) -> Result<Option<Match>, StorageError> {
        let mut state = self.state.write().await;

        if state
            .matches
            .iter()
            .any(|m| pairs_match(m, user1_id, user2_id))
        {
            return Ok(None);
        }

        let created = Match {
            id: Uuid::new_v4(),
            user1_id,
            user2_id,
            is_active: true,
            matched_at: Utc::now(),
        };
        state.matches.push(created.clone());
        Ok(Some(created))
    }

    async fn for_user(&self, user_id: Uuid, active_only: bool) -> Result<Vec<Match>, StorageError> {
        let state = self.state.read().await;
        let mut matches: Vec<Match> = state
            .matches
            .iter()
            .filter(|m| m.has_participant(user_id))
            .filter(|m| !active_only || m.is_active)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.matched_at.cmp(&a.matched_at));
        Ok(matches)
    }

    async fn deactivate(&self, match_id: Uuid) -> Result<bool, StorageError> {
        let mut state = self.state.write().await;
        match state
            .matches
            .iter_mut()
            .find(|m| m.id == match_id && m.is_active)
        {
            Some(m) => {
                m.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn hard_delete(&self, match_id: Uuid) -> Result<bool, StorageError> {
        let mut state = self.state.write().await;
        let before = state.matches.len();
        state.matches.retain(|m| m.id != match_id);
        Ok(state.matches.len() < before)
    }
}

fn pairs_match(m: &Match, user_a: Uuid, user_b: Uuid) -> bool {
    (m.user1_id == user_a && m.user2_id == user_b)
        || (m.user1_id == user_b && m.user2_id == user_a)
}

#[async_trait]
impl MessageArchive for MemoryStore {
    async fn append(
        &self,
        match_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
    ) -> Result<Message, StorageError> {
        let mut state = self.state.write().await;
        let message = Message {
            id: Uuid::new_v4(),
            match_id,
            sender_id,
            receiver_id,
            content: content.to_string(),
            is_read: false,
            sent_at: Utc::now(),
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn by_id(&self, message_id: Uuid) -> Result<Option<Message>, StorageError> {
        let state = self.state.read().await;
        Ok(state.messages.iter().find(|m| m.id == message_id).cloned())
    }

    async fn for_match(&self, match_id: Uuid) -> Result<Vec<Message>, StorageError> {
        let state = self.state.read().await;
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| m.match_id == match_id)
            .cloned()
            .collect();
        // Stable sort: equal timestamps keep insertion order
        messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
        Ok(messages)
    }

    async fn latest_for_match(&self, match_id: Uuid) -> Result<Option<Message>, StorageError> {
        Ok(self.for_match(match_id).await?.pop())
    }

    async fn mark_read(&self, message_id: Uuid) -> Result<bool, StorageError> {
        let mut state = self.state.write().await;
        match state
            .messages
            .iter_mut()
            .find(|m| m.id == message_id && !m.is_read)
        {
            Some(m) => {
                m.is_read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_conversation_read(
        &self,
        match_id: Uuid,
        reader_id: Uuid,
    ) -> Result<u64, StorageError> {
        let mut state = self.state.write().await;
        let mut flipped = 0;
        for m in state
            .messages
            .iter_mut()
            .filter(|m| m.match_id == match_id && m.receiver_id == reader_id && !m.is_read)
        {
            m.is_read = true;
            flipped += 1;
        }
        Ok(flipped)
    }

    async fn delete_for_match(&self, match_id: Uuid) -> Result<u64, StorageError> {
        let mut state = self.state.write().await;
        let before = state.messages.len();
        state.messages.retain(|m| m.match_id != match_id);
        Ok((before - state.messages.len()) as u64)
    }

    async fn delete_message(&self, message_id: Uuid) -> Result<bool, StorageError> {
        let mut state = self.state.write().await;
        let before = state.messages.len();
        state.messages.retain(|m| m.id != message_id);
        Ok(state.messages.len() < before)
    }

    async fn unread_count_for_match(
        &self,
        match_id: Uuid,
        user_id: Uuid,
    ) -> Result<i64, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .filter(|m| m.match_id == match_id && m.receiver_id == user_id && !m.is_read)
            .count() as i64)
    }

    async fn unread_count_for_user(&self, user_id: Uuid) -> Result<i64, StorageError> {
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .filter(|m| m.receiver_id == user_id && !m.is_read)
            .count() as i64)
    }
}

/// In-memory user directory
#[derive(Default)]
pub struct MemoryDirectory {
    users: RwLock<HashMap<Uuid, UserSummary>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, user: UserSummary) {
        self.users.write().await.insert(user.user_id, user);
    }

    /// Register a profile with defaults and return its id.
    pub async fn seed(&self, name: &str) -> Uuid {
        let user_id = Uuid::new_v4();
        self.add(UserSummary {
            user_id,
            name: name.to_string(),
            gender: "unspecified".to_string(),
            age: 30,
            city: None,
            is_active: true,
        })
        .await;
        user_id
    }
}

#[async_trait]
impl UserLookup for MemoryDirectory {
    async fn by_id(&self, user_id: Uuid) -> Result<UserSummary, LookupError> {
        self.users
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or(LookupError::NotFound(user_id))
    }
}

/// Notification event captured by the in-memory sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    MatchCreated {
        user_id: Uuid,
        other_user_id: Uuid,
        match_id: Uuid,
    },
    MessageSent {
        receiver_id: Uuid,
        sender_id: Uuid,
        match_id: Uuid,
    },
}

/// In-memory notification sink that records every delivery
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<NotificationEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn match_created(
        &self,
        user_id: Uuid,
        other: &UserSummary,
        match_id: Uuid,
    ) -> Result<(), StorageError> {
        self.events.lock().await.push(NotificationEvent::MatchCreated {
            user_id,
            other_user_id: other.user_id,
            match_id,
        });
        Ok(())
    }

    async fn message_sent(
        &self,
        receiver_id: Uuid,
        sender: &UserSummary,
        match_id: Uuid,
    ) -> Result<(), StorageError> {
        self.events.lock().await.push(NotificationEvent::MessageSent {
            receiver_id,
            sender_id: sender.user_id,
            match_id,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_record_is_idempotent() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

            assert!(store.record(a, b, RatingKind::Like).await.unwrap());
            assert!(!store.record(a, b, RatingKind::Dislike).await.unwrap());

            let kept = store.between(a, b).await.unwrap().unwrap();
            assert_eq!(kept.kind, RatingKind::Like);
        });
    }

    #[test]
    fn test_create_dedupes_reversed_pair() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

            assert!(store.create(a, b).await.unwrap().is_some());
            assert!(store.create(b, a).await.unwrap().is_none());
            assert!(store.exists_between(b, a).await.unwrap());
        });
    }

    #[test]
    fn test_messages_keep_insertion_order() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let match_id = Uuid::new_v4();
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

            let first = store.append(match_id, a, b, "one").await.unwrap();
            let second = store.append(match_id, b, a, "two").await.unwrap();
            let third = store.append(match_id, a, b, "three").await.unwrap();

            let ids: Vec<Uuid> = store
                .for_match(match_id)
                .await
                .unwrap()
                .iter()
                .map(|m| m.id)
                .collect();
            assert_eq!(ids, vec![first.id, second.id, third.id]);

            let latest = store.latest_for_match(match_id).await.unwrap().unwrap();
            assert_eq!(latest.id, third.id);
        });
    }

    #[test]
    fn test_unread_counts_follow_read_state() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let match_id = Uuid::new_v4();
            let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

            store.append(match_id, a, b, "hi").await.unwrap();
            store.append(match_id, a, b, "there").await.unwrap();

            assert_eq!(store.unread_count_for_user(b).await.unwrap(), 2);
            assert_eq!(store.unread_count_for_match(match_id, b).await.unwrap(), 2);
            assert_eq!(store.unread_count_for_match(match_id, a).await.unwrap(), 0);

            assert_eq!(store.mark_conversation_read(match_id, b).await.unwrap(), 2);
            assert_eq!(store.unread_count_for_user(b).await.unwrap(), 0);
            // Second read pass finds nothing left to flip
            assert_eq!(store.mark_conversation_read(match_id, b).await.unwrap(), 0);
        });
    }
}
