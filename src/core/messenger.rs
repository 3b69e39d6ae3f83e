use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::CoreError;
use crate::core::gate;
use crate::core::store::{MatchRegistry, MessageArchive, NotificationSink, UserLookup};
use crate::models::{Match, Message, SendMessageRequest};

/// Match-gated messaging: sends, history reads, and read-state upkeep.
pub struct Messenger {
    users: Arc<dyn UserLookup>,
    matches: Arc<dyn MatchRegistry>,
    messages: Arc<dyn MessageArchive>,
    notifier: Arc<dyn NotificationSink>,
}

impl Messenger {
    pub fn new(
        users: Arc<dyn UserLookup>,
        matches: Arc<dyn MatchRegistry>,
        messages: Arc<dyn MessageArchive>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            users,
            matches,
            messages,
            notifier,
        }
    }

    /// Send a message within a match.
    ///
    /// The match must be active and BOTH sender and receiver must be its
    /// participants; a valid match id with a forged receiver still fails.
    pub async fn send(&self, req: &SendMessageRequest) -> Result<Message, CoreError> {
        tracing::info!(
            "Sending message from user {} to user {} in match {}",
            req.sender_id,
            req.receiver_id,
            req.match_id
        );

        let sender = self.users.by_id(req.sender_id).await?;
        self.users.by_id(req.receiver_id).await?;

        if req.sender_id == req.receiver_id {
            return Err(CoreError::InvalidState(
                "sender and receiver must be different users".to_string(),
            ));
        }

        let content = req.content.trim();
        if content.is_empty() {
            return Err(CoreError::InvalidState(
                "message content is empty".to_string(),
            ));
        }

        let m = self.match_by_id(req.match_id).await?;
        gate::assert_active(&m)?;

        if !m.has_participant(req.sender_id) || !m.has_participant(req.receiver_id) {
            tracing::warn!(
                "Users {} and {} are not part of match {}",
                req.sender_id,
                req.receiver_id,
                m.id
            );
            return Err(CoreError::NotFound(
                "users are not part of this match".to_string(),
            ));
        }

        let message = self
            .messages
            .append(req.match_id, req.sender_id, req.receiver_id, content)
            .await?;

        tracing::info!("Message {} sent in match {}", message.id, req.match_id);

        if let Err(e) = self
            .notifier
            .message_sent(req.receiver_id, &sender, req.match_id)
            .await
        {
            tracing::warn!(
                "Failed to notify user {} of new message: {}",
                req.receiver_id,
                e
            );
        }

        Ok(message)
    }

    /// Message history for a match, `sent_at` ascending.
    ///
    /// Viewing is reading: every unread message addressed to the viewer
    /// is flipped to read before the list is returned, so no separate
    /// mark-read call is needed on the primary path. History stays
    /// available on inactive matches.
    pub async fn history(&self, match_id: Uuid, viewer_id: Uuid) -> Result<Vec<Message>, CoreError> {
        tracing::debug!(
            "Fetching message history for match {} by user {}",
            match_id,
            viewer_id
        );

        let m = self.match_by_id(match_id).await?;
        gate::authorize(&m, viewer_id)?;

        let flipped = self
            .messages
            .mark_conversation_read(match_id, viewer_id)
            .await?;
        if flipped > 0 {
            tracing::debug!(
                "Marked {} messages as read for user {} in match {}",
                flipped,
                viewer_id,
                match_id
            );
        }

        let messages = self.messages.for_match(match_id).await?;
        tracing::debug!("Found {} messages in match {}", messages.len(), match_id);

        Ok(messages)
    }

    /// Delete every message of a match, leaving the match itself alone.
    pub async fn delete_conversation(
        &self,
        match_id: Uuid,
        requester_id: Uuid,
    ) -> Result<u64, CoreError> {
        tracing::info!(
            "User {} deleting conversation in match {}",
            requester_id,
            match_id
        );

        let m = self.match_by_id(match_id).await?;
        gate::authorize(&m, requester_id)?;

        let deleted = self.messages.delete_for_match(match_id).await?;
        tracing::info!("Deleted {} messages from match {}", deleted, match_id);

        Ok(deleted)
    }

    /// Explicitly mark a single message as read; receiver only.
    pub async fn mark_read(&self, message_id: Uuid, user_id: Uuid) -> Result<(), CoreError> {
        let message = self
            .messages
            .by_id(message_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("message not found with id: {message_id}")))?;

        if message.receiver_id != user_id {
            return Err(CoreError::NotFound(
                "message not found or access denied".to_string(),
            ));
        }

        self.messages.mark_read(message_id).await?;
        tracing::debug!("Message {} marked as read by user {}", message_id, user_id);
        Ok(())
    }

    /// Delete a single message; sender only.
    pub async fn delete_message(&self, message_id: Uuid, user_id: Uuid) -> Result<(), CoreError> {
        let message = self
            .messages
            .by_id(message_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("message not found with id: {message_id}")))?;

        if message.sender_id != user_id {
            return Err(CoreError::NotFound(
                "message not found or access denied".to_string(),
            ));
        }

        self.messages.delete_message(message_id).await?;
        tracing::info!("Message {} deleted by user {}", message_id, user_id);
        Ok(())
    }

    /// Total unread messages addressed to a user, computed on read.
    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, CoreError> {
        self.users.by_id(user_id).await?;
        Ok(self.messages.unread_count_for_user(user_id).await?)
    }

    async fn match_by_id(&self, match_id: Uuid) -> Result<Match, CoreError> {
        self.matches
            .by_id(match_id)
            .await?
            .ok_or_else(|| CoreError::match_not_found(match_id))
    }
}
