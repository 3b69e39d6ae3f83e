//! Conversation gate: participant and active-state checks that every
//! message read/write and unmatch path runs through.

use uuid::Uuid;

use crate::core::error::CoreError;
use crate::models::Match;

/// Require `user_id` to be a participant of the match.
///
/// Non-participants get `NotFound`, never a Forbidden-style error, so the
/// response does not reveal that the match exists.
pub fn authorize(match_record: &Match, user_id: Uuid) -> Result<(), CoreError> {
    if match_record.has_participant(user_id) {
        Ok(())
    } else {
        tracing::warn!(
            "User {} is not a participant of match {}",
            user_id,
            match_record.id
        );
        Err(CoreError::access_denied())
    }
}

/// Require the match to be active. Only the send path enforces this;
/// history stays readable after an unmatch.
pub fn assert_active(match_record: &Match) -> Result<(), CoreError> {
    if match_record.is_active {
        Ok(())
    } else {
        Err(CoreError::MatchNotActive(format!(
            "cannot send message: match {} is not active",
            match_record.id
        )))
    }
}
