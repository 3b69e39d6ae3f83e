use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction-less rating verdict a user gives another user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "rating_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RatingKind {
    Like,
    Dislike,
}

/// One-directional rating from `rater_id` to `rated_user_id`.
///
/// At most one row exists per ordered (rater, rated) pair; re-rating the
/// same profile never produces a second row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub rater_id: Uuid,
    pub rated_user_id: Uuid,
    pub kind: RatingKind,
    pub created_at: DateTime<Utc>,
}

/// Mutual match between two users.
///
/// The pair is symmetric: which user landed in `user1_id` depends only on
/// who rated second. `is_active` gates new message sends; an unmatch flips
/// it to false without deleting the row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Match {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub is_active: bool,
    pub matched_at: DateTime<Utc>,
}

impl Match {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    /// The participant opposite `user_id`, or None for non-participants.
    pub fn other_participant(&self, user_id: Uuid) -> Option<Uuid> {
        if self.user1_id == user_id {
            Some(self.user2_id)
        } else if self.user2_id == user_id {
            Some(self.user1_id)
        } else {
            None
        }
    }
}

/// Message inside a match conversation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    #[serde(rename = "matchId")]
    pub match_id: Uuid,
    #[serde(rename = "senderId")]
    pub sender_id: Uuid,
    #[serde(rename = "receiverId")]
    pub receiver_id: Uuid,
    pub content: String,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    #[serde(rename = "sentAt")]
    pub sent_at: DateTime<Utc>,
}

/// Profile summary as served by the external user directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub name: String,
    pub gender: String,
    pub age: u8,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// A match rendered from one participant's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchView {
    #[serde(rename = "matchId")]
    pub match_id: Uuid,
    #[serde(rename = "matchedUser")]
    pub matched_user: UserSummary,
    #[serde(rename = "matchedAt")]
    pub matched_at: DateTime<Utc>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "lastMessage")]
    pub last_message: Option<Message>,
    #[serde(rename = "unreadCount")]
    pub unread_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn match_between(a: Uuid, b: Uuid) -> Match {
        Match {
            id: Uuid::new_v4(),
            user1_id: a,
            user2_id: b,
            is_active: true,
            matched_at: Utc::now(),
        }
    }

    #[test]
    fn test_other_participant_resolves_both_sides() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let m = match_between(a, b);

        assert_eq!(m.other_participant(a), Some(b));
        assert_eq!(m.other_participant(b), Some(a));
        assert_eq!(m.other_participant(Uuid::new_v4()), None);
    }

    #[test]
    fn test_has_participant() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let m = match_between(a, b);

        assert!(m.has_participant(a));
        assert!(m.has_participant(b));
        assert!(!m.has_participant(Uuid::new_v4()));
    }

    #[test]
    fn test_rating_kind_wire_format() {
        let json = serde_json::to_string(&RatingKind::Like).unwrap();
        assert_eq!(json, r#""like""#);

        let parsed: RatingKind = serde_json::from_str(r#""dislike""#).unwrap();
        assert_eq!(parsed, RatingKind::Dislike);
    }
}
