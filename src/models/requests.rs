use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::RatingKind;

/// Request to rate another user's profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateUserRequest {
    #[serde(alias = "rater_id", rename = "raterId")]
    pub rater_id: Uuid,
    #[serde(alias = "rated_user_id", rename = "ratedUserId")]
    pub rated_user_id: Uuid,
    #[serde(alias = "rating_type", rename = "ratingType")]
    pub rating_type: RatingKind,
}

/// Request to send a message within a match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[serde(alias = "sender_id", rename = "senderId")]
    pub sender_id: Uuid,
    #[serde(alias = "receiver_id", rename = "receiverId")]
    pub receiver_id: Uuid,
    #[serde(alias = "match_id", rename = "matchId")]
    pub match_id: Uuid,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
}

/// Body for operations acting on behalf of a user (unmatch, mark-read)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActingUserRequest {
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: Uuid,
}

/// Query parameters identifying the calling user
#[derive(Debug, Clone, Deserialize)]
pub struct UserQuery {
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: Uuid,
}

/// Query parameters for the match list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct MatchListQuery {
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: Uuid,
    #[serde(default = "default_active_only", alias = "active_only", rename = "activeOnly")]
    pub active_only: bool,
}

fn default_active_only() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_content_limits() {
        let base = SendMessageRequest {
            sender_id: Uuid::new_v4(),
            receiver_id: Uuid::new_v4(),
            match_id: Uuid::new_v4(),
            content: "hi".to_string(),
        };
        assert!(base.validate().is_ok());

        let empty = SendMessageRequest {
            content: String::new(),
            ..base.clone()
        };
        assert!(empty.validate().is_err());

        let oversized = SendMessageRequest {
            content: "x".repeat(5001),
            ..base
        };
        assert!(oversized.validate().is_err());
    }

    #[test]
    fn test_rate_request_accepts_snake_case_aliases() {
        let json = format!(
            r#"{{"rater_id":"{}","rated_user_id":"{}","rating_type":"like"}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let req: RateUserRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.rating_type, RatingKind::Like);
    }
}
