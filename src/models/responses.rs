use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{MatchView, Message};

/// Response for the rate endpoint
///
/// `matched` is true only when this very call formed a new match; a
/// duplicate rating or a pre-existing match both come back unmatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateUserResponse {
    pub matched: bool,
    #[serde(rename = "matchId")]
    pub match_id: Option<Uuid>,
}

/// Response for the match list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchListResponse {
    pub matches: Vec<MatchView>,
    pub total: usize,
}

/// Response for the message history endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageHistoryResponse {
    #[serde(rename = "matchId")]
    pub match_id: Uuid,
    pub messages: Vec<Message>,
    pub total: usize,
}

/// Response for the unread count endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub unread: i64,
}

/// Response for delete-style endpoints reporting affected rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
