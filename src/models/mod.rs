// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Match, MatchView, Message, Rating, RatingKind, UserSummary};
pub use requests::{ActingUserRequest, MatchListQuery, RateUserRequest, SendMessageRequest, UserQuery};
pub use responses::{
    DeletedResponse, ErrorResponse, HealthResponse, MatchListResponse, MessageHistoryResponse,
    RateUserResponse, UnreadCountResponse,
};
