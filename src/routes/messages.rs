use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::core::CoreError;
use crate::models::{
    ActingUserRequest, DeletedResponse, ErrorResponse, MessageHistoryResponse, SendMessageRequest,
    UnreadCountResponse, UserQuery,
};
use crate::routes::AppState;

/// Configure messaging routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/messages", web::post().to(send_message))
        .route("/messages/unread-count", web::get().to(unread_count))
        .route("/messages/{message_id}/read", web::post().to(mark_read))
        .route("/messages/{message_id}", web::delete().to(delete_message))
        .route("/matches/{match_id}/messages", web::get().to(message_history))
        .route(
            "/matches/{match_id}/messages",
            web::delete().to(delete_conversation),
        );
}

/// Send a message within a match
///
/// POST /api/v1/messages
///
/// Request body:
/// ```json
/// {
///   "senderId": "uuid",
///   "receiverId": "uuid",
///   "matchId": "uuid",
///   "content": "string"
/// }
/// ```
async fn send_message(
    state: web::Data<AppState>,
    req: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, CoreError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for send_message request: {:?}", errors);
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        }));
    }

    let message = state.messenger.send(&req).await?;
    Ok(HttpResponse::Created().json(message))
}

/// Message history for a match, oldest first
///
/// GET /api/v1/matches/{matchId}/messages?userId={userId}
///
/// Viewing the history marks every unread message addressed to the
/// caller as read.
async fn message_history(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, CoreError> {
    let match_id = path.into_inner();
    let messages = state.messenger.history(match_id, query.user_id).await?;

    Ok(HttpResponse::Ok().json(MessageHistoryResponse {
        match_id,
        total: messages.len(),
        messages,
    }))
}

/// Delete a conversation without touching the match
///
/// DELETE /api/v1/matches/{matchId}/messages?userId={userId}
async fn delete_conversation(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, CoreError> {
    let deleted = state
        .messenger
        .delete_conversation(path.into_inner(), query.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(DeletedResponse { deleted }))
}

/// Explicitly mark one message as read (receiver only)
///
/// POST /api/v1/messages/{messageId}/read
async fn mark_read(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ActingUserRequest>,
) -> Result<HttpResponse, CoreError> {
    state
        .messenger
        .mark_read(path.into_inner(), req.user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete a single message (sender only)
///
/// DELETE /api/v1/messages/{messageId}?userId={userId}
async fn delete_message(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, CoreError> {
    state
        .messenger
        .delete_message(path.into_inner(), query.user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Total unread messages addressed to a user
///
/// GET /api/v1/messages/unread-count?userId={userId}
async fn unread_count(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, CoreError> {
    let unread = state.messenger.unread_count(query.user_id).await?;

    Ok(HttpResponse::Ok().json(UnreadCountResponse {
        user_id: query.user_id,
        unread,
    }))
}
