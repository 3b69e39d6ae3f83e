use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::core::CoreError;
use crate::models::{
    ActingUserRequest, MatchListQuery, MatchListResponse, RateUserRequest, RateUserResponse,
    UserQuery,
};
use crate::routes::AppState;

/// Configure rating and match routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/ratings", web::post().to(rate_user))
        .route("/matches", web::get().to(list_matches))
        .route("/matches/{match_id}", web::get().to(get_match))
        .route("/matches/{match_id}", web::delete().to(delete_match))
        .route("/matches/{match_id}/unmatch", web::post().to(unmatch));
}

/// Rate a user's profile
///
/// POST /api/v1/ratings
///
/// Request body:
/// ```json
/// {
///   "raterId": "uuid",
///   "ratedUserId": "uuid",
///   "ratingType": "like|dislike"
/// }
/// ```
///
/// Re-rating the same profile succeeds without recording anything; the
/// response only reports `matched: true` when this call formed the match.
async fn rate_user(
    state: web::Data<AppState>,
    req: web::Json<RateUserRequest>,
) -> Result<HttpResponse, CoreError> {
    let created = state
        .engine
        .rate_user(req.rater_id, req.rated_user_id, req.rating_type)
        .await?;

    Ok(HttpResponse::Ok().json(RateUserResponse {
        matched: created.is_some(),
        match_id: created.map(|m| m.id),
    }))
}

/// List matches for a user, rendered from that user's perspective
///
/// GET /api/v1/matches?userId={userId}&activeOnly={bool}
async fn list_matches(
    state: web::Data<AppState>,
    query: web::Query<MatchListQuery>,
) -> Result<HttpResponse, CoreError> {
    let matches = state
        .engine
        .matches_for_user(query.user_id, query.active_only)
        .await?;

    Ok(HttpResponse::Ok().json(MatchListResponse {
        total: matches.len(),
        matches,
    }))
}

/// Fetch a single match view
///
/// GET /api/v1/matches/{matchId}?userId={userId}
async fn get_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, CoreError> {
    let view = state
        .engine
        .match_for_user(path.into_inner(), query.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(view))
}

/// Unmatch: clear the conversation and deactivate the match
///
/// POST /api/v1/matches/{matchId}/unmatch
async fn unmatch(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ActingUserRequest>,
) -> Result<HttpResponse, CoreError> {
    state.engine.unmatch(req.user_id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Permanently delete a match and its conversation
///
/// DELETE /api/v1/matches/{matchId}?userId={userId}
async fn delete_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse, CoreError> {
    state
        .engine
        .delete_match(query.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
