// Route exports
pub mod matches;
pub mod messages;

use actix_web::{error, http::StatusCode, web, HttpResponse, Responder};
use std::sync::Arc;

use crate::core::{CoreError, MatchingEngine, Messenger};
use crate::models::{ErrorResponse, HealthResponse};
use crate::services::PostgresStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchingEngine>,
    pub messenger: Arc<Messenger>,
    pub store: Arc<PostgresStore>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(matches::configure)
            .configure(messages::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

impl error::ResponseError for CoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::MatchNotActive(_) | CoreError::InvalidState(_) => StatusCode::BAD_REQUEST,
            CoreError::Storage(_) | CoreError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let (error, message) = match self {
            CoreError::NotFound(_) => ("not_found", self.to_string()),
            CoreError::MatchNotActive(_) => ("match_not_active", self.to_string()),
            CoreError::InvalidState(_) => ("invalid_state", self.to_string()),
            CoreError::Storage(_) | CoreError::Directory(_) => {
                // Internals stay in the logs, not in the response body
                tracing::error!("Internal error: {}", self);
                ("internal_error", "internal server error".to_string())
            }
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error.to_string(),
            message,
            status_code: status.as_u16(),
        })
    }
}
