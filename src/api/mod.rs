//! REST and WebSocket API.
//!
//! Axum-based HTTP surface over the rank service: stats reads and writes,
//! outcome recording, rank projection and the live stats hub.

pub mod routes;
pub mod state;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::service::ServiceError;
use crate::storage::StorageError;
use routes::{hub, rank, stats};
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ApiError::BadRequest(msg),
            ServiceError::Storage(
                e @ (StorageError::LockTimeout(_) | StorageError::Cancelled(_)),
            ) => ApiError::Unavailable(e.to_string()),
            ServiceError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub subscribers: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        subscribers: state.service.hub().subscriber_count().await,
    })
}

/// Assemble every route over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stats", get(stats::get_stats).put(stats::put_stats))
        .route(
            "/api/stats/:name",
            get(stats::get_field)
                .put(stats::put_field)
                .post(stats::record_outcome),
        )
        .route("/api/rank", get(rank::get_rank))
        .route("/api/ladder", get(rank::get_ladder))
        // Legacy GET links: /stats/win, /stats/loose, /stats/tie
        .route("/stats/:outcome", get(stats::record_outcome))
        .route("/hubs/stats", get(hub::stats_hub))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// CORS policy for `origin`; `*` allows any origin.
pub fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid CORS origin {:?}, allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: ApiError = ServiceError::Validation("points cannot be negative".into()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_lock_timeout_maps_to_unavailable() {
        let err: ApiError =
            ServiceError::Storage(StorageError::LockTimeout(Duration::from_secs(5))).into();
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_cancelled_write_maps_to_unavailable() {
        let err: ApiError =
            ServiceError::Storage(StorageError::Cancelled("task panicked".into())).into();
        assert!(matches!(err, ApiError::Unavailable(_)));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_io_error_maps_to_internal() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: ApiError = ServiceError::Storage(StorageError::Io(io)).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_message_format() {
        let err = ApiError::NotFound("unknown stat field: elo".into());
        assert_eq!(err.to_string(), "Not found: unknown stat field: elo");
    }
}
