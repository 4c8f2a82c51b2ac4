pub mod device_types;
pub mod jobs;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error response body: {"error": "message"}
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse::new(self.message)),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Typed NotFoundError maps to 404
        if let Some(nf) = err.downcast_ref::<crate::db::NotFoundError>() {
            return Self {
                status: StatusCode::NOT_FOUND,
                message: nf.to_string(),
            };
        }
        tracing::error!("Request failed: {:#}", err);
        Self::internal(err.to_string())
    }
}

/// Healthcheck endpoint. Returns 200 OK with status
pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "device-type-importer",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
