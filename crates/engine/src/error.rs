use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use flowchart::{ExtractionError, GenerationError, ValidationError};
use renderer::RenderError;
use serde_json::json;

/// An error returned to HTTP clients as `{ "detail": "..." }`.
///
/// `400` for client-caused failures (absent input, unusable model output),
/// `500` for everything else.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {detail}")]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    /// A `400 Bad Request` carrying `detail`.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    /// A `500 Internal Server Error` whose detail names `reason`.
    pub fn internal(reason: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: format!("Внутренняя ошибка сервера: {reason}"),
        }
    }
}

impl From<GenerationError> for ApiError {
    fn from(value: GenerationError) -> Self {
        match value {
            GenerationError::Empty => Self::bad_request(value.to_string()),
            GenerationError::Unavailable { .. } => Self::internal(value),
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(value: ExtractionError) -> Self {
        Self::bad_request(value.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::bad_request(value.to_string())
    }
}

impl From<RenderError> for ApiError {
    fn from(value: RenderError) -> Self {
        Self::internal(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, detail = %self.detail, "flowchart request failed");
        } else {
            tracing::warn!(status = %self.status, detail = %self.detail, "flowchart request rejected");
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
