use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Error returned by API handlers, rendered as `{"message": ...}`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(&'static str),
    BadRequest(&'static str),
    MethodNotAllowed,
    InvalidBody(JsonRejection),
    Unavailable(&'static str),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message.to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.to_string()),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method Not Allowed".to_string(),
            ),
            ApiError::InvalidBody(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::Unavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message.to_string()),
            ApiError::Internal(message) => {
                error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection)
    }
}
