//! API error types with HTTP response mapping.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use service::ServiceError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// A business error from the service layer.
    Service(ServiceError),
    /// Missing or malformed credentials, rejected before the service
    /// layer.
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Service(err) => service_error_to_response(err),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        let body = serde_json::json!({ "error": message });
        if status == StatusCode::UNAUTHORIZED {
            // Bearer challenge so clients know which scheme to present.
            (
                status,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                axum::Json(body),
            )
                .into_response()
        } else {
            (status, axum::Json(body)).into_response()
        }
    }
}

fn service_error_to_response(err: ServiceError) -> (StatusCode, String) {
    match &err {
        ServiceError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        ServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, err.to_string()),
        ServiceError::Conflict(_) | ServiceError::NotModifiable(_) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        ServiceError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, err.to_string()),
        ServiceError::Internal => {
            tracing::error!("internal server error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}
