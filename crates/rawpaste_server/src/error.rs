//! HTTP error type that maps gateway outcomes onto status codes.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rawpaste_core::{AppError, GatewayError};
use serde_json::json;

/// Seconds a client should wait before retrying an exhausted allocation.
const ALLOCATION_RETRY_AFTER_SECS: &str = "1";

/// Error returned by API handlers.
///
/// Renders as `{"error": "<message>"}` with the mapped status.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    retry_after: Option<&'static str>,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        tracing::error!("Storage error: {}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<GatewayError> for HttpError {
    fn from(err: GatewayError) -> Self {
        let message = err.to_string();
        match err {
            GatewayError::Unauthenticated => Self::new(StatusCode::UNAUTHORIZED, message),
            GatewayError::EmptyContent => Self::bad_request(message),
            GatewayError::QuotaExceeded { .. } => Self::new(StatusCode::CONFLICT, message),
            GatewayError::AllocationExhausted { attempts } => {
                tracing::warn!(attempts, "identifier allocation exhausted");
                Self {
                    retry_after: Some(ALLOCATION_RETRY_AFTER_SECS),
                    ..Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
                }
            }
            GatewayError::NotFound => Self::new(StatusCode::NOT_FOUND, message),
            GatewayError::Forbidden | GatewayError::NotOwner => {
                Self::new(StatusCode::FORBIDDEN, message)
            }
            GatewayError::StoreFailure(err) => Self::from(err),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        let mut response = (self.status, body).into_response();
        if let Some(seconds) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static(seconds));
        }
        response
    }
}
