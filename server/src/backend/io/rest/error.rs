//! Translation of domain errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::{error, warn};
use shared::ErrorResponse;

use crate::backend::domain::errors::DomainError;

#[derive(Debug)]
pub enum ApiError {
    /// No usable `X-User-Id` header
    Unauthenticated,
    Domain(DomainError),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Domain(err) => match err {
                DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                DomainError::InvalidState(_) | DomainError::Conflict(_) => StatusCode::CONFLICT,
                DomainError::Validation(_) => StatusCode::BAD_REQUEST,
                DomainError::Unauthorized(_) => StatusCode::FORBIDDEN,
                DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Unauthenticated => ErrorResponse {
                error: "missing X-User-Id header".to_string(),
                kind: "unauthenticated".to_string(),
            },
            // storage details stay in the log
            ApiError::Domain(DomainError::Storage(_)) => ErrorResponse {
                error: "internal storage error".to_string(),
                kind: "storage".to_string(),
            },
            ApiError::Domain(err) => ErrorResponse {
                error: err.to_string(),
                kind: err.kind().to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Domain(DomainError::Storage(err)) => error!("Request failed: {:#}", err),
            ApiError::Domain(err) => warn!("Request rejected with {}: {}", status, err),
            ApiError::Unauthenticated => warn!("Request without user identity"),
        }
        (status, Json(self.body())).into_response()
    }
}
