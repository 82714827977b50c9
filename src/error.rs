use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use thiserror::Error;

use crate::domain::payment::{ErrorEnvelope, ErrorPayload};
use crate::repo::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Idempotency-Key header is required")]
    MissingIdempotencyKey,
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<Value>,
    },
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },
    #[error("Idempotency-Key already used with a different payload")]
    IdempotencyConflict,
    #[error("payment provider error: {0}")]
    Provider(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        ApiError::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingIdempotencyKey => "MISSING_IDEMPOTENCY_KEY",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::IdempotencyConflict => "IDEMPOTENCY_CONFLICT",
            ApiError::Provider(_) => "PROVIDER_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingIdempotencyKey | ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::IdempotencyConflict => StatusCode::CONFLICT,
            ApiError::Provider(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            // A raced unique-constraint fault is a conflict, never a 500.
            StoreError::DuplicateIdempotencyKey => ApiError::IdempotencyConflict,
            StoreError::Other(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        }
        let details = match &self {
            ApiError::Validation { details, .. } => details.clone(),
            _ => None,
        };
        let body = ErrorEnvelope {
            error: ErrorPayload {
                code: self.code().to_string(),
                message: self.to_string(),
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}
