use crate::domain::error::DomainError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Body, path or query that could not be decoded.
    #[error("malformed request: {message}")]
    Malformed {
        status: StatusCode,
        message: String,
        field: Option<String>,
    },

    /// Private route called without a valid session token.
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn malformed(status: StatusCode, message: String) -> Self {
        let status = if status == StatusCode::PAYLOAD_TOO_LARGE {
            status
        } else {
            StatusCode::BAD_REQUEST
        };
        let field = missing_field(&message);
        AppError::Malformed {
            status,
            message,
            field,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::malformed(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::malformed(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::malformed(rejection.status(), rejection.body_text())
    }
}

/// Extracts `x` from serde's "missing field `x`" message.
fn missing_field(message: &str) -> Option<String> {
    let (_, rest) = message.split_once("missing field `")?;
    let (field, _) = rest.split_once('`')?;
    Some(field.to_string())
}

/// Error payload. `code` is one of VALIDATION, UNAUTHENTICATED, UNAUTHORIZED,
/// NOT_FOUND, RATE_LIMITED, INTERNAL.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    pub(crate) code: &'static str,
    pub(crate) error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) field: Option<String>,
}

struct ErrorParts {
    status: StatusCode,
    body: ErrorBody,
    retry_after_secs: Option<u64>,
}

impl ErrorParts {
    fn new(status: StatusCode, code: &'static str, error: String) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                error,
                field: None,
            },
            retry_after_secs: None,
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "internal error".to_string(),
        )
    }
}

impl From<DomainError> for ErrorParts {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::Validation { field, .. } => {
                let mut parts = Self::new(StatusCode::BAD_REQUEST, "VALIDATION", message);
                parts.body.field = Some(field.to_string());
                parts
            }
            DomainError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message),
            DomainError::Unauthorized => Self::new(StatusCode::FORBIDDEN, "UNAUTHORIZED", message),
            DomainError::RateLimited {
                retry_after_secs, ..
            } => {
                let mut parts = Self::new(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", message);
                parts.retry_after_secs = Some(retry_after_secs);
                parts
            }
            // Consistency failure: the offending record and author id are part of the message.
            DomainError::AuthorNotFound { .. } => {
                error!(error = %message, "author enrichment failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message)
            }
            DomainError::Unexpected(_) => {
                error!(error = %message, "unexpected domain error");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let parts = match self {
            AppError::Domain(err) => ErrorParts::from(err),
            AppError::Validation(err) => {
                let field = err
                    .field_errors()
                    .keys()
                    .next()
                    .map(|field| field.to_string());
                let mut parts =
                    ErrorParts::new(StatusCode::BAD_REQUEST, "VALIDATION", err.to_string());
                parts.body.field = field;
                parts
            }
            AppError::Malformed {
                status,
                message,
                field,
            } => {
                let mut parts = ErrorParts::new(status, "VALIDATION", message);
                parts.body.field = field;
                parts
            }
            AppError::Unauthenticated => ErrorParts::new(
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "unauthenticated".to_string(),
            ),
            AppError::Internal(err) => {
                error!(error = %err, "internal error");
                ErrorParts::internal()
            }
        };

        let mut response = (parts.status, Json(parts.body)).into_response();
        if let Some(secs) = parts.retry_after_secs {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
