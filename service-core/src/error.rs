use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Error type shared by every handler in the workspace.
///
/// Each variant maps to exactly one HTTP status. The response body is
/// always `{"error": "..."}` with an optional `"details"` field, so
/// clients can rely on a single error shape across services.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    ConfigError(String),

    #[error("{0}")]
    TooManyRequests(String, Option<u64>),

    #[error("{message}")]
    BadGateway {
        message: String,
        details: Option<String>,
    },

    #[error("{0}")]
    GatewayTimeout(String),

    #[error(transparent)]
    InternalError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let (status, message, details, retry_after) = match self {
            AppError::ValidationError(msg) | AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg, None, None)
            }
            AppError::ConfigError(msg) => {
                tracing::error!(error = %msg, "configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None, None)
            }
            AppError::TooManyRequests(message, retry_after) => {
                (StatusCode::TOO_MANY_REQUESTS, message, None, retry_after)
            }
            AppError::BadGateway { message, details } => {
                tracing::warn!(error = %message, details = ?details, "upstream failure");
                (StatusCode::BAD_GATEWAY, message, details, None)
            }
            AppError::GatewayTimeout(msg) => {
                tracing::warn!(error = %msg, "upstream timeout");
                (StatusCode::GATEWAY_TIMEOUT, msg, None, None)
            }
            AppError::InternalError(err) => {
                tracing::error!(error = ?err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                    None,
                    None,
                )
            }
        };

        let mut res = (
            status,
            Json(ErrorResponse {
                error: message,
                details,
            }),
        )
            .into_response();

        if let Some(retry) = retry_after {
            res.headers_mut().insert(header::RETRY_AFTER, retry.into());
        }

        res
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.into())
    }
}

/// Flattens `validator` output into the first human-readable message.
///
/// Request DTOs attach a message to every rule, so the fallback text
/// should never surface in practice.
pub fn first_validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|field| field.iter())
        .filter_map(|err| err.message.as_ref().map(|msg| msg.to_string()))
        .next()
        .unwrap_or_else(|| "Invalid request".to_string())
}
