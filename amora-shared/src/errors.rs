use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{service}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: Member/photo errors
/// - E3xxx: Messaging errors
/// - E4xxx: Realtime channel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    BadRequest,
    Conflict,
    RateLimited,
    Upstream,

    // Auth (E1xxx)
    InvalidCredentials,
    EmailAlreadyExists,
    EmailNotVerified,
    TokenInvalid,
    TokenExpired,
    OAuthError,
    PasswordTooWeak,
    ProfileAlreadyComplete,
    ProfileIncomplete,

    // Members (E2xxx)
    MemberNotFound,
    PhotoNotFound,
    PhotoUploadFailed,
    PhotoNotApproved,
    CannotLikeSelf,

    // Messaging (E3xxx)
    MessageNotFound,
    RecipientNotFound,

    // Realtime (E4xxx)
    ChannelForbidden,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::BadRequest => "E0006",
            Self::Conflict => "E0007",
            Self::RateLimited => "E0008",
            Self::Upstream => "E0009",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::EmailAlreadyExists => "E1002",
            Self::EmailNotVerified => "E1003",
            Self::TokenInvalid => "E1004",
            Self::TokenExpired => "E1005",
            Self::OAuthError => "E1006",
            Self::PasswordTooWeak => "E1007",
            Self::ProfileAlreadyComplete => "E1008",
            Self::ProfileIncomplete => "E1009",

            // Members
            Self::MemberNotFound => "E2001",
            Self::PhotoNotFound => "E2002",
            Self::PhotoUploadFailed => "E2003",
            Self::PhotoNotApproved => "E2004",
            Self::CannotLikeSelf => "E2005",

            // Messaging
            Self::MessageNotFound => "E3001",
            Self::RecipientNotFound => "E3002",

            // Realtime
            Self::ChannelForbidden => "E4001",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream => StatusCode::BAD_GATEWAY,
            Self::ValidationError | Self::BadRequest | Self::PasswordTooWeak
            | Self::OAuthError | Self::PhotoUploadFailed => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::MemberNotFound | Self::PhotoNotFound
            | Self::MessageNotFound | Self::RecipientNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials | Self::EmailNotVerified
            | Self::TokenInvalid | Self::TokenExpired => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::CannotLikeSelf | Self::PhotoNotApproved
            | Self::ChannelForbidden | Self::ProfileIncomplete => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Conflict | Self::EmailAlreadyExists | Self::ProfileAlreadyComplete => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Upstream, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    diesel::result::Error::DatabaseError(
                        diesel::result::DatabaseErrorKind::UniqueViolation,
                        _,
                    ) => (
                        StatusCode::CONFLICT,
                        ApiErrorResponse::new("E0007", "resource already exists"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ErrorCode::EmailAlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::ChannelForbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::MessageNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::EmailNotVerified.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Upstream.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn codes_are_unique() {
        let all = [
            ErrorCode::InternalError, ErrorCode::ValidationError, ErrorCode::NotFound,
            ErrorCode::Unauthorized, ErrorCode::Forbidden, ErrorCode::BadRequest,
            ErrorCode::Conflict, ErrorCode::RateLimited, ErrorCode::Upstream, ErrorCode::InvalidCredentials,
            ErrorCode::EmailAlreadyExists, ErrorCode::EmailNotVerified, ErrorCode::TokenInvalid,
            ErrorCode::TokenExpired, ErrorCode::OAuthError, ErrorCode::PasswordTooWeak,
            ErrorCode::ProfileAlreadyComplete, ErrorCode::ProfileIncomplete,
            ErrorCode::MemberNotFound, ErrorCode::PhotoNotFound, ErrorCode::PhotoUploadFailed,
            ErrorCode::PhotoNotApproved, ErrorCode::CannotLikeSelf, ErrorCode::MessageNotFound,
            ErrorCode::RecipientNotFound, ErrorCode::ChannelForbidden,
        ];
        let mut codes: Vec<&str> = all.iter().map(|c| c.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }
}
