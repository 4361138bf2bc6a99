use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::auth::{AuthError, CredentialError};
use crate::blob::UploadError;
use crate::database::DatabaseQueryError;
use crate::error::ValidationError;
use crate::prelude::*;

/// Every way a request can fail, as seen by the client.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ApiError {
    #[snafu(context(false), display("{source}"))]
    Auth { source: AuthError },

    #[snafu(context(false), display("{source}"))]
    Credentials { source: CredentialError },

    #[snafu(context(false), display("{source}"))]
    Upload { source: UploadError },

    #[snafu(context(false), display("{source}"))]
    Validation { source: ValidationError },

    #[snafu(display("Video not found"))]
    NotFound { id: String },

    #[snafu(display("{message}"))]
    BadRequest { message: String },

    /// The store failed, `message` says which operation.
    #[snafu(display("{message}"))]
    Store {
        message: &'static str,
        source: DatabaseQueryError,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth { source: AuthError::Encode { .. } } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth { .. } => StatusCode::FORBIDDEN,
            ApiError::Credentials { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Upload { source } => match source {
                UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                UploadError::Write { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                UploadError::NoFile
                | UploadError::UnsupportedType { .. }
                | UploadError::Read { .. } => StatusCode::BAD_REQUEST,
            },
            ApiError::Validation { .. } | ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable name of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Auth { source } => match source {
                AuthError::Missing => "access-denied",
                AuthError::Invalid { .. } => "invalid-token",
                AuthError::Encode { .. } => "token-signing",
            },
            ApiError::Credentials { .. } => "invalid-credentials",
            ApiError::Upload { source } => match source {
                UploadError::NoFile => "no-file",
                UploadError::UnsupportedType { .. } => "unsupported-type",
                UploadError::TooLarge { .. } => "too-large",
                UploadError::Read { .. } => "unreadable-upload",
                UploadError::Write { .. } => "blob-write",
            },
            ApiError::Validation { source } => match source {
                ValidationError::OutOfRange { .. } => "out-of-range",
                ValidationError::MissingQuery => "missing-query",
            },
            ApiError::NotFound { .. } => "not-found",
            ApiError::BadRequest { .. } => "bad-request",
            ApiError::Store { .. } => "store",
        }
    }

    /// Text shown to the client. Internal details stay in the logs.
    pub fn message(&self) -> String {
        match self {
            ApiError::Auth { source: AuthError::Encode { .. } } => "Failed to issue a token".to_string(),
            ApiError::Upload { source: UploadError::Read { .. } } => "Failed to read the uploaded file".to_string(),
            ApiError::Upload { source: UploadError::Write { .. } } => "Failed to store the uploaded file".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
    error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed: {}", self);
        } else {
            tracing::debug!(error = ?self, "request rejected: {}", self);
        }

        let content = ErrorResponse {
            message: self.message(),
            error: self.kind(),
        };

        (status, Json(content)).into_response()
    }
}
