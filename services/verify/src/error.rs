use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use campus_core::error::{AppError, error_body};

use crate::domain::types::VerificationError;

/// Verify service error variants.
#[derive(Debug, thiserror::Error)]
pub enum VerifyServiceError {
    #[error("verification attempt not found")]
    AttemptNotFound,
    #[error("profile name must be between 1 and 255 characters")]
    InvalidName,
    #[error("image body is empty")]
    EmptyImage,
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error("attempt was modified concurrently")]
    ConcurrentModification,
    #[error("invalid callback signature")]
    InvalidSignature,
    #[error("invalid callback payload: {0}")]
    InvalidCallback(String),
    #[error(transparent)]
    App(#[from] AppError),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl VerifyServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AttemptNotFound => "ATTEMPT_NOT_FOUND",
            Self::InvalidName => "INVALID_NAME",
            Self::EmptyImage => "EMPTY_IMAGE",
            Self::Verification(e) => match e {
                VerificationError::InvalidTransition { .. } => "INVALID_TRANSITION",
                VerificationError::MissingImages => "MISSING_IMAGES",
                VerificationError::MissingName => "MISSING_NAME",
                VerificationError::UnknownStatus(_) => "INTERNAL",
            },
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::InvalidCallback(_) => "INVALID_CALLBACK",
            Self::App(e) => e.kind(),
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::AttemptNotFound => StatusCode::NOT_FOUND,
            Self::InvalidName
            | Self::EmptyImage
            | Self::InvalidCallback(_)
            | Self::Verification(VerificationError::MissingImages)
            | Self::Verification(VerificationError::MissingName) => StatusCode::BAD_REQUEST,
            Self::Verification(VerificationError::InvalidTransition { .. })
            | Self::ConcurrentModification => StatusCode::CONFLICT,
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::App(e) => e.status(),
            Self::Verification(VerificationError::UnknownStatus(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for VerifyServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client errors and already visible through TraceLayer.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, kind = self.kind(), "internal error");
        }
        let message = match &self {
            Self::Verification(VerificationError::UnknownStatus(_)) => "internal error".to_owned(),
            _ => self.to_string(),
        };
        error_body(status, self.kind(), message)
    }
}
