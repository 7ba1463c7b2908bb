use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use campus_core::error::{AppError, error_body};
use campus_domain::course::CourseKeyError;

/// Bulk email service error variants.
#[derive(Debug, thiserror::Error)]
pub enum BulkEmailError {
    #[error("task not found")]
    TaskNotFound,
    #[error("course email not found")]
    EmailNotFound,
    #[error("course not found")]
    CourseNotFound,
    #[error(transparent)]
    InvalidCourseKey(#[from] CourseKeyError),
    #[error("invalid email: {0}")]
    InvalidEmail(String),
    #[error("only course staff may send course email")]
    NotCourseStaff,
    #[error(transparent)]
    App(#[from] AppError),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl BulkEmailError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::EmailNotFound => "EMAIL_NOT_FOUND",
            Self::CourseNotFound => "COURSE_NOT_FOUND",
            Self::InvalidCourseKey(_) => "INVALID_COURSE_KEY",
            Self::InvalidEmail(_) => "INVALID_EMAIL",
            Self::NotCourseStaff => "NOT_COURSE_STAFF",
            Self::App(e) => e.kind(),
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::TaskNotFound | Self::EmailNotFound | Self::CourseNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::InvalidCourseKey(_) | Self::InvalidEmail(_) => StatusCode::BAD_REQUEST,
            Self::NotCourseStaff => StatusCode::FORBIDDEN,
            Self::App(e) => e.status(),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BulkEmailError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, kind = self.kind(), "internal error");
        }
        error_body(status, self.kind(), self.to_string())
    }
}
