use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use campus_core::error::{AppError, error_body};
use campus_domain::course::CourseKeyError;

/// Content store error variants.
#[derive(Debug, thiserror::Error)]
pub enum ContentStoreError {
    #[error("unsupported archive {0:?}, expected a .tar.gz file")]
    UnsupportedArchive(String),
    #[error("archive does not contain a course.xml descriptor")]
    MissingCourseXml,
    #[error("invalid archive: {0}")]
    InvalidArchive(String),
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    #[error("course not found")]
    CourseNotFound,
    #[error(transparent)]
    InvalidCourseKey(#[from] CourseKeyError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ContentStoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedArchive(_) => "UNSUPPORTED_ARCHIVE",
            Self::MissingCourseXml => "MISSING_COURSE_XML",
            Self::InvalidArchive(_) => "INVALID_ARCHIVE",
            Self::InvalidUpload(_) => "INVALID_UPLOAD",
            Self::CourseNotFound => "COURSE_NOT_FOUND",
            Self::InvalidCourseKey(_) => "INVALID_COURSE_KEY",
            Self::App(e) => e.kind(),
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedArchive(_) | Self::MissingCourseXml => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Self::InvalidArchive(_) | Self::InvalidUpload(_) | Self::InvalidCourseKey(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::CourseNotFound => StatusCode::NOT_FOUND,
            Self::App(e) => e.status(),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ContentStoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, kind = self.kind(), "internal error");
        }
        error_body(status, self.kind(), self.to_string())
    }
}
