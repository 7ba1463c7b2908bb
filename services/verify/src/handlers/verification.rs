use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use campus_core::identity::IdentityHeaders;

use crate::domain::types::{PhotoVerification, VerificationStatus};
use crate::error::VerifyServiceError;
use crate::state::AppState;
use crate::usecase::attempt::{
    CreateAttemptUseCase, GetAttemptUseCase, MarkReadyUseCase, UploadFaceImageUseCase,
    UploadPhotoIdImageUseCase,
};
use crate::usecase::status::VerificationQueries;
use crate::usecase::submit::SubmitAttemptUseCase;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AttemptResponse {
    pub id: Uuid,
    pub status: VerificationStatus,
    pub name: String,
    pub receipt_id: String,
    pub has_face_image: bool,
    pub has_photo_id_image: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_msg: String,
    #[serde(serialize_with = "campus_core::serde::opt_to_rfc3339_ms")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(serialize_with = "campus_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "campus_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<PhotoVerification> for AttemptResponse {
    fn from(attempt: PhotoVerification) -> Self {
        Self {
            id: attempt.id,
            status: attempt.status,
            has_face_image: !attempt.face_image_url.is_empty(),
            has_photo_id_image: !attempt.photo_id_image_url.is_empty(),
            name: attempt.name,
            receipt_id: attempt.receipt_id,
            error_msg: attempt.error_msg,
            submitted_at: attempt.submitted_at,
            created_at: attempt.created_at,
            updated_at: attempt.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub is_verified: bool,
    pub has_valid_or_pending: bool,
    pub active_attempt_id: Option<Uuid>,
}

// ── POST /verifications ──────────────────────────────────────────────────────

pub async fn create_attempt(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<AttemptResponse>), VerifyServiceError> {
    let usecase = CreateAttemptUseCase {
        repo: state.verification_repo(),
    };
    let attempt = usecase.execute(identity.user_id).await?;
    Ok((StatusCode::CREATED, Json(attempt.into())))
}

// ── GET /verifications/@me ───────────────────────────────────────────────────

pub async fn get_my_status(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, VerifyServiceError> {
    let queries = VerificationQueries {
        repo: state.verification_repo(),
        days_good_for: state.days_good_for,
    };
    let summary = queries.summary(identity.user_id, Utc::now()).await?;
    Ok(Json(StatusResponse {
        is_verified: summary.is_verified,
        has_valid_or_pending: summary.has_valid_or_pending,
        active_attempt_id: summary.active_attempt_id,
    }))
}

// ── GET /verifications/{id} ──────────────────────────────────────────────────

pub async fn get_attempt(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttemptResponse>, VerifyServiceError> {
    let usecase = GetAttemptUseCase {
        repo: state.verification_repo(),
    };
    let attempt = usecase.execute(identity.user_id, id).await?;
    Ok(Json(attempt.into()))
}

// ── PUT /verifications/{id}/face-image ───────────────────────────────────────

pub async fn upload_face_image(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<AttemptResponse>, VerifyServiceError> {
    let usecase = UploadFaceImageUseCase {
        repo: state.verification_repo(),
        images: state.images.clone(),
        cipher: state.cipher.clone(),
    };
    let attempt = usecase.execute(identity.user_id, id, &body).await?;
    Ok(Json(attempt.into()))
}

// ── PUT /verifications/{id}/photo-id-image ───────────────────────────────────

pub async fn upload_photo_id_image(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<AttemptResponse>, VerifyServiceError> {
    let usecase = UploadPhotoIdImageUseCase {
        repo: state.verification_repo(),
        images: state.images.clone(),
        cipher: state.cipher.clone(),
    };
    let attempt = usecase.execute(identity.user_id, id, &body).await?;
    Ok(Json(attempt.into()))
}

// ── POST /verifications/{id}/ready ───────────────────────────────────────────

pub async fn mark_ready(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttemptResponse>, VerifyServiceError> {
    let usecase = MarkReadyUseCase {
        repo: state.verification_repo(),
        profiles: state.profile_repo(),
    };
    let attempt = usecase.execute(identity.user_id, id).await?;
    Ok(Json(attempt.into()))
}

// ── POST /verifications/{id}/submit ──────────────────────────────────────────

pub async fn submit_attempt(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttemptResponse>, VerifyServiceError> {
    let usecase = SubmitAttemptUseCase {
        repo: state.verification_repo(),
        vendor: state.vendor.clone(),
        cipher: state.cipher.clone(),
        callback_url: state.callback_url.clone(),
    };
    let attempt = usecase.execute(identity.user_id, id).await?;
    Ok(Json(attempt.into()))
}
