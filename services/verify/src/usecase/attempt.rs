use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{ImageStore, ProfileRepository, VerificationRepository};
use crate::domain::types::{PhotoVerification, Transition};
use crate::error::VerifyServiceError;
use crate::infra::crypto::ImageCipher;

/// Load an attempt owned by `user_id`. Other users' attempts read as not found.
pub async fn load_owned<R: VerificationRepository>(
    repo: &R,
    user_id: Uuid,
    id: Uuid,
) -> Result<PhotoVerification, VerifyServiceError> {
    repo.find_by_id(id)
        .await?
        .filter(|attempt| attempt.user_id == user_id)
        .ok_or(VerifyServiceError::AttemptNotFound)
}

// ── Create ───────────────────────────────────────────────────────────────────

pub struct CreateAttemptUseCase<R: VerificationRepository> {
    pub repo: R,
}

impl<R: VerificationRepository> CreateAttemptUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<PhotoVerification, VerifyServiceError> {
        let attempt = PhotoVerification::new(user_id, Utc::now());
        self.repo.create(&attempt).await?;
        Ok(attempt)
    }
}

// ── Get ──────────────────────────────────────────────────────────────────────

pub struct GetAttemptUseCase<R: VerificationRepository> {
    pub repo: R,
}

impl<R: VerificationRepository> GetAttemptUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<PhotoVerification, VerifyServiceError> {
        load_owned(&self.repo, user_id, id).await
    }
}

// ── Image uploads ────────────────────────────────────────────────────────────

pub struct UploadFaceImageUseCase<R: VerificationRepository, S: ImageStore> {
    pub repo: R,
    pub images: S,
    pub cipher: Arc<ImageCipher>,
}

impl<R: VerificationRepository, S: ImageStore> UploadFaceImageUseCase<R, S> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        id: Uuid,
        image: &[u8],
    ) -> Result<PhotoVerification, VerifyServiceError> {
        if image.is_empty() {
            return Err(VerifyServiceError::EmptyImage);
        }
        let mut attempt = load_owned(&self.repo, user_id, id).await?;
        attempt.ensure_can(Transition::UploadFaceImage)?;

        let sealed = self.cipher.seal_face_image(image)?;
        let key = format!("{}/face.enc", attempt.receipt_id);
        let url = self.images.put(&key, sealed).await?;

        let previous = attempt.status;
        attempt.attach_face_image(url, Utc::now())?;
        self.repo.save(&attempt, previous).await?;
        Ok(attempt)
    }
}

pub struct UploadPhotoIdImageUseCase<R: VerificationRepository, S: ImageStore> {
    pub repo: R,
    pub images: S,
    pub cipher: Arc<ImageCipher>,
}

impl<R: VerificationRepository, S: ImageStore> UploadPhotoIdImageUseCase<R, S> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        id: Uuid,
        image: &[u8],
    ) -> Result<PhotoVerification, VerifyServiceError> {
        if image.is_empty() {
            return Err(VerifyServiceError::EmptyImage);
        }
        let mut attempt = load_owned(&self.repo, user_id, id).await?;
        attempt.ensure_can(Transition::UploadPhotoIdImage)?;

        let sealed = self.cipher.seal_photo_id(image)?;
        let key = format!("{}/photo_id.enc", attempt.receipt_id);
        let url = self.images.put(&key, sealed.ciphertext).await?;

        let previous = attempt.status;
        attempt.attach_photo_id_image(url, sealed.wrapped_key, Utc::now())?;
        self.repo.save(&attempt, previous).await?;
        Ok(attempt)
    }
}

// ── Mark ready ───────────────────────────────────────────────────────────────

pub struct MarkReadyUseCase<R: VerificationRepository, P: ProfileRepository> {
    pub repo: R,
    pub profiles: P,
}

impl<R: VerificationRepository, P: ProfileRepository> MarkReadyUseCase<R, P> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<PhotoVerification, VerifyServiceError> {
        let mut attempt = load_owned(&self.repo, user_id, id).await?;
        let profile_name = self.profiles.find_name(user_id).await?.unwrap_or_default();

        let previous = attempt.status;
        attempt.mark_ready(&profile_name, Utc::now())?;
        self.repo.save(&attempt, previous).await?;
        Ok(attempt)
    }
}
