use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{VerificationRepository, VerificationVendor};
use crate::domain::types::{
    PhotoVerification, SubmissionOutcome, VendorSubmission, VerificationStatus,
};
use crate::error::VerifyServiceError;
use crate::infra::crypto::ImageCipher;
use crate::usecase::attempt::load_owned;

/// Vendor payload for a ready attempt.
pub fn build_submission(
    attempt: &PhotoVerification,
    cipher: &ImageCipher,
    callback_url: &str,
) -> anyhow::Result<VendorSubmission> {
    Ok(VendorSubmission {
        receipt_id: attempt.receipt_id.clone(),
        expected_name: attempt.name.clone(),
        photo_id_url: attempt.photo_id_image_url.clone(),
        photo_id_key: attempt.photo_id_key.clone(),
        send_response_to: callback_url.to_owned(),
        user_photo_url: attempt.face_image_url.clone(),
        user_photo_key: cipher.wrapped_face_key()?,
    })
}

/// Send a ready attempt to the vendor and persist the outcome.
///
/// The vendor is never contacted unless the attempt is `ready`. A rejection or an
/// unreachable vendor leaves the attempt in `must_retry` and is not an error.
pub async fn submit_attempt<R, V>(
    repo: &R,
    vendor: &V,
    cipher: &ImageCipher,
    callback_url: &str,
    mut attempt: PhotoVerification,
) -> Result<PhotoVerification, VerifyServiceError>
where
    R: VerificationRepository,
    V: VerificationVendor,
{
    attempt.check_can_submit()?;
    let submission = build_submission(&attempt, cipher, callback_url)?;

    // Stored as submitted before the call: the vendor may post its verdict before
    // the request returns.
    let mut in_flight = attempt.clone();
    in_flight.submit(&SubmissionOutcome::Accepted, Utc::now())?;
    repo.save(&in_flight, VerificationStatus::Ready).await?;

    let outcome = vendor.submit(&submission).await;
    if matches!(outcome, SubmissionOutcome::Accepted) {
        return Ok(in_flight);
    }
    attempt.submit(&outcome, Utc::now())?;
    repo.save(&attempt, VerificationStatus::Submitted).await?;

    tracing::warn!(
        attempt_id = %attempt.id,
        error_msg = %attempt.error_msg,
        "submission not accepted, attempt must be retried"
    );
    Ok(attempt)
}

pub struct SubmitAttemptUseCase<R: VerificationRepository, V: VerificationVendor> {
    pub repo: R,
    pub vendor: V,
    pub cipher: Arc<ImageCipher>,
    pub callback_url: String,
}

impl<R: VerificationRepository, V: VerificationVendor> SubmitAttemptUseCase<R, V> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<PhotoVerification, VerifyServiceError> {
        let attempt = load_owned(&self.repo, user_id, id).await?;
        submit_attempt(
            &self.repo,
            &self.vendor,
            &self.cipher,
            &self.callback_url,
            attempt,
        )
        .await
    }
}
