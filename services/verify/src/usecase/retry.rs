use std::sync::Arc;

use chrono::Utc;

use crate::domain::repository::{VerificationRepository, VerificationVendor};
use crate::domain::types::VerificationStatus;
use crate::error::VerifyServiceError;
use crate::infra::crypto::ImageCipher;
use crate::usecase::submit::submit_attempt;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RetryReport {
    pub resubmitted: usize,
    pub still_failing: usize,
    pub skipped: usize,
}

/// Resubmits attempts left in `must_retry` by a vendor rejection, outage or system error.
pub struct RetrySubmissionsUseCase<R: VerificationRepository, V: VerificationVendor> {
    pub repo: R,
    pub vendor: V,
    pub cipher: Arc<ImageCipher>,
    pub callback_url: String,
    pub batch_size: u64,
}

impl<R: VerificationRepository, V: VerificationVendor> RetrySubmissionsUseCase<R, V> {
    pub async fn execute(&self) -> Result<RetryReport, VerifyServiceError> {
        let attempts = self
            .repo
            .list_by_status(VerificationStatus::MustRetry, self.batch_size)
            .await?;

        let mut report = RetryReport::default();
        for mut attempt in attempts {
            let frozen_name = attempt.name.clone();
            if let Err(e) = attempt.mark_ready(&frozen_name, Utc::now()) {
                tracing::warn!(attempt_id = %attempt.id, error = %e, "cannot retry attempt");
                report.skipped += 1;
                continue;
            }
            match self.repo.save(&attempt, VerificationStatus::MustRetry).await {
                Ok(()) => {}
                Err(VerifyServiceError::ConcurrentModification) => {
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            }

            let id = attempt.id;
            match submit_attempt(
                &self.repo,
                &self.vendor,
                &self.cipher,
                &self.callback_url,
                attempt,
            )
            .await
            {
                Ok(a) if a.status == VerificationStatus::Submitted => report.resubmitted += 1,
                Ok(_) => report.still_failing += 1,
                Err(VerifyServiceError::ConcurrentModification) => report.skipped += 1,
                Err(e) => {
                    tracing::error!(attempt_id = %id, error = %e, "resubmission failed");
                    return Err(e);
                }
            }
        }

        if report != RetryReport::default() {
            tracing::info!(
                resubmitted = report.resubmitted,
                still_failing = report.still_failing,
                skipped = report.skipped,
                "retried must_retry submissions"
            );
        }
        Ok(report)
    }
}
