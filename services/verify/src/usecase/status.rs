use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::repository::VerificationRepository;
use crate::domain::types::{PhotoVerification, VerificationStatus, VerificationSummary};
use crate::error::VerifyServiceError;

/// Read-side questions about a user's verification state.
pub struct VerificationQueries<R: VerificationRepository> {
    pub repo: R,
    /// Approvals older than this many days no longer count.
    pub days_good_for: i64,
}

impl<R: VerificationRepository> VerificationQueries<R> {
    fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days_good_for)
    }

    /// Newest attempt in `ready`, the one awaiting submission.
    pub async fn active_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PhotoVerification>, VerifyServiceError> {
        self.repo.active_for_user(user_id).await
    }

    /// Whether an approved attempt was created within the validity window.
    pub async fn user_is_verified(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, VerifyServiceError> {
        self.repo
            .exists_with_status(
                user_id,
                &[VerificationStatus::Approved],
                self.window_start(now),
            )
            .await
    }

    /// Whether the user has an approved, submitted or must_retry attempt within the window.
    pub async fn user_has_valid_or_pending(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, VerifyServiceError> {
        self.repo
            .exists_with_status(
                user_id,
                &VerificationStatus::VALID_OR_PENDING,
                self.window_start(now),
            )
            .await
    }

    pub async fn summary(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<VerificationSummary, VerifyServiceError> {
        Ok(VerificationSummary {
            is_verified: self.user_is_verified(user_id, now).await?,
            has_valid_or_pending: self.user_has_valid_or_pending(user_id, now).await?,
            active_attempt_id: self.active_for_user(user_id).await?.map(|a| a.id),
        })
    }
}
