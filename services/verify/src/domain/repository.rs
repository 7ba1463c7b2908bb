#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{
    PhotoVerification, SubmissionOutcome, VendorSubmission, VerificationStatus,
};
use crate::error::VerifyServiceError;

/// Display names users submit for verification.
pub trait ProfileRepository: Send + Sync {
    async fn find_name(&self, user_id: Uuid) -> Result<Option<String>, VerifyServiceError>;

    /// Insert or replace the user's profile name.
    async fn upsert_name(&self, user_id: Uuid, name: &str) -> Result<(), VerifyServiceError>;
}

/// Persistence for verification attempts.
pub trait VerificationRepository: Send + Sync {
    async fn create(&self, attempt: &PhotoVerification) -> Result<(), VerifyServiceError>;

    /// Write `attempt` back only if the stored row is still in `expected` status.
    /// Returns `ConcurrentModification` when another writer got there first.
    async fn save(
        &self,
        attempt: &PhotoVerification,
        expected: VerificationStatus,
    ) -> Result<(), VerifyServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PhotoVerification>, VerifyServiceError>;

    async fn find_by_receipt_id(
        &self,
        receipt_id: &str,
    ) -> Result<Option<PhotoVerification>, VerifyServiceError>;

    /// Most recent `ready` attempt for the user, newest `created_at` first, ties by id.
    async fn active_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<PhotoVerification>, VerifyServiceError>;

    /// Whether the user has an attempt in any of `statuses` created at or after `since`.
    async fn exists_with_status(
        &self,
        user_id: Uuid,
        statuses: &[VerificationStatus],
        since: DateTime<Utc>,
    ) -> Result<bool, VerifyServiceError>;

    /// Oldest-first page of attempts in `status`, by `status_changed_at`.
    async fn list_by_status(
        &self,
        status: VerificationStatus,
        limit: u64,
    ) -> Result<Vec<PhotoVerification>, VerifyServiceError>;
}

/// Third-party identity review service.
pub trait VerificationVendor: Send + Sync {
    async fn submit(&self, submission: &VendorSubmission) -> SubmissionOutcome;
}

/// Blob storage for encrypted images.
pub trait ImageStore: Send + Sync {
    /// Store `bytes` under `key` and return the URL the vendor will fetch it from.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, VerifyServiceError>;
}
