use chrono::{Duration, Utc};
use uuid::Uuid;

use campus_verify::domain::types::{SubmissionOutcome, VerificationStatus};
use campus_verify::usecase::retry::{RetryReport, RetrySubmissionsUseCase};

use crate::helpers::{
    MockVendor, MockVerificationRepo, TEST_CALLBACK_URL, attempt_with_images, test_cipher,
};

fn usecase(
    repo: MockVerificationRepo,
    vendor: MockVendor,
) -> RetrySubmissionsUseCase<MockVerificationRepo, MockVendor> {
    RetrySubmissionsUseCase {
        repo,
        vendor,
        cipher: test_cipher(),
        callback_url: TEST_CALLBACK_URL.into(),
        batch_size: 10,
    }
}

#[tokio::test]
async fn should_resubmit_must_retry_attempts() {
    let user_id = Uuid::new_v4();
    let failed = attempt_with_images(user_id, VerificationStatus::MustRetry, Utc::now());
    let approved = attempt_with_images(user_id, VerificationStatus::Approved, Utc::now());
    let repo = MockVerificationRepo::new(vec![failed.clone(), approved.clone()]);
    let vendor = MockVendor::accepting();
    let sent = vendor.submissions_handle();

    let report = usecase(repo.clone(), vendor).execute().await.unwrap();

    assert_eq!(
        report,
        RetryReport {
            resubmitted: 1,
            still_failing: 0,
            skipped: 0
        }
    );
    assert_eq!(repo.get(failed.id).status, VerificationStatus::Submitted);
    assert_eq!(repo.get(approved.id).status, VerificationStatus::Approved);
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].expected_name, "Rust Ferris");
}

#[tokio::test]
async fn should_leave_attempt_in_must_retry_while_vendor_is_down() {
    let failed = attempt_with_images(Uuid::new_v4(), VerificationStatus::MustRetry, Utc::now());
    let repo = MockVerificationRepo::new(vec![failed.clone()]);
    let vendor = MockVendor::answering(SubmissionOutcome::Unavailable("timeout".into()));

    let report = usecase(repo.clone(), vendor).execute().await.unwrap();

    assert_eq!(report.still_failing, 1);
    let stored = repo.get(failed.id);
    assert_eq!(stored.status, VerificationStatus::MustRetry);
    assert_eq!(stored.error_msg, "timeout");
}

#[tokio::test]
async fn should_respect_batch_size_oldest_first() {
    let user_id = Uuid::new_v4();
    let now = Utc::now();
    let mut attempts = vec![];
    for minutes in 0..3 {
        let mut attempt = attempt_with_images(user_id, VerificationStatus::MustRetry, now);
        attempt.status_changed_at = now - Duration::minutes(minutes);
        attempts.push(attempt);
    }
    let oldest = attempts[2].id;
    let repo = MockVerificationRepo::new(attempts);

    let mut retry = usecase(repo.clone(), MockVendor::accepting());
    retry.batch_size = 1;
    let report = retry.execute().await.unwrap();

    assert_eq!(report.resubmitted, 1);
    assert_eq!(repo.get(oldest).status, VerificationStatus::Submitted);
}
