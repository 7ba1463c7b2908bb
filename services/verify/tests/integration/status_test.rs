use chrono::{Duration, Utc};
use uuid::Uuid;

use campus_verify::domain::types::{DEFAULT_DAYS_GOOD_FOR, VerificationStatus};
use campus_verify::usecase::status::VerificationQueries;

use crate::helpers::{MockVerificationRepo, attempt_with_images};

fn queries(repo: MockVerificationRepo) -> VerificationQueries<MockVerificationRepo> {
    VerificationQueries {
        repo,
        days_good_for: DEFAULT_DAYS_GOOD_FOR,
    }
}

// ── active_for_user ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_have_no_active_attempt_without_attempts() {
    let queries = queries(MockVerificationRepo::empty());
    assert!(queries.active_for_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn should_not_treat_created_attempt_as_active() {
    let user_id = Uuid::new_v4();
    let created = attempt_with_images(user_id, VerificationStatus::Created, Utc::now());
    let queries = queries(MockVerificationRepo::new(vec![created]));

    assert!(queries.active_for_user(user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn should_return_ready_attempt_as_active() {
    let user_id = Uuid::new_v4();
    let ready = attempt_with_images(user_id, VerificationStatus::Ready, Utc::now());
    let queries = queries(MockVerificationRepo::new(vec![ready.clone()]));

    let active = queries.active_for_user(user_id).await.unwrap().unwrap();
    assert_eq!(active.id, ready.id);
}

#[tokio::test]
async fn should_return_newest_ready_attempt() {
    let user_id = Uuid::new_v4();
    let now = Utc::now();
    let older = attempt_with_images(user_id, VerificationStatus::Ready, now - Duration::hours(1));
    let newer = attempt_with_images(user_id, VerificationStatus::Ready, now);
    let queries = queries(MockVerificationRepo::new(vec![newer.clone(), older]));

    let active = queries.active_for_user(user_id).await.unwrap().unwrap();
    assert_eq!(active.id, newer.id);
}

#[tokio::test]
async fn should_clear_active_attempt_once_submitted() {
    let user_id = Uuid::new_v4();
    let submitted = attempt_with_images(user_id, VerificationStatus::Submitted, Utc::now());
    let queries = queries(MockVerificationRepo::new(vec![submitted]));

    assert!(queries.active_for_user(user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn should_keep_older_ready_attempt_over_newer_unready_one() {
    let user_id = Uuid::new_v4();
    let now = Utc::now();
    let ready = attempt_with_images(user_id, VerificationStatus::Ready, now - Duration::hours(1));
    let created = attempt_with_images(user_id, VerificationStatus::Created, now);
    let denied = attempt_with_images(user_id, VerificationStatus::Denied, now);
    let queries = queries(MockVerificationRepo::new(vec![ready.clone(), created, denied]));

    let active = queries.active_for_user(user_id).await.unwrap().unwrap();
    assert_eq!(active.id, ready.id);
}

#[tokio::test]
async fn should_ignore_other_users_ready_attempts() {
    let user_id = Uuid::new_v4();
    let other = attempt_with_images(Uuid::new_v4(), VerificationStatus::Ready, Utc::now());
    let queries = queries(MockVerificationRepo::new(vec![other]));

    assert!(queries.active_for_user(user_id).await.unwrap().is_none());
}

// ── user_is_verified ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_only_count_approved_attempts_as_verified() {
    let user_id = Uuid::new_v4();
    let now = Utc::now();
    let mut attempts = vec![];
    for status in [
        VerificationStatus::Created,
        VerificationStatus::Ready,
        VerificationStatus::Submitted,
        VerificationStatus::MustRetry,
        VerificationStatus::Denied,
    ] {
        attempts.push(attempt_with_images(user_id, status, now));
    }
    let repo = MockVerificationRepo::new(attempts);
    assert!(!queries(repo.clone()).user_is_verified(user_id, now).await.unwrap());

    repo.attempts
        .lock()
        .unwrap()
        .push(attempt_with_images(user_id, VerificationStatus::Approved, now));
    assert!(queries(repo).user_is_verified(user_id, now).await.unwrap());
}

#[tokio::test]
async fn should_expire_approval_after_days_good_for() {
    let user_id = Uuid::new_v4();
    let now = Utc::now();
    let stale = attempt_with_images(
        user_id,
        VerificationStatus::Approved,
        now - Duration::days(DEFAULT_DAYS_GOOD_FOR + 1),
    );
    let queries = queries(MockVerificationRepo::new(vec![stale]));

    assert!(!queries.user_is_verified(user_id, now).await.unwrap());
    assert!(!queries.user_has_valid_or_pending(user_id, now).await.unwrap());
}

// ── user_has_valid_or_pending ────────────────────────────────────────────────

#[tokio::test]
async fn should_count_submitted_must_retry_and_approved_as_valid_or_pending() {
    let now = Utc::now();
    for status in [
        VerificationStatus::Submitted,
        VerificationStatus::MustRetry,
        VerificationStatus::Approved,
    ] {
        let user_id = Uuid::new_v4();
        let queries = queries(MockVerificationRepo::new(vec![attempt_with_images(
            user_id, status, now,
        )]));
        assert!(
            queries.user_has_valid_or_pending(user_id, now).await.unwrap(),
            "{status} should count"
        );
    }
}

#[tokio::test]
async fn should_not_count_created_ready_or_denied_as_valid_or_pending() {
    let now = Utc::now();
    for status in [
        VerificationStatus::Created,
        VerificationStatus::Ready,
        VerificationStatus::Denied,
    ] {
        let user_id = Uuid::new_v4();
        let queries = queries(MockVerificationRepo::new(vec![attempt_with_images(
            user_id, status, now,
        )]));
        assert!(
            !queries.user_has_valid_or_pending(user_id, now).await.unwrap(),
            "{status} should not count"
        );
    }
}

#[tokio::test]
async fn should_summarize_user_state() {
    let user_id = Uuid::new_v4();
    let now = Utc::now();
    let ready = attempt_with_images(user_id, VerificationStatus::Ready, now);
    let queries = queries(MockVerificationRepo::new(vec![ready.clone()]));

    let summary = queries.summary(user_id, now).await.unwrap();

    assert!(!summary.is_verified);
    assert!(!summary.has_valid_or_pending);
    assert_eq!(summary.active_attempt_id, Some(ready.id));
}
