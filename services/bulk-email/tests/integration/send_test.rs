use uuid::Uuid;

use campus_bulk_email::domain::types::{CourseRole, SendError, SendTo, TaskState};
use campus_bulk_email::error::BulkEmailError;

use crate::helpers::{
    MockTransport, course_email, fast_settings, member, roster, send_usecase,
};

fn permanent() -> Result<(), SendError> {
    Err(SendError::Permanent("554 Email address is blacklisted".into()))
}

fn transient() -> Result<(), SendError> {
    Err(SendError::Transient("425 Disconnecting".into()))
}

#[tokio::test]
async fn should_email_every_member_and_succeed() {
    let members = roster(5);
    let email = course_email(members[0].user_id, SendTo::All);
    let transport = MockTransport::always_ok();
    let (usecase, task) = send_usecase(&email, members, transport.clone(), fast_settings(100));

    let progress = usecase.execute(task.id).await.unwrap();

    assert_eq!(progress.action_name, "emailed");
    assert_eq!(progress.total, 6);
    assert_eq!(progress.attempted, 6);
    assert_eq!(progress.succeeded, 6);
    assert_eq!(progress.failed, 0);
    assert!(progress.duration_ms > 0);

    let stored = usecase.tasks.get(task.id);
    assert_eq!(stored.task_state, TaskState::Success);
    assert_eq!(usecase.tasks.stored_progress(task.id), progress);
    assert_eq!(transport.sent_to().len(), 6);
}

#[tokio::test]
async fn should_render_subject_with_course_title() {
    let members = roster(0);
    let email = course_email(members[0].user_id, SendTo::Myself);
    let transport = MockTransport::always_ok();
    let (usecase, task) = send_usecase(&email, members, transport.clone(), fast_settings(100));

    usecase.execute(task.id).await.unwrap();

    let sent = transport.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "[Test Course] Test Subject");
    assert!(sent[0].html_body.contains("<p>This is a test message</p>"));
    assert!(sent[0].html_body.contains("instructor@example.com"));
}

#[tokio::test]
async fn should_count_permanent_failures_without_retrying() {
    // Every fourth send is rejected.
    let members = roster(6);
    let email = course_email(members[0].user_id, SendTo::All);
    let transport = MockTransport::cycle(vec![permanent(), Ok(()), Ok(()), Ok(())]);
    let (usecase, task) = send_usecase(&email, members, transport.clone(), fast_settings(100));

    let progress = usecase.execute(task.id).await.unwrap();

    let num_emails: u64 = 7;
    let expected_failed = num_emails.div_ceil(4);
    assert_eq!(progress.failed, expected_failed);
    assert_eq!(progress.succeeded, num_emails - expected_failed);
    assert_eq!(progress.attempted, num_emails);
    assert_eq!(transport.sent_to().len() as u64, num_emails);
    assert_eq!(usecase.tasks.get(task.id).task_state, TaskState::Success);
}

#[tokio::test]
async fn should_retry_after_disconnect() {
    let members = roster(1);
    let email = course_email(members[0].user_id, SendTo::All);
    let transport = MockTransport::cycle(vec![transient(), Ok(())]);
    let (usecase, task) = send_usecase(&email, members, transport.clone(), fast_settings(100));

    let progress = usecase.execute(task.id).await.unwrap();

    assert_eq!(progress.succeeded, 2);
    assert_eq!(progress.failed, 0);
    assert_eq!(
        transport.sent_to(),
        [
            "instructor@example.com",
            "instructor@example.com",
            "robot0@example.com",
            "robot0@example.com"
        ]
    );
}

#[tokio::test]
async fn should_fail_each_remaining_recipient_once_when_retries_run_out() {
    let members = roster(1);
    let email = course_email(members[0].user_id, SendTo::All);
    let transport = MockTransport::cycle(vec![transient()]);
    let settings = fast_settings(100);
    let max_retries = settings.max_retries as usize;
    let (usecase, task) = send_usecase(&email, members, transport.clone(), settings);

    let progress = usecase.execute(task.id).await.unwrap();

    assert_eq!(progress.succeeded, 0);
    assert_eq!(progress.failed, 2);
    assert_eq!(progress.attempted, 2);
    assert_eq!(transport.sent_to().len(), max_retries + 1);
    assert_eq!(usecase.tasks.get(task.id).task_state, TaskState::Success);
}

#[tokio::test]
async fn should_give_each_subtask_its_own_retry_budget() {
    let members = roster(3);
    let email = course_email(members[0].user_id, SendTo::All);
    let transport = MockTransport::cycle(vec![transient()]);
    let settings = fast_settings(2);
    let max_retries = settings.max_retries as usize;
    let (usecase, task) = send_usecase(&email, members, transport.clone(), settings);

    let progress = usecase.execute(task.id).await.unwrap();

    assert_eq!(progress.failed, 4);
    assert_eq!(transport.sent_to().len(), 2 * (max_retries + 1));
}

#[tokio::test]
async fn should_persist_progress_after_each_subtask() {
    let members = roster(3);
    let email = course_email(members[0].user_id, SendTo::All);
    let (usecase, task) =
        send_usecase(&email, members, MockTransport::always_ok(), fast_settings(2));

    usecase.execute(task.id).await.unwrap();

    let updates = usecase.tasks.updates.lock().unwrap();
    let states: Vec<TaskState> = updates.iter().map(|(state, _)| *state).collect();
    assert_eq!(
        states,
        [TaskState::Progress, TaskState::Progress, TaskState::Success]
    );
    assert_eq!(updates[0].1.attempted, 2);
    assert_eq!(updates[1].1.attempted, 4);
    assert_eq!(updates[0].1.total, 4);
}

#[tokio::test]
async fn should_skip_opted_out_members() {
    let mut members = roster(3);
    members[2].email_opt_out = true;
    let email = course_email(members[0].user_id, SendTo::All);
    let transport = MockTransport::always_ok();
    let (usecase, task) = send_usecase(&email, members, transport.clone(), fast_settings(100));

    let progress = usecase.execute(task.id).await.unwrap();

    assert_eq!(progress.total, 4);
    assert_eq!(progress.skipped, 1);
    assert_eq!(progress.succeeded, 3);
    assert!(!transport.sent_to().contains(&"robot1@example.com".to_owned()));
}

#[tokio::test]
async fn should_send_staff_email_to_staff_only() {
    let mut members = roster(2);
    members.push(member("ta", CourseRole::Staff));
    let email = course_email(members[0].user_id, SendTo::Staff);
    let transport = MockTransport::always_ok();
    let (usecase, task) = send_usecase(&email, members, transport.clone(), fast_settings(100));

    usecase.execute(task.id).await.unwrap();

    assert_eq!(
        transport.sent_to(),
        ["instructor@example.com", "ta@example.com"]
    );
}

#[tokio::test]
async fn should_mark_task_failed_for_unknown_course() {
    let members = roster(1);
    let email = course_email(members[0].user_id, SendTo::All);
    let transport = MockTransport::always_ok();
    let (mut usecase, task) = send_usecase(&email, members, transport.clone(), fast_settings(100));
    usecase.courses.courses.clear();

    let result = usecase.execute(task.id).await;

    assert!(matches!(result, Err(BulkEmailError::CourseNotFound)));
    assert_eq!(usecase.tasks.get(task.id).task_state, TaskState::Failure);
    assert!(transport.sent_to().is_empty());
}

#[tokio::test]
async fn should_mark_task_failed_for_missing_email() {
    let members = roster(1);
    let email = course_email(members[0].user_id, SendTo::All);
    let (usecase, task) =
        send_usecase(&email, members, MockTransport::always_ok(), fast_settings(100));
    usecase.emails.emails.lock().unwrap().clear();

    let result = usecase.execute(task.id).await;

    assert!(matches!(result, Err(BulkEmailError::EmailNotFound)));
    assert_eq!(usecase.tasks.get(task.id).task_state, TaskState::Failure);
}

#[tokio::test]
async fn should_return_task_not_found() {
    let members = roster(1);
    let email = course_email(members[0].user_id, SendTo::All);
    let (usecase, _task) =
        send_usecase(&email, members, MockTransport::always_ok(), fast_settings(100));

    let result = usecase.execute(Uuid::new_v4()).await;

    assert!(matches!(result, Err(BulkEmailError::TaskNotFound)));
}

#[tokio::test]
async fn should_claim_queued_task_once() {
    let members = roster(2);
    let email = course_email(members[0].user_id, SendTo::All);
    let (usecase, task) =
        send_usecase(&email, members, MockTransport::always_ok(), fast_settings(100));

    let first = usecase.run_next().await.unwrap();
    let second = usecase.run_next().await.unwrap();

    assert_eq!(first.map(|p| p.succeeded), Some(3));
    assert!(second.is_none());
    assert_eq!(usecase.tasks.get(task.id).task_state, TaskState::Success);
}

#[tokio::test]
async fn should_fail_claimed_task_when_progress_write_fails() {
    let members = roster(2);
    let email = course_email(members[0].user_id, SendTo::All);
    let transport = MockTransport::always_ok();
    let (usecase, task) = send_usecase(&email, members, transport.clone(), fast_settings(100));
    *usecase.tasks.fail_next_write.lock().unwrap() = Some(TaskState::Progress);

    let first = usecase.run_next().await;
    let second = usecase.run_next().await.unwrap();

    assert!(matches!(first, Err(BulkEmailError::Internal(_))));
    assert!(second.is_none());
    assert_eq!(transport.sent_to().len(), 3);
    assert_eq!(usecase.tasks.get(task.id).task_state, TaskState::Failure);
    let stored = usecase.tasks.stored_progress(task.id);
    assert_eq!(stored.succeeded, 3);
    assert_eq!(stored.attempted, 3);
}

#[tokio::test]
async fn should_fail_task_when_final_write_fails() {
    let members = roster(1);
    let email = course_email(members[0].user_id, SendTo::All);
    let (usecase, task) =
        send_usecase(&email, members, MockTransport::always_ok(), fast_settings(100));
    *usecase.tasks.fail_next_write.lock().unwrap() = Some(TaskState::Success);

    let result = usecase.execute(task.id).await;

    assert!(result.is_err());
    assert_eq!(usecase.tasks.get(task.id).task_state, TaskState::Failure);
    let states: Vec<TaskState> = usecase
        .tasks
        .updates
        .lock()
        .unwrap()
        .iter()
        .map(|(state, _)| *state)
        .collect();
    assert_eq!(states, vec![TaskState::Progress, TaskState::Failure]);
}
