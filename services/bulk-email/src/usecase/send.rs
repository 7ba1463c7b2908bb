use std::time::{Duration, Instant};

use rand::RngExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::repository::{CourseRepository, EmailRepository, MailTransport, TaskRepository};
use crate::domain::types::{
    BatchResult, Course, CourseEmail, DEFAULT_TEMPLATE, InstructorTask, Recipient,
    RecipientSelection, SendError, TaskProgress, TaskState, render_email, retry_delay,
    select_recipients,
};
use crate::error::BulkEmailError;

#[derive(Debug, Clone)]
pub struct SendSettings {
    /// Recipients per subtask. Each subtask has its own retry budget.
    pub emails_per_task: usize,
    pub max_retries: u32,
    pub base_delay: Duration,
    pub template: String,
}

impl Default for SendSettings {
    fn default() -> Self {
        Self {
            emails_per_task: 100,
            max_retries: 5,
            base_delay: Duration::from_secs(15),
            template: DEFAULT_TEMPLATE.to_owned(),
        }
    }
}

fn jitter() -> f64 {
    rand::rng().random_range(0.75..1.25)
}

/// Runs a bulk course email task to completion.
pub struct SendBulkEmailUseCase<C, E, T, M>
where
    C: CourseRepository,
    E: EmailRepository,
    T: TaskRepository,
    M: MailTransport,
{
    pub courses: C,
    pub emails: E,
    pub tasks: T,
    pub transport: M,
    pub settings: SendSettings,
}

impl<C, E, T, M> SendBulkEmailUseCase<C, E, T, M>
where
    C: CourseRepository,
    E: EmailRepository,
    T: TaskRepository,
    M: MailTransport,
{
    pub async fn execute(&self, task_id: Uuid) -> Result<TaskProgress, BulkEmailError> {
        let task = self
            .tasks
            .find_task(task_id)
            .await?
            .ok_or(BulkEmailError::TaskNotFound)?;
        self.run(task).await
    }

    /// Claim the oldest QUEUED task and run it. `Ok(None)` when there is nothing to do.
    pub async fn run_next(&self) -> Result<Option<TaskProgress>, BulkEmailError> {
        match self.tasks.claim_next_queued().await? {
            Some(task) => self.run(task).await.map(Some),
            None => Ok(None),
        }
    }

    /// Send the email behind `task`. The task ends SUCCESS once every recipient has been
    /// attempted, or FAILURE when its email or course cannot be loaded or its progress
    /// cannot be saved.
    pub async fn run(&self, task: InstructorTask) -> Result<TaskProgress, BulkEmailError> {
        let started = Instant::now();

        let (email, course, selection) = match self.prepare(&task).await {
            Ok(prepared) => prepared,
            Err(e) => {
                let progress = TaskProgress::new(&RecipientSelection::default());
                self.mark_failed(&task, progress, started).await;
                warn!(task_id = %task.task_id, error = %e, "bulk email task failed");
                return Err(e);
            }
        };

        let mut progress = TaskProgress::new(&selection);
        if let Err(e) = self
            .send_all(&task, &course, &email, &selection, &mut progress, started)
            .await
        {
            // Claimed tasks are never reclaimed; leave this one terminal.
            self.mark_failed(&task, progress, started).await;
            warn!(task_id = %task.task_id, error = %e, "bulk email task failed");
            return Err(e);
        }

        info!(
            task_id = %task.task_id,
            course_id = %task.course_id,
            total = progress.total,
            succeeded = progress.succeeded,
            failed = progress.failed,
            skipped = progress.skipped,
            "bulk email task completed"
        );
        Ok(progress)
    }

    /// Send every batch, persisting progress after each, and finish with SUCCESS.
    async fn send_all(
        &self,
        task: &InstructorTask,
        course: &Course,
        email: &CourseEmail,
        selection: &RecipientSelection,
        progress: &mut TaskProgress,
        started: Instant,
    ) -> Result<(), BulkEmailError> {
        let batch_size = self.settings.emails_per_task.max(1);
        for (index, batch) in selection.recipients.chunks(batch_size).enumerate() {
            let result = self.send_batch(course, email, batch).await;
            info!(
                task_id = %task.task_id,
                subtask = index,
                succeeded = result.succeeded,
                failed = result.failed,
                retries = result.retries,
                "subtask finished"
            );
            progress.add(&result);
            progress.duration_ms = elapsed_ms(started);
            self.tasks
                .update_progress(task.id, TaskState::Progress, progress)
                .await?;
        }

        progress.duration_ms = elapsed_ms(started);
        self.tasks
            .update_progress(task.id, TaskState::Success, progress)
            .await
    }

    /// Best effort: record FAILURE with whatever was counted so far.
    async fn mark_failed(&self, task: &InstructorTask, mut progress: TaskProgress, started: Instant) {
        progress.duration_ms = elapsed_ms(started);
        if let Err(e) = self
            .tasks
            .update_progress(task.id, TaskState::Failure, &progress)
            .await
        {
            warn!(task_id = %task.task_id, error = %e, "could not mark task failed");
        }
    }

    async fn prepare(
        &self,
        task: &InstructorTask,
    ) -> Result<(CourseEmail, Course, RecipientSelection), BulkEmailError> {
        let input = task.input().ok_or(BulkEmailError::EmailNotFound)?;
        let email = self
            .emails
            .find_email(input.email_id)
            .await?
            .ok_or(BulkEmailError::EmailNotFound)?;
        let course = self
            .courses
            .find_course(&email.course_id)
            .await?
            .ok_or(BulkEmailError::CourseNotFound)?;
        let members = self.courses.list_members(&email.course_id).await?;
        let selection = select_recipients(email.to_option, email.sender_id, &members);
        Ok((email, course, selection))
    }

    /// Send to every recipient in `batch`. A transient failure pauses the batch and resends
    /// from the failed recipient; once the retry budget is spent the unsent rest fail.
    async fn send_batch(
        &self,
        course: &Course,
        email: &CourseEmail,
        batch: &[Recipient],
    ) -> BatchResult {
        let mut result = BatchResult::default();
        let mut next = 0;
        while let Some(recipient) = batch.get(next) {
            let message = render_email(
                &self.settings.template,
                &course.display_name,
                email,
                recipient,
            );
            match self.transport.send(&message).await {
                Ok(()) => {
                    result.succeeded += 1;
                    next += 1;
                }
                Err(SendError::Permanent(reason)) => {
                    warn!(recipient = %recipient.email, %reason, "email rejected");
                    result.failed += 1;
                    next += 1;
                }
                Err(SendError::Transient(reason)) => {
                    if result.retries >= self.settings.max_retries {
                        let remaining = (batch.len() - next) as u64;
                        warn!(%reason, remaining, "retries exhausted, failing rest of subtask");
                        result.failed += remaining;
                        break;
                    }
                    let delay = retry_delay(self.settings.base_delay, result.retries, jitter());
                    result.retries += 1;
                    warn!(%reason, retry = result.retries, ?delay, "transient send failure");
                    tokio::time::sleep(delay).await;
                }
            }
        }
        result
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    // Never zero, even for an empty roster.
    (started.elapsed().as_millis() as u64).max(1)
}
