use chrono::Utc;
use uuid::Uuid;

use campus_domain::course::CourseKey;

use crate::domain::repository::{CourseRepository, EmailRepository};
use crate::domain::types::{CourseEmail, InstructorTask, SendTo};
use crate::error::BulkEmailError;

const MAX_SUBJECT_LEN: usize = 128;

pub struct NewCourseEmail {
    pub to_option: SendTo,
    pub subject: String,
    pub html_message: String,
}

/// Store a course email and queue the task that sends it.
pub struct CreateCourseEmailUseCase<C: CourseRepository, E: EmailRepository> {
    pub courses: C,
    pub emails: E,
}

impl<C: CourseRepository, E: EmailRepository> CreateCourseEmailUseCase<C, E> {
    pub async fn execute(
        &self,
        requester_id: Uuid,
        course_id: CourseKey,
        input: NewCourseEmail,
    ) -> Result<(CourseEmail, InstructorTask), BulkEmailError> {
        let subject = input.subject.trim();
        if subject.is_empty() || subject.chars().count() > MAX_SUBJECT_LEN {
            return Err(BulkEmailError::InvalidEmail(format!(
                "subject must be between 1 and {MAX_SUBJECT_LEN} characters"
            )));
        }
        if input.html_message.trim().is_empty() {
            return Err(BulkEmailError::InvalidEmail("message is empty".to_owned()));
        }

        if self.courses.find_course(&course_id).await?.is_none() {
            return Err(BulkEmailError::CourseNotFound);
        }
        let member = self.courses.find_member(&course_id, requester_id).await?;
        if !member.is_some_and(|m| m.role.is_course_staff()) {
            return Err(BulkEmailError::NotCourseStaff);
        }

        let now = Utc::now();
        let email = CourseEmail {
            id: Uuid::now_v7(),
            course_id,
            sender_id: requester_id,
            to_option: input.to_option,
            subject: subject.to_owned(),
            html_message: input.html_message,
            created_at: now,
        };
        let task = InstructorTask::for_email(&email, now);
        self.emails.create_email_with_task(&email, &task).await?;

        tracing::info!(
            course_id = %email.course_id,
            email_id = %email.id,
            task_id = %task.task_id,
            to = email.to_option.as_str(),
            "course email queued"
        );
        Ok((email, task))
    }
}
