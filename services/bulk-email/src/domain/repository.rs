#![allow(async_fn_in_trait)]

use uuid::Uuid;

use campus_domain::course::CourseKey;

use crate::domain::types::{
    Course, CourseEmail, CourseMember, EmailMessage, InstructorTask, SendError, TaskProgress,
    TaskState,
};
use crate::error::BulkEmailError;

/// Read access to courses and their rosters.
pub trait CourseRepository: Send + Sync {
    async fn find_course(&self, course_id: &CourseKey) -> Result<Option<Course>, BulkEmailError>;

    /// Roster in enrollment order.
    async fn list_members(&self, course_id: &CourseKey)
    -> Result<Vec<CourseMember>, BulkEmailError>;

    async fn find_member(
        &self,
        course_id: &CourseKey,
        user_id: Uuid,
    ) -> Result<Option<CourseMember>, BulkEmailError>;
}

/// Persistence for composed course emails.
pub trait EmailRepository: Send + Sync {
    /// Store the email and its QUEUED task in one transaction.
    async fn create_email_with_task(
        &self,
        email: &CourseEmail,
        task: &InstructorTask,
    ) -> Result<(), BulkEmailError>;

    async fn find_email(&self, id: Uuid) -> Result<Option<CourseEmail>, BulkEmailError>;
}

/// Persistence for instructor tasks.
pub trait TaskRepository: Send + Sync {
    async fn find_task(&self, id: Uuid) -> Result<Option<InstructorTask>, BulkEmailError>;

    async fn find_by_task_id(
        &self,
        course_id: &CourseKey,
        task_id: &str,
    ) -> Result<Option<InstructorTask>, BulkEmailError>;

    /// Move the oldest QUEUED task to PROGRESS and return it. `None` when the queue is
    /// empty or another worker claimed the candidate first.
    async fn claim_next_queued(&self) -> Result<Option<InstructorTask>, BulkEmailError>;

    async fn update_progress(
        &self,
        id: Uuid,
        state: TaskState,
        progress: &TaskProgress,
    ) -> Result<(), BulkEmailError>;
}

/// Outbound transactional mail.
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), SendError>;
}
