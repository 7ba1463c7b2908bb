use campus_domain::course::CourseKey;

use crate::domain::repository::TaskRepository;
use crate::domain::types::InstructorTask;
use crate::error::BulkEmailError;

pub struct GetEmailTaskUseCase<T: TaskRepository> {
    pub tasks: T,
}

impl<T: TaskRepository> GetEmailTaskUseCase<T> {
    pub async fn execute(
        &self,
        course_id: &CourseKey,
        task_id: &str,
    ) -> Result<InstructorTask, BulkEmailError> {
        self.tasks
            .find_by_task_id(course_id, task_id)
            .await?
            .ok_or(BulkEmailError::TaskNotFound)
    }
}
