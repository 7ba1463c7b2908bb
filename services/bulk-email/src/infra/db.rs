use anyhow::{Context as _, anyhow};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use uuid::Uuid;

use campus_bulk_email_schema::{course_emails, course_members, courses, instructor_tasks};
use campus_domain::course::CourseKey;

use crate::domain::repository::{CourseRepository, EmailRepository, TaskRepository};
use crate::domain::types::{
    Course, CourseEmail, CourseMember, InstructorTask, TaskProgress, TaskState,
};
use crate::error::BulkEmailError;

// ── Course repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCourseRepository {
    pub db: DatabaseConnection,
}

impl CourseRepository for DbCourseRepository {
    async fn find_course(&self, course_id: &CourseKey) -> Result<Option<Course>, BulkEmailError> {
        let model = courses::Entity::find_by_id(course_id.to_string())
            .one(&self.db)
            .await
            .context("find course")?;
        Ok(model.map(|m| Course {
            course_id: course_id.clone(),
            display_name: m.display_name,
        }))
    }

    async fn list_members(
        &self,
        course_id: &CourseKey,
    ) -> Result<Vec<CourseMember>, BulkEmailError> {
        let models = course_members::Entity::find()
            .filter(course_members::Column::CourseId.eq(course_id.to_string()))
            .order_by_asc(course_members::Column::CreatedAt)
            .order_by_asc(course_members::Column::Id)
            .all(&self.db)
            .await
            .context("list course members")?;
        models.into_iter().map(member_from_model).collect()
    }

    async fn find_member(
        &self,
        course_id: &CourseKey,
        user_id: Uuid,
    ) -> Result<Option<CourseMember>, BulkEmailError> {
        let model = course_members::Entity::find()
            .filter(course_members::Column::CourseId.eq(course_id.to_string()))
            .filter(course_members::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find course member")?;
        model.map(member_from_model).transpose()
    }
}

fn member_from_model(m: course_members::Model) -> Result<CourseMember, BulkEmailError> {
    Ok(CourseMember {
        user_id: m.user_id,
        role: m.role.parse().map_err(|e: String| anyhow!(e))?,
        email: m.email,
        name: m.name,
        email_opt_out: m.email_opt_out,
    })
}

// ── Email repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEmailRepository {
    pub db: DatabaseConnection,
}

impl EmailRepository for DbEmailRepository {
    async fn create_email_with_task(
        &self,
        email: &CourseEmail,
        task: &InstructorTask,
    ) -> Result<(), BulkEmailError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let email = email.clone();
                let task = task.clone();
                Box::pin(async move {
                    insert_email(txn, &email).await?;
                    insert_task(txn, &task).await?;
                    Ok(())
                })
            })
            .await
            .context("create course email with task")?;
        Ok(())
    }

    async fn find_email(&self, id: Uuid) -> Result<Option<CourseEmail>, BulkEmailError> {
        let model = course_emails::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find course email")?;
        model.map(email_from_model).transpose()
    }
}

async fn insert_email(txn: &DatabaseTransaction, email: &CourseEmail) -> Result<(), sea_orm::DbErr> {
    course_emails::ActiveModel {
        id: Set(email.id),
        course_id: Set(email.course_id.to_string()),
        sender_id: Set(email.sender_id),
        to_option: Set(email.to_option.as_str().to_owned()),
        subject: Set(email.subject.clone()),
        html_message: Set(email.html_message.clone()),
        created_at: Set(email.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_task(txn: &DatabaseTransaction, task: &InstructorTask) -> Result<(), sea_orm::DbErr> {
    instructor_tasks::ActiveModel {
        id: Set(task.id),
        task_type: Set(task.task_type.clone()),
        course_id: Set(task.course_id.to_string()),
        task_key: Set(task.task_key.clone()),
        task_id: Set(task.task_id.clone()),
        task_input: Set(task.task_input.clone()),
        task_state: Set(task.task_state.as_str().to_owned()),
        task_output: Set(task.task_output.clone()),
        requester_id: Set(task.requester_id),
        created_at: Set(task.created_at),
        updated_at: Set(task.updated_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn email_from_model(m: course_emails::Model) -> Result<CourseEmail, BulkEmailError> {
    Ok(CourseEmail {
        id: m.id,
        course_id: m.course_id.parse().context("stored course id")?,
        sender_id: m.sender_id,
        to_option: m.to_option.parse().map_err(|e: String| anyhow!(e))?,
        subject: m.subject,
        html_message: m.html_message,
        created_at: m.created_at,
    })
}

// ── Task repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTaskRepository {
    pub db: DatabaseConnection,
}

impl TaskRepository for DbTaskRepository {
    async fn find_task(&self, id: Uuid) -> Result<Option<InstructorTask>, BulkEmailError> {
        let model = instructor_tasks::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find instructor task")?;
        model.map(task_from_model).transpose()
    }

    async fn find_by_task_id(
        &self,
        course_id: &CourseKey,
        task_id: &str,
    ) -> Result<Option<InstructorTask>, BulkEmailError> {
        let model = instructor_tasks::Entity::find()
            .filter(instructor_tasks::Column::CourseId.eq(course_id.to_string()))
            .filter(instructor_tasks::Column::TaskId.eq(task_id))
            .one(&self.db)
            .await
            .context("find instructor task by task id")?;
        model.map(task_from_model).transpose()
    }

    async fn claim_next_queued(&self) -> Result<Option<InstructorTask>, BulkEmailError> {
        let Some(candidate) = instructor_tasks::Entity::find()
            .filter(instructor_tasks::Column::TaskState.eq(TaskState::Queued.as_str()))
            .order_by_asc(instructor_tasks::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find queued instructor task")?
        else {
            return Ok(None);
        };

        let now = Utc::now();
        let result = instructor_tasks::Entity::update_many()
            .col_expr(
                instructor_tasks::Column::TaskState,
                Expr::value(TaskState::Progress.as_str()),
            )
            .col_expr(instructor_tasks::Column::UpdatedAt, Expr::value(now))
            .filter(instructor_tasks::Column::Id.eq(candidate.id))
            .filter(instructor_tasks::Column::TaskState.eq(TaskState::Queued.as_str()))
            .exec(&self.db)
            .await
            .context("claim instructor task")?;
        if result.rows_affected == 0 {
            return Ok(None);
        }

        let mut task = task_from_model(candidate)?;
        task.task_state = TaskState::Progress;
        task.updated_at = now;
        Ok(Some(task))
    }

    async fn update_progress(
        &self,
        id: Uuid,
        state: TaskState,
        progress: &TaskProgress,
    ) -> Result<(), BulkEmailError> {
        let output = serde_json::to_value(progress).context("serialize task progress")?;
        instructor_tasks::ActiveModel {
            id: Set(id),
            task_state: Set(state.as_str().to_owned()),
            task_output: Set(Some(output)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update instructor task progress")?;
        Ok(())
    }
}

fn task_from_model(m: instructor_tasks::Model) -> Result<InstructorTask, BulkEmailError> {
    Ok(InstructorTask {
        id: m.id,
        task_type: m.task_type,
        course_id: m.course_id.parse().context("stored course id")?,
        task_key: m.task_key,
        task_id: m.task_id,
        task_input: m.task_input,
        task_state: m.task_state.parse().map_err(|e: String| anyhow!(e))?,
        task_output: m.task_output,
        requester_id: m.requester_id,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}
