use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use campus_core::identity::{IdentityHeaders, ROLE_STAFF};
use campus_domain::course::CourseKey;

use crate::domain::types::{InstructorTask, SendTo, TaskProgress, TaskState};
use crate::error::BulkEmailError;
use crate::state::AppState;
use crate::usecase::create_email::{CreateCourseEmailUseCase, NewCourseEmail};
use crate::usecase::get_task::GetEmailTaskUseCase;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct EmailTaskResponse {
    pub task_id: String,
    pub task_type: String,
    pub course_id: CourseKey,
    pub task_state: TaskState,
    pub progress: Option<TaskProgress>,
    #[serde(serialize_with = "campus_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "campus_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<InstructorTask> for EmailTaskResponse {
    fn from(task: InstructorTask) -> Self {
        Self {
            progress: task
                .task_output
                .and_then(|output| serde_json::from_value(output).ok()),
            task_id: task.task_id,
            task_type: task.task_type,
            course_id: task.course_id,
            task_state: task.task_state,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct CreateEmailResponse {
    pub email_id: Uuid,
    pub task: EmailTaskResponse,
}

// ── POST /courses/{org}/{course}/{run}/emails ────────────────────────────────

#[derive(Deserialize)]
pub struct CreateEmailRequest {
    pub to: SendTo,
    pub subject: String,
    pub message: String,
}

pub async fn create_email(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((org, course, run)): Path<(String, String, String)>,
    Json(body): Json<CreateEmailRequest>,
) -> Result<(StatusCode, Json<CreateEmailResponse>), BulkEmailError> {
    identity.require_role(ROLE_STAFF)?;
    let course_id = CourseKey::new(&org, &course, &run)?;

    let usecase = CreateCourseEmailUseCase {
        courses: state.course_repo(),
        emails: state.email_repo(),
    };
    let (email, task) = usecase
        .execute(
            identity.user_id,
            course_id,
            NewCourseEmail {
                to_option: body.to,
                subject: body.subject,
                html_message: body.message,
            },
        )
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(CreateEmailResponse {
            email_id: email.id,
            task: task.into(),
        }),
    ))
}

// ── GET /courses/{org}/{course}/{run}/email-tasks/{task_id} ──────────────────

pub async fn get_email_task(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path((org, course, run, task_id)): Path<(String, String, String, String)>,
) -> Result<Json<EmailTaskResponse>, BulkEmailError> {
    identity.require_role(ROLE_STAFF)?;
    let course_id = CourseKey::new(&org, &course, &run)?;

    let usecase = GetEmailTaskUseCase {
        tasks: state.task_repo(),
    };
    let task = usecase.execute(&course_id, &task_id).await?;
    Ok(Json(task.into()))
}
