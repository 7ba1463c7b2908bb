use sea_orm::entity::prelude::*;

/// Background job requested by course staff.
/// `task_state` is one of QUEUED, PROGRESS, SUCCESS, FAILURE.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "instructor_tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub task_type: String,
    pub course_id: String,
    pub task_key: String,
    #[sea_orm(unique)]
    pub task_id: String,
    pub task_input: Json,
    pub task_state: String,
    pub task_output: Option<Json>,
    pub requester_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
