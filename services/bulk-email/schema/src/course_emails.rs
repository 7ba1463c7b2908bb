use sea_orm::entity::prelude::*;

/// A message composed by course staff. `to_option` is one of myself, staff, all.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "course_emails")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: String,
    pub sender_id: Uuid,
    pub to_option: String,
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub html_message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
