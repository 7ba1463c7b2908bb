use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InstructorTasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InstructorTasks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InstructorTasks::TaskType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InstructorTasks::CourseId).string().not_null())
                    .col(ColumnDef::new(InstructorTasks::TaskKey).string().not_null())
                    .col(
                        ColumnDef::new(InstructorTasks::TaskId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(InstructorTasks::TaskInput).json_binary().not_null())
                    .col(
                        ColumnDef::new(InstructorTasks::TaskState)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InstructorTasks::TaskOutput).json_binary())
                    .col(ColumnDef::new(InstructorTasks::RequesterId).uuid().not_null())
                    .col(
                        ColumnDef::new(InstructorTasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InstructorTasks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Worker claims the oldest QUEUED task.
        manager
            .create_index(
                Index::create()
                    .table(InstructorTasks::Table)
                    .col(InstructorTasks::TaskState)
                    .col(InstructorTasks::CreatedAt)
                    .name("idx_instructor_tasks_state_created")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InstructorTasks::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InstructorTasks {
    Table,
    Id,
    TaskType,
    CourseId,
    TaskKey,
    TaskId,
    TaskInput,
    TaskState,
    TaskOutput,
    RequesterId,
    CreatedAt,
    UpdatedAt,
}
