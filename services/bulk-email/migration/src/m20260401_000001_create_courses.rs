use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::CourseId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(Courses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CourseMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseMembers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CourseMembers::CourseId).string().not_null())
                    .col(ColumnDef::new(CourseMembers::UserId).uuid().not_null())
                    .col(ColumnDef::new(CourseMembers::Email).string().not_null())
                    .col(
                        ColumnDef::new(CourseMembers::Name)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(CourseMembers::Role)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseMembers::EmailOptOut)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CourseMembers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CourseMembers::Table, CourseMembers::CourseId)
                            .to(Courses::Table, Courses::CourseId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(CourseMembers::Table)
                    .col(CourseMembers::CourseId)
                    .col(CourseMembers::UserId)
                    .unique()
                    .name("uq_course_members_course_user")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CourseMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Courses {
    Table,
    CourseId,
    DisplayName,
    CreatedAt,
}

#[derive(Iden)]
enum CourseMembers {
    Table,
    Id,
    CourseId,
    UserId,
    Email,
    Name,
    Role,
    EmailOptOut,
    CreatedAt,
}
