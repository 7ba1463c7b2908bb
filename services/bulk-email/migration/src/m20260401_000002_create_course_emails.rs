use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CourseEmails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseEmails::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CourseEmails::CourseId).string().not_null())
                    .col(ColumnDef::new(CourseEmails::SenderId).uuid().not_null())
                    .col(
                        ColumnDef::new(CourseEmails::ToOption)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CourseEmails::Subject).string().not_null())
                    .col(ColumnDef::new(CourseEmails::HtmlMessage).text().not_null())
                    .col(
                        ColumnDef::new(CourseEmails::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CourseEmails::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CourseEmails {
    Table,
    Id,
    CourseId,
    SenderId,
    ToOption,
    Subject,
    HtmlMessage,
    CreatedAt,
}
