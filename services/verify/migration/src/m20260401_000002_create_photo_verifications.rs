use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PhotoVerifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PhotoVerifications::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PhotoVerifications::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(PhotoVerifications::Status)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PhotoVerifications::StatusChangedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PhotoVerifications::Name)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(PhotoVerifications::FaceImageUrl)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(PhotoVerifications::PhotoIdImageUrl)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(PhotoVerifications::PhotoIdKey)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(PhotoVerifications::ReceiptId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PhotoVerifications::ErrorMsg)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(PhotoVerifications::ErrorCode)
                            .string_len(50)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(PhotoVerifications::ReviewingService)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(PhotoVerifications::SubmittedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(PhotoVerifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PhotoVerifications::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // active_for_user: newest ready attempt per user.
        manager
            .create_index(
                Index::create()
                    .table(PhotoVerifications::Table)
                    .col(PhotoVerifications::UserId)
                    .col(PhotoVerifications::Status)
                    .col(PhotoVerifications::CreatedAt)
                    .name("idx_photo_verifications_user_status_created")
                    .to_owned(),
            )
            .await?;

        // Retry job scans must_retry attempts.
        manager
            .create_index(
                Index::create()
                    .table(PhotoVerifications::Table)
                    .col(PhotoVerifications::Status)
                    .name("idx_photo_verifications_status")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PhotoVerifications::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PhotoVerifications {
    Table,
    Id,
    UserId,
    Status,
    StatusChangedAt,
    Name,
    FaceImageUrl,
    PhotoIdImageUrl,
    PhotoIdKey,
    ReceiptId,
    ErrorMsg,
    ErrorCode,
    ReviewingService,
    SubmittedAt,
    CreatedAt,
    UpdatedAt,
}
