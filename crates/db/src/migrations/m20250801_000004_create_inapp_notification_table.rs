//! Create `inapp_notification` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InAppNotification::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InAppNotification::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InAppNotification::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InAppNotification::TypeKey)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InAppNotification::Title).string_len(255))
                    .col(ColumnDef::new(InAppNotification::Body).text().not_null())
                    .col(ColumnDef::new(InAppNotification::Metadata).json_binary())
                    .col(
                        ColumnDef::new(InAppNotification::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(InAppNotification::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for inbox listing
        manager
            .create_index(
                Index::create()
                    .name("idx_inapp_notification_user_created_at")
                    .table(InAppNotification::Table)
                    .col(InAppNotification::UserId)
                    .col(InAppNotification::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index for unread filtering
        manager
            .create_index(
                Index::create()
                    .name("idx_inapp_notification_user_is_read")
                    .table(InAppNotification::Table)
                    .col(InAppNotification::UserId)
                    .col(InAppNotification::IsRead)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InAppNotification::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum InAppNotification {
    Table,
    Id,
    UserId,
    TypeKey,
    Title,
    Body,
    Metadata,
    IsRead,
    CreatedAt,
}
