//! Create `notification` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notification::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notification::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Notification::IdempotencyKey)
                            .string_len(255)
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Notification::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notification::CampaignId).big_integer())
                    .col(
                        ColumnDef::new(Notification::TypeKey)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notification::Channel)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notification::Payload).binary().not_null())
                    .col(
                        ColumnDef::new(Notification::Priority)
                            .string_len(8)
                            .not_null()
                            .default("low"),
                    )
                    .col(ColumnDef::new(Notification::ScheduledAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Notification::Status)
                            .string_len(16)
                            .not_null()
                            .default("enqueued"),
                    )
                    .col(
                        ColumnDef::new(Notification::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite index for the scheduler's due query
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_status_scheduled_at")
                    .table(Notification::Table)
                    .col(Notification::Status)
                    .col(Notification::ScheduledAt)
                    .to_owned(),
            )
            .await?;

        // Index for per-user history queries
        manager
            .create_index(
                Index::create()
                    .name("idx_notification_user_created_at")
                    .table(Notification::Table)
                    .col(Notification::UserId)
                    .col(Notification::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notification::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Notification {
    Table,
    Id,
    IdempotencyKey,
    UserId,
    CampaignId,
    TypeKey,
    Channel,
    Payload,
    Priority,
    ScheduledAt,
    Status,
    CreatedAt,
}
