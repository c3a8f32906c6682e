//! Create `delivery_attempt` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DeliveryAttempt::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeliveryAttempt::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeliveryAttempt::NotificationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeliveryAttempt::AttemptNo)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DeliveryAttempt::ProviderMessageId).string_len(255))
                    .col(
                        ColumnDef::new(DeliveryAttempt::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(DeliveryAttempt::ErrorCode).string_len(64))
                    .col(ColumnDef::new(DeliveryAttempt::ErrorMessage).text())
                    .col(
                        ColumnDef::new(DeliveryAttempt::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_delivery_attempt_notification")
                            .from(DeliveryAttempt::Table, DeliveryAttempt::NotificationId)
                            .to(Notification::Table, Notification::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for attempt-history lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_delivery_attempt_notification_id")
                    .table(DeliveryAttempt::Table)
                    .col(DeliveryAttempt::NotificationId)
                    .to_owned(),
            )
            .await?;

        // Attempt numbers are never reused per notification
        manager
            .create_index(
                Index::create()
                    .name("uq_delivery_attempt_notification_no")
                    .table(DeliveryAttempt::Table)
                    .col(DeliveryAttempt::NotificationId)
                    .col(DeliveryAttempt::AttemptNo)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index for the external retry driver's failed-attempt scan
        manager
            .create_index(
                Index::create()
                    .name("idx_delivery_attempt_status_created_at")
                    .table(DeliveryAttempt::Table)
                    .col(DeliveryAttempt::Status)
                    .col(DeliveryAttempt::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeliveryAttempt::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DeliveryAttempt {
    Table,
    Id,
    NotificationId,
    AttemptNo,
    ProviderMessageId,
    Status,
    ErrorCode,
    ErrorMessage,
    CreatedAt,
}

#[derive(Iden)]
enum Notification {
    Table,
    Id,
}
