//! Create `channel_preference` and `dnd_window` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChannelPreference::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChannelPreference::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ChannelPreference::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChannelPreference::TypeKey)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChannelPreference::Channel)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChannelPreference::OptedIn)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ChannelPreference::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // One preference row per (user, type, channel)
        manager
            .create_index(
                Index::create()
                    .name("uq_channel_preference_user_type_channel")
                    .table(ChannelPreference::Table)
                    .col(ChannelPreference::UserId)
                    .col(ChannelPreference::TypeKey)
                    .col(ChannelPreference::Channel)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DndWindow::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DndWindow::UserId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DndWindow::StartTime).time().not_null())
                    .col(ColumnDef::new(DndWindow::EndTime).time().not_null())
                    .col(
                        ColumnDef::new(DndWindow::Timezone)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DndWindow::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DndWindow::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChannelPreference::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ChannelPreference {
    Table,
    Id,
    UserId,
    TypeKey,
    Channel,
    OptedIn,
    UpdatedAt,
}

#[derive(Iden)]
enum DndWindow {
    Table,
    UserId,
    StartTime,
    EndTime,
    Timezone,
    UpdatedAt,
}
