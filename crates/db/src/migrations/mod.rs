//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250801_000001_create_notification_table;
mod m20250801_000002_create_delivery_attempt_table;
mod m20250801_000003_create_preference_tables;
mod m20250801_000004_create_inapp_notification_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_create_notification_table::Migration),
            Box::new(m20250801_000002_create_delivery_attempt_table::Migration),
            Box::new(m20250801_000003_create_preference_tables::Migration),
            Box::new(m20250801_000004_create_inapp_notification_table::Migration),
        ]
    }
}
