//! In-app inbox entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An in-app inbox row, written by the in-app channel transport.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inapp_notification")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Recipient user.
    #[sea_orm(indexed)]
    pub user_id: i64,

    /// Type key of the notification that produced this row.
    pub type_key: String,

    /// Display title, when the payload carried one.
    #[sea_orm(nullable)]
    pub title: Option<String>,

    /// Display body.
    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// Remaining payload fields, kept for the client.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub metadata: Option<Json>,

    /// Has the user read this row?
    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
