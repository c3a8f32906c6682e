//! Delivery attempt entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery attempt status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    /// Written before the delivery side effect runs; updated with the outcome.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// The channel transport confirmed delivery.
    #[sea_orm(string_value = "success")]
    Success,
    /// The channel transport reported failure.
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// One delivery attempt for a notification.
///
/// `attempt_no` is 1-based and strictly increasing per notification; numbers
/// are never reused.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "delivery_attempt")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Owning notification.
    #[sea_orm(indexed)]
    pub notification_id: i64,

    /// 1-based attempt number.
    pub attempt_no: i32,

    /// Message id reported by the provider, when delivery succeeded.
    #[sea_orm(nullable)]
    pub provider_message_id: Option<String>,

    /// Attempt outcome.
    pub status: AttemptStatus,

    /// Machine-readable failure code, when failed.
    #[sea_orm(nullable)]
    pub error_code: Option<String>,

    /// Human-readable failure message, when failed.
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::notification::Entity",
        from = "Column::NotificationId",
        to = "super::notification::Column::Id",
        on_delete = "Cascade"
    )]
    Notification,
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notification.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
