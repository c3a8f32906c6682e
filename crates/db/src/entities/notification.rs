//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Delivery channel of a notification.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "sms")]
    Sms,
    #[sea_orm(string_value = "push")]
    Push,
    #[sea_orm(string_value = "inapp")]
    InApp,
}

impl Channel {
    /// Stable string key, identical to the stored value and the queue-name segment.
    #[must_use]
    pub const fn as_key(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Push => "push",
            Self::InApp => "inapp",
        }
    }

    /// Parse a channel key. Returns `None` for unknown keys.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "email" => Some(Self::Email),
            "sms" => Some(Self::Sms),
            "push" => Some(Self::Push),
            "inapp" => Some(Self::InApp),
            _ => None,
        }
    }
}

/// Priority tier of a notification. Selects which ready queue a channel uses.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "low")]
    Low,
}

impl Priority {
    /// Stable string key, identical to the stored value and the queue-name segment.
    #[must_use]
    pub const fn as_key(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }

    /// Parse a priority key. Returns `None` for unknown keys.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "high" => Some(Self::High),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Notification lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    /// Deferred; flipped to enqueued by the scheduler when due.
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    /// Published (or about to be published) to a ready queue.
    #[sea_orm(string_value = "enqueued")]
    Enqueued,
    /// Delivery succeeded.
    #[sea_orm(string_value = "sent")]
    Sent,
    /// Delivery failed; retries are driven externally.
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// A single per-channel notification row.
///
/// One row is created per requested channel. `user_id` refers to the external
/// identity system; there is no local user table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Caller-supplied deduplication token, unique when present.
    #[sea_orm(unique, nullable)]
    pub idempotency_key: Option<String>,

    /// Recipient user.
    #[sea_orm(indexed)]
    pub user_id: i64,

    /// Originating campaign, if any.
    #[sea_orm(nullable)]
    pub campaign_id: Option<i64>,

    /// Notification type key, e.g. `order.shipped` or `auth.otp`.
    pub type_key: String,

    /// Delivery channel.
    pub channel: Channel,

    /// Opaque payload bytes; never interpreted by the dispatch pipeline.
    pub payload: Vec<u8>,

    /// Priority tier.
    pub priority: Priority,

    /// When to deliver; `None` means immediately.
    #[sea_orm(nullable)]
    pub scheduled_at: Option<DateTimeWithTimeZone>,

    /// Current lifecycle status.
    pub status: NotificationStatus,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::delivery_attempt::Entity")]
    DeliveryAttempt,
}

impl Related<super::delivery_attempt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeliveryAttempt.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
