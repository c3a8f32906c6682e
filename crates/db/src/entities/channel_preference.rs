//! Channel preference entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::notification::Channel;

/// A user's opt-in state for one (type key, channel) pair.
///
/// The triple (user, type key, channel) is unique. A missing row means opted
/// in; rows exist only where a preference was explicitly set.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "channel_preference")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(indexed)]
    pub user_id: i64,

    /// Notification type key the preference applies to.
    pub type_key: String,

    /// Channel the preference applies to.
    pub channel: Channel,

    /// Whether the user accepts this (type, channel) combination.
    pub opted_in: bool,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
