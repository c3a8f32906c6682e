//! Do-not-disturb window entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A user's daily quiet-hours window.
///
/// Times are wall-clock times of day in the stored timezone. A window with
/// `end_time < start_time` spans midnight.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dnd_window")]
pub struct Model {
    /// One window per user.
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,

    /// Start of the window, local time of day.
    pub start_time: Time,

    /// End of the window, local time of day.
    pub end_time: Time,

    /// IANA timezone name, e.g. `Europe/Berlin`.
    pub timezone: String,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
