//! Channel preference and DND window management.

use chrono_tz::Tz;
use notifyd_common::{AppError, AppResult};
use notifyd_db::entities::notification::Channel;
use notifyd_db::entities::{channel_preference, dnd_window};
use notifyd_db::repositories::PreferenceRepository;
use serde::Deserialize;
use validator::Validate;

/// Input for upserting a channel preference.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertPreferenceInput {
    /// User the preference belongs to.
    pub user_id: i64,
    /// Notification type key the preference applies to.
    #[validate(length(min = 1, max = 128))]
    pub type_key: String,
    /// Channel key (`email`, `sms`, `push`, `inapp`).
    pub channel: String,
    /// Whether the user accepts this (type, channel) combination.
    pub opted_in: bool,
}

/// Input for upserting a DND window.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertDndInput {
    /// User the window belongs to.
    pub user_id: i64,
    /// Start of the window, `HH:MM:SS` local time.
    pub start_time: String,
    /// End of the window, `HH:MM:SS` local time; `end < start` spans midnight.
    pub end_time: String,
    /// IANA timezone name, e.g. `Europe/Berlin`.
    #[validate(length(min = 1, max = 64))]
    pub timezone: String,
}

/// Service for channel preferences and DND windows.
#[derive(Clone)]
pub struct PreferenceService {
    preference_repo: PreferenceRepository,
}

impl PreferenceService {
    /// Create a new preference service.
    #[must_use]
    pub const fn new(preference_repo: PreferenceRepository) -> Self {
        Self { preference_repo }
    }

    /// Upsert an opt-in preference.
    pub async fn upsert_preference(
        &self,
        input: UpsertPreferenceInput,
    ) -> AppResult<channel_preference::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if input.user_id <= 0 {
            return Err(AppError::Validation("user_id must be positive".to_string()));
        }
        let channel = Channel::from_key(&input.channel)
            .ok_or_else(|| AppError::Validation(format!("Unknown channel: {}", input.channel)))?;

        self.preference_repo
            .upsert_preference(input.user_id, &input.type_key, channel, input.opted_in)
            .await
    }

    /// All explicitly set preferences for a user.
    pub async fn list_preferences(
        &self,
        user_id: i64,
    ) -> AppResult<Vec<channel_preference::Model>> {
        self.preference_repo.list_for_user(user_id).await
    }

    /// Upsert a user's DND window.
    ///
    /// Times must parse as `HH:MM:SS` and the timezone must exist in the IANA
    /// database; legacy rows with unknown timezones fall back to UTC at read
    /// time, but new writes are rejected.
    pub async fn upsert_dnd(&self, input: UpsertDndInput) -> AppResult<dnd_window::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if input.user_id <= 0 {
            return Err(AppError::Validation("user_id must be positive".to_string()));
        }

        let start = parse_time_of_day(&input.start_time, "start_time")?;
        let end = parse_time_of_day(&input.end_time, "end_time")?;
        if start == end {
            return Err(AppError::Validation(
                "start_time and end_time must differ".to_string(),
            ));
        }
        if input.timezone.parse::<Tz>().is_err() {
            return Err(AppError::Validation(format!(
                "Unknown timezone: {}",
                input.timezone
            )));
        }

        self.preference_repo
            .upsert_dnd(input.user_id, start, end, &input.timezone)
            .await
    }

    /// Fetch a user's DND window, erroring when absent.
    pub async fn get_dnd(&self, user_id: i64) -> AppResult<dnd_window::Model> {
        self.preference_repo
            .find_dnd(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("DND window for user {user_id} not found")))
    }

    /// Remove a user's DND window.
    pub async fn delete_dnd(&self, user_id: i64) -> AppResult<()> {
        self.preference_repo.delete_dnd(user_id).await
    }
}

fn parse_time_of_day(value: &str, field: &str) -> AppResult<chrono::NaiveTime> {
    chrono::NaiveTime::parse_from_str(value, "%H:%M:%S")
        .map_err(|_| AppError::Validation(format!("{field} must be HH:MM:SS, got {value}")))
}
