//! Do-not-disturb window math.

use chrono::{DateTime, Duration, LocalResult, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use notifyd_db::entities::dnd_window;
use tracing::warn;

/// A user's quiet-hours window, resolved to a concrete timezone.
///
/// Membership is tested against the half-open range `[start, end)` in local
/// wall-clock time. A window with `end < start` spans midnight: a moment at
/// or after `start` is on the evening side, a moment before `end` is on the
/// morning side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietHours {
    start: NaiveTime,
    end: NaiveTime,
    tz: Tz,
}

impl QuietHours {
    /// Build a window from its parts.
    #[must_use]
    pub const fn new(start: NaiveTime, end: NaiveTime, tz: Tz) -> Self {
        Self { start, end, tz }
    }

    /// Build a window from a stored row.
    ///
    /// An unparseable timezone falls back to UTC; write-time validation makes
    /// this a legacy-data path only.
    #[must_use]
    pub fn from_model(model: &dnd_window::Model) -> Self {
        let tz = model.timezone.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                user_id = model.user_id,
                timezone = %model.timezone,
                "Unknown DND timezone, falling back to UTC"
            );
            Tz::UTC
        });
        Self::new(model.start_time, model.end_time, tz)
    }

    /// Whether `now` falls inside the window.
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        let t = now.with_timezone(&self.tz).time();

        if self.end < self.start {
            // Window spans midnight.
            t >= self.start || t < self.end
        } else {
            t >= self.start && t < self.end
        }
    }

    /// The next wall-clock occurrence of the window's end, as an instant.
    ///
    /// For a moment before today's `end` this is today's `end`; otherwise it
    /// rolls over to tomorrow.
    #[must_use]
    pub fn next_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.tz);
        let date = if local.time() < self.end {
            local.date_naive()
        } else {
            local.date_naive() + Duration::days(1)
        };

        resolve_local(self.tz, date.and_time(self.end)).with_timezone(&Utc)
    }
}

/// Resolve a local wall-clock time to an instant.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant; times in a
/// DST gap (spring-forward) resolve to the first valid instant after it.
fn resolve_local(tz: Tz, naive: chrono::NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            // Spring-forward gaps are at most an hour in the IANA database.
            match tz.from_local_datetime(&(naive + Duration::hours(1))) {
                LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
                LocalResult::None => tz.from_utc_datetime(&naive),
            }
        }
    }
}
