//! Ready-queue routing.
//!
//! Maps a (channel, priority) pair to the fixed broker queue a channel worker
//! consumes. The mapping is total: unknown channel keys fall back to the
//! in-app/low queue.

use notifyd_db::entities::notification::{Channel, Priority};

/// Ready queue names.
pub mod queues {
    /// High-priority email deliveries.
    pub const READY_EMAIL_HIGH: &str = "notifications.ready.email.high";
    /// Low-priority email deliveries.
    pub const READY_EMAIL_LOW: &str = "notifications.ready.email.low";
    /// High-priority SMS deliveries.
    pub const READY_SMS_HIGH: &str = "notifications.ready.sms.high";
    /// Low-priority SMS deliveries.
    pub const READY_SMS_LOW: &str = "notifications.ready.sms.low";
    /// High-priority push deliveries.
    pub const READY_PUSH_HIGH: &str = "notifications.ready.push.high";
    /// Low-priority push deliveries.
    pub const READY_PUSH_LOW: &str = "notifications.ready.push.low";
    /// High-priority in-app deliveries.
    pub const READY_INAPP_HIGH: &str = "notifications.ready.inapp.high";
    /// Low-priority in-app deliveries.
    pub const READY_INAPP_LOW: &str = "notifications.ready.inapp.low";
}

/// Resolve the ready queue for a typed (channel, priority) pair.
#[must_use]
pub const fn resolve_ready_queue(channel: &Channel, priority: &Priority) -> &'static str {
    match (channel, priority) {
        (Channel::Email, Priority::High) => queues::READY_EMAIL_HIGH,
        (Channel::Email, Priority::Low) => queues::READY_EMAIL_LOW,
        (Channel::Sms, Priority::High) => queues::READY_SMS_HIGH,
        (Channel::Sms, Priority::Low) => queues::READY_SMS_LOW,
        (Channel::Push, Priority::High) => queues::READY_PUSH_HIGH,
        (Channel::Push, Priority::Low) => queues::READY_PUSH_LOW,
        (Channel::InApp, Priority::High) => queues::READY_INAPP_HIGH,
        (Channel::InApp, Priority::Low) => queues::READY_INAPP_LOW,
    }
}

/// Resolve the ready queue for raw string keys.
///
/// Unknown channel keys map to the in-app/low queue; an unknown priority is
/// treated as low.
#[must_use]
pub fn resolve_ready_queue_keys(channel: &str, priority: &str) -> &'static str {
    let priority = Priority::from_key(priority).unwrap_or(Priority::Low);
    match Channel::from_key(channel) {
        Some(channel) => resolve_ready_queue(&channel, &priority),
        None => queues::READY_INAPP_LOW,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_pair_maps_to_a_distinct_queue() {
        let channels = [Channel::Email, Channel::Sms, Channel::Push, Channel::InApp];
        let priorities = [Priority::High, Priority::Low];

        let mut seen = std::collections::HashSet::new();
        for channel in &channels {
            for priority in &priorities {
                let queue = resolve_ready_queue(channel, priority);
                assert!(queue.starts_with("notifications.ready."));
                assert!(seen.insert(queue), "duplicate queue {queue}");
            }
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_queue_name_convention() {
        assert_eq!(
            resolve_ready_queue(&Channel::Email, &Priority::High),
            "notifications.ready.email.high"
        );
        assert_eq!(
            resolve_ready_queue(&Channel::Sms, &Priority::Low),
            "notifications.ready.sms.low"
        );
        assert_eq!(
            resolve_ready_queue(&Channel::InApp, &Priority::Low),
            "notifications.ready.inapp.low"
        );
    }

    #[test]
    fn test_unknown_channel_falls_back_to_inapp_low() {
        assert_eq!(
            resolve_ready_queue_keys("carrier-pigeon", "high"),
            queues::READY_INAPP_LOW
        );
        assert_eq!(resolve_ready_queue_keys("", ""), queues::READY_INAPP_LOW);
    }

    #[test]
    fn test_string_keys_match_typed_resolution() {
        assert_eq!(
            resolve_ready_queue_keys("push", "high"),
            resolve_ready_queue(&Channel::Push, &Priority::High)
        );
    }
}
