//! Database repositories.

pub mod delivery_attempt;
pub mod inapp;
pub mod notification;
pub mod preference;

pub use delivery_attempt::DeliveryAttemptRepository;
pub use inapp::InAppRepository;
pub use notification::NotificationRepository;
pub use preference::PreferenceRepository;
