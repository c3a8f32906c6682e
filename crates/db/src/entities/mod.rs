//! Database entities.

pub mod channel_preference;
pub mod delivery_attempt;
pub mod dnd_window;
pub mod inapp_notification;
pub mod notification;

pub use channel_preference::Entity as ChannelPreference;
pub use delivery_attempt::Entity as DeliveryAttempt;
pub use dnd_window::Entity as DndWindow;
pub use inapp_notification::Entity as InAppNotification;
pub use notification::Entity as Notification;
