//! Business logic services.

pub mod delivery;
pub mod dispatch;
pub mod dnd;
pub mod inapp;
pub mod notification;
pub mod preference;
pub mod publisher;

pub use delivery::{ChannelTransport, DeliveryOutcome, DeliveryService, TransportService};
pub use dispatch::{DispatchService, EnqueueInput};
pub use dnd::QuietHours;
pub use inapp::InAppService;
pub use notification::NotificationService;
pub use preference::{PreferenceService, UpsertDndInput, UpsertPreferenceInput};
pub use publisher::{NoOpPublisher, PublisherService, ReadyQueuePublisher};
