//! Application state.

use notifyd_core::{DispatchService, InAppService, NotificationService, PreferenceService};

/// Application state shared by all endpoints.
#[derive(Clone)]
pub struct AppState {
    /// Dispatch decision engine.
    pub dispatch_service: DispatchService,
    /// Notification read side.
    pub notification_service: NotificationService,
    /// Channel preferences and DND windows.
    pub preference_service: PreferenceService,
    /// In-app inbox.
    pub inapp_service: InAppService,
}
