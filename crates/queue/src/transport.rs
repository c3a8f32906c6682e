//! Channel transports.
//!
//! Real provider integrations (SMTP, SMS gateways, APNs/FCM) are out of
//! scope; email, SMS and push use a logging stub. The in-app channel is the
//! one transport with a real side effect: it persists the inbox row.

use async_trait::async_trait;
use notifyd_common::AppResult;
use notifyd_core::ChannelTransport;
use notifyd_db::entities::notification::{self, Channel};
use notifyd_db::entities::inapp_notification;
use notifyd_db::repositories::InAppRepository;
use sea_orm::Set;
use tracing::info;

/// Stub transport that logs the delivery and reports success.
#[derive(Clone)]
pub struct LogTransport {
    channel: Channel,
}

impl LogTransport {
    /// Create a stub transport for a channel.
    #[must_use]
    pub const fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl ChannelTransport for LogTransport {
    async fn deliver(&self, notification: &notification::Model) -> AppResult<Option<String>> {
        info!(
            notification_id = notification.id,
            user_id = notification.user_id,
            channel = self.channel.as_key(),
            type_key = %notification.type_key,
            "Delivering notification (stub transport)"
        );
        // No provider, no provider message id.
        Ok(None)
    }
}

/// In-app transport: writes the user's inbox row.
#[derive(Clone)]
pub struct InAppTransport {
    inapp_repo: InAppRepository,
}

impl InAppTransport {
    /// Create an in-app transport.
    #[must_use]
    pub const fn new(inapp_repo: InAppRepository) -> Self {
        Self { inapp_repo }
    }
}

#[async_trait]
impl ChannelTransport for InAppTransport {
    async fn deliver(&self, notification: &notification::Model) -> AppResult<Option<String>> {
        // The payload bag is opaque to the pipeline; only this boundary pulls
        // display fields out of it.
        let mut payload: serde_json::Value =
            serde_json::from_slice(&notification.payload).unwrap_or(serde_json::Value::Null);

        let (title, body, metadata) = match payload.as_object_mut() {
            Some(bag) => {
                let title = bag
                    .remove("title")
                    .and_then(|v| v.as_str().map(ToString::to_string));
                let body = bag
                    .remove("body")
                    .and_then(|v| v.as_str().map(ToString::to_string))
                    .unwrap_or_default();
                let metadata = if bag.is_empty() {
                    None
                } else {
                    Some(serde_json::Value::Object(bag.clone()))
                };
                (title, body, metadata)
            }
            None => (None, String::new(), None),
        };

        let row = self
            .inapp_repo
            .create(inapp_notification::ActiveModel {
                user_id: Set(notification.user_id),
                type_key: Set(notification.type_key.clone()),
                title: Set(title),
                body: Set(body),
                metadata: Set(metadata),
                is_read: Set(false),
                created_at: Set(chrono::Utc::now().into()),
                ..Default::default()
            })
            .await?;

        // The inbox row id doubles as the provider message id.
        Ok(Some(row.id.to_string()))
    }
}
