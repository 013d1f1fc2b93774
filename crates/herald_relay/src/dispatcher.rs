//! Alert delivery.

use herald_core::{AlertPayload, ChannelId, MessageId};
use herald_error::{RelayError, RelayErrorKind};
use herald_interface::AlertPlatform;
use std::sync::Arc;
use std::time::Duration;

/// Sends alerts and schedules their deletion.
#[derive(Clone)]
pub struct AlertDispatcher {
    platform: Arc<dyn AlertPlatform>,
    auto_delete_after: Duration,
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDispatcher")
            .field("auto_delete_after", &self.auto_delete_after)
            .finish_non_exhaustive()
    }
}

impl AlertDispatcher {
    /// Create a dispatcher deleting alerts `auto_delete_after` they are sent.
    pub fn new(platform: Arc<dyn AlertPlatform>, auto_delete_after: Duration) -> Self {
        Self {
            platform,
            auto_delete_after,
        }
    }

    /// Send `alert` to a channel or thread.
    ///
    /// A failed send is logged and not retried. When `auto_delete` is set, the
    /// sent message is deleted after the configured delay; failures to delete
    /// are ignored.
    #[tracing::instrument(skip(self, alert), fields(kind = %alert.kind))]
    pub async fn dispatch(
        &self,
        channel_id: ChannelId,
        alert: &AlertPayload,
        auto_delete: bool,
    ) -> Option<MessageId> {
        let message_id = match self.platform.send_alert(channel_id, alert).await {
            Ok(id) => id,
            Err(source) => {
                let err = RelayError::new(RelayErrorKind::MessageSend {
                    channel_id: channel_id.get(),
                    source,
                });
                tracing::warn!(error = %err, "Alert not sent");
                return None;
            }
        };
        tracing::debug!(message_id = %message_id, "Alert sent");

        if auto_delete {
            let platform = self.platform.clone();
            let delay = self.auto_delete_after;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Err(e) = platform.delete_message(channel_id, message_id).await {
                    tracing::debug!(
                        channel_id = %channel_id,
                        message_id = %message_id,
                        error = %e,
                        "Auto-delete failed"
                    );
                }
            });
        }

        Some(message_id)
    }
}
