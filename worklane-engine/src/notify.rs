/// Fire-and-forget notification delivery
///
/// The engine announces team-affecting events (project created, manager
/// assigned) to an external notification relay. Delivery is strictly
/// best-effort: it happens after the transaction commits, a failure is
/// logged at `warn` and never propagated, and no engine operation waits on
/// or retries it.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Events announced to the notification relay
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    /// A project was created and its team synchronized
    ProjectCreated {
        project_id: Uuid,
        custom_id: String,
        manager_id: Uuid,
    },

    /// A project's manager changed and access was rebuilt
    ManagerAssigned {
        project_id: Uuid,
        custom_id: String,
        manager_id: Uuid,
        requested_by: Uuid,
    },
}

/// Delivery seam for notifications
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Delivers one notification; must not fail and must not block the
    /// caller beyond its own delivery attempt
    async fn send(&self, notification: Notification);
}

/// POSTs notifications as JSON to a configured webhook endpoint
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotifier {
    /// Creates a notifier targeting the given endpoint
    pub fn new(endpoint: String) -> Self {
        HttpNotifier {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Builds a notifier from the `NOTIFY_WEBHOOK_URL` environment variable
    ///
    /// Returns `None` when the variable is unset, in which case callers
    /// typically fall back to [`NoopNotifier`].
    pub fn from_env() -> Option<Self> {
        std::env::var("NOTIFY_WEBHOOK_URL").ok().map(Self::new)
    }
}

#[async_trait]
impl NotificationSender for HttpNotifier {
    async fn send(&self, notification: Notification) {
        let result = self
            .client
            .post(&self.endpoint)
            .timeout(Duration::from_secs(10))
            .json(&notification)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(endpoint = %self.endpoint, "Notification delivered");
            }
            Ok(response) => {
                warn!(
                    endpoint = %self.endpoint,
                    status = %response.status(),
                    "Notification relay rejected event"
                );
            }
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Notification delivery failed");
            }
        }
    }
}

/// Drops notifications; used when no relay is configured and in tests
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

#[async_trait]
impl NotificationSender for NoopNotifier {
    async fn send(&self, notification: Notification) {
        debug!(?notification, "Notification dropped, no relay configured");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_serializes_with_event_tag() {
        let id = Uuid::nil();
        let notification = Notification::ProjectCreated {
            project_id: id,
            custom_id: "PRO-001".to_string(),
            manager_id: id,
        };

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["event"], "project_created");
        assert_eq!(json["custom_id"], "PRO-001");
    }
}
