//! Notification dispatch contract
//!
//! The engine decides *that* a notification is due and which template
//! kind applies; rendering and delivery belong to an external messaging
//! collaborator behind the [`Notifier`] trait. Delivery is best-effort:
//! a single attempt, failures logged by the caller, never rolled back
//! into match state.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Outbound message template kinds selected by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A mutual match formed; sent to both parties
    MatchFound,
    /// Crush declaration recorded for the first time
    CrushAcceptedFirstTime,
    /// An existing crush declaration was overwritten
    CrushAcceptedUpdate,
    /// Sent to the user whose edit dissolved the match
    UnmatchedInitiator,
    /// Sent to the partner of the user whose edit dissolved the match
    UnmatchedPartner,
    /// Registration completed; prompt the next action
    RegistrationFollowup,
}

/// Capability interface for outbound message dispatch.
///
/// One method covers all template kinds; `params` carries the
/// template-specific values (partner name, etc.) as a JSON object.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: &str, kind: NotificationKind, params: Value) -> Result<()>;
}

/// Fallback notifier used when no delivery endpoint is configured.
/// Logs the notification and reports success.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, user_id: &str, kind: NotificationKind, params: Value) -> Result<()> {
        info!("Notification for {}: {:?} {}", user_id, kind, params);
        Ok(())
    }
}

/// Forwards notifications as JSON to a configured delivery endpoint.
/// The endpoint owns message rendering and platform delivery.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

/// Wire shape POSTed to the delivery endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub user_id: String,
    pub kind: NotificationKind,
    pub params: Value,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        WebhookNotifier {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, user_id: &str, kind: NotificationKind, params: Value) -> Result<()> {
        let request = NotificationRequest {
            user_id: user_id.to_string(),
            kind,
            params,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| crate::Error::Notify(e.to_string()))?;

        if !response.status().is_success() {
            return Err(crate::Error::Notify(format!(
                "delivery endpoint returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&NotificationKind::MatchFound).unwrap();
        assert_eq!(json, "\"match_found\"");

        let json = serde_json::to_string(&NotificationKind::UnmatchedPartner).unwrap();
        assert_eq!(json, "\"unmatched_partner\"");
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let notifier = LogNotifier;
        let result = notifier
            .notify(
                "U1",
                NotificationKind::RegistrationFollowup,
                serde_json::json!({}),
            )
            .await;
        assert!(result.is_ok());
    }
}
