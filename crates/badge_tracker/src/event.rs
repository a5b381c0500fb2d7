use badge_shared_util::{is_true_or_one, AccountId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::Result;

/// Events published by the rest of the application that the badge reacts to.
///
/// On the wire, events are JSON objects tagged by their `event` field, e.g.
/// `{"event": "read_changed", "account": "site-a"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// An account became the active session.
    Login { account: AccountId },
    /// Notifications of an account were marked read or unread.
    ReadChanged { account: AccountId },
    /// The periodic background sync for an account finished.
    SyncCompleted { account: AccountId },
    /// The active session was closed.
    SessionEnded,
    /// A push message arrived from the server.
    PushReceived(PushNotification),
}

impl AppEvent {
    /// Parse and validate a single JSON-encoded event.
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::Login { .. } => "login",
            AppEvent::ReadChanged { .. } => "read_changed",
            AppEvent::SyncCompleted { .. } => "sync_completed",
            AppEvent::SessionEnded => "session_ended",
            AppEvent::PushReceived(_) => "push_received",
        }
    }
}

/// Payload of a received push message.
///
/// `notif` is kept in whatever shape the sender used; see [`PushNotification::is_notification`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushNotification {
    #[serde(default)]
    pub notif: serde_json::Value,
    #[serde(default)]
    pub site: Option<AccountId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PushNotification {
    /// Whether the message is an actual notification, as opposed to e.g. a chat message.
    pub fn is_notification(&self) -> bool {
        is_true_or_one(&self.notif)
    }
}

/// Broadcast channel capacity. Slow subscribers skip the oldest events past this.
pub const EVENT_BUS_CAPACITY: usize = 64;

/// Publish/subscribe channel for [`AppEvent`]s.
///
/// Every subscriber receives every event published after it subscribed, in publish order.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers. Events published without subscribers are dropped.
    pub fn publish(&self, event: AppEvent) {
        log::debug!("publishing event {}", event.name());
        if self.sender.send(event).is_err() {
            log::trace!("no subscribers for published event");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_events() {
        assert_eq!(
            AppEvent::from_json(r#"{"event": "read_changed", "account": "a"}"#).unwrap(),
            AppEvent::ReadChanged { account: "a".into() }
        );
        assert_eq!(
            AppEvent::from_json(r#"{"event": "sync_completed", "account": "a"}"#).unwrap(),
            AppEvent::SyncCompleted { account: "a".into() }
        );
        assert_eq!(AppEvent::from_json(r#"{"event": "session_ended"}"#).unwrap(), AppEvent::SessionEnded);
        assert_eq!(
            AppEvent::from_json(r#"{"event": "push_received", "notif": "1", "site": "a", "title": "hi"}"#).unwrap(),
            AppEvent::PushReceived(PushNotification {
                notif: json!("1"),
                site: Some("a".into()),
                title: Some("hi".to_string()),
                message: None,
            })
        );
    }

    #[test]
    fn test_parse_push_without_flag() {
        let event = AppEvent::from_json(r#"{"event": "push_received", "site": "a"}"#).unwrap();
        match event {
            AppEvent::PushReceived(push) => assert!(!push.is_notification()),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_reject_malformed_events() {
        assert!(AppEvent::from_json(r#"{"event": "read_changed"}"#).is_err());
        assert!(AppEvent::from_json(r#"{"event": "nope"}"#).is_err());
        assert!(AppEvent::from_json(r#"{"account": "a"}"#).is_err());
        assert!(AppEvent::from_json("not json").is_err());
    }

    #[tokio::test]
    async fn test_bus_delivers_in_order_to_every_subscriber() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(AppEvent::Login { account: "a".into() });
        bus.publish(AppEvent::SessionEnded);

        for recv in [&mut first, &mut second] {
            assert_eq!(recv.recv().await.unwrap(), AppEvent::Login { account: "a".into() });
            assert_eq!(recv.recv().await.unwrap(), AppEvent::SessionEnded);
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::default();
        bus.publish(AppEvent::SessionEnded);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
