use crate::domain::message::Message;
use serde::{Deserialize, Serialize};

/// The two event kinds a room's broadcast channel can carry. Payload shapes
/// are fixed; anything that fails to deserialize into one of these is
/// dropped at the subscriber boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum RoomEvent {
    #[serde(rename = "message-appended")]
    MessageAppended(Message),
    #[serde(rename = "room-destroyed")]
    RoomDestroyed {
        #[serde(rename = "isDestroyed")]
        is_destroyed: bool,
    },
}

impl RoomEvent {
    #[must_use]
    pub const fn destroyed() -> Self {
        Self::RoomDestroyed { is_destroyed: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tagging() {
        let event = RoomEvent::destroyed();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "room-destroyed");
        assert_eq!(json["payload"]["isDestroyed"], true);
    }

    #[test]
    fn test_message_event_roundtrip() {
        let msg = Message::new("room-1".to_string(), "anonymous-cat-x".to_string(), "hi".to_string());
        let event = RoomEvent::MessageAppended(msg.clone());

        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: RoomEvent = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decoded, RoomEvent::MessageAppended(msg));
    }

    #[test]
    fn test_unknown_event_rejected() {
        let raw = serde_json::json!({ "event": "room-renamed", "payload": {} });
        assert!(serde_json::from_value::<RoomEvent>(raw).is_err());
    }
}
