use serde::Serialize;
use serde_json::Value;

/// Trait for getting the SSE event type name
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    #[serde(rename = "notification_created")]
    NotificationCreated { notification: Value },

    #[serde(rename = "message_received")]
    MessageReceived {
        coach_id: String,
        user_id: String,
        message: Value,
    },

    #[serde(rename = "session_changed")]
    SessionChanged { session_id: String, session: Value },

    // System events
    #[serde(rename = "force_logout")]
    ForceLogout { reason: String },
}

impl EventType for Event {
    fn event_type(&self) -> &'static str {
        match self {
            Event::NotificationCreated { .. } => "notification_created",
            Event::MessageReceived { .. } => "message_received",
            Event::SessionChanged { .. } => "session_changed",
            Event::ForceLogout { .. } => "force_logout",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub event: Event,
    pub scope: MessageScope,
}

#[derive(Debug, Clone)]
pub enum MessageScope {
    /// Send to all connections for a specific account key
    Account { account_key: String },
    /// Send to all connected accounts
    Broadcast,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_serializes_with_type_tag_matching_event_type() {
        let event = Event::SessionChanged {
            session_id: "abc".to_string(),
            session: json!({"status": "cancelled"}),
        };

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["type"], event.event_type());
        assert_eq!(value["data"]["session_id"], "abc");
    }
}
