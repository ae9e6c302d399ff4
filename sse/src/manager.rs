use crate::connection::{AccountKey, ConnectionId, ConnectionRegistry};
use crate::message::{Event as BookingEvent, EventType, Message as SseMessage, MessageScope};
use axum::response::sse::Event;
use log::*;
use std::convert::Infallible;
use tokio::sync::mpsc::UnboundedSender;

/// Routes booking events to the live SSE streams of users and coaches.
pub struct Manager {
    registry: ConnectionRegistry,
}

impl Manager {
    pub fn new() -> Self {
        Self {
            registry: ConnectionRegistry::new(),
        }
    }

    /// Attaches a new stream to `account_key` and returns its ID.
    pub fn register_connection(
        &self,
        account_key: AccountKey,
        sender: UnboundedSender<Result<Event, Infallible>>,
    ) -> ConnectionId {
        let connection_id = self.registry.register(account_key.clone(), sender);
        info!(
            "{account_key} opened SSE stream {} ({} open for this account)",
            connection_id.as_str(),
            self.registry.connections_for(&account_key)
        );
        connection_id
    }

    pub fn unregister_connection(&self, connection_id: &ConnectionId) {
        debug!("Closing SSE stream {}", connection_id.as_str());
        self.registry.unregister(connection_id);
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_online(&self, account_key: &str) -> bool {
        self.registry.connections_for(account_key) > 0
    }

    /// Sends one event to several accounts, serializing it once.
    /// Returns the number of streams reached.
    pub fn deliver_to_accounts<'a, I>(&self, event: &BookingEvent, account_keys: I) -> usize
    where
        I: IntoIterator<Item = &'a AccountKey>,
    {
        let Some(sse_event) = encode(event) else {
            return 0;
        };

        account_keys
            .into_iter()
            .map(|key| self.registry.send_to_account(key, sse_event.clone()))
            .sum()
    }

    /// Sends a message based on its scope. Returns the number of streams reached.
    pub fn send_message(&self, message: SseMessage) -> usize {
        match message.scope {
            MessageScope::Account { account_key } => {
                self.deliver_to_accounts(&message.event, [&account_key])
            }
            MessageScope::Broadcast => match encode(&message.event) {
                Some(sse_event) => self.registry.broadcast(sse_event),
                None => 0,
            },
        }
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(event: &BookingEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(data) => Some(Event::default().event(event.event_type()).data(data)),
        Err(e) => {
            error!("Failed to serialize {} event: {e}", event.event_type());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn session_changed() -> BookingEvent {
        BookingEvent::SessionChanged {
            session_id: "s-1".to_string(),
            session: json!({"status": "confirmed"}),
        }
    }

    #[test]
    fn delivers_to_every_stream_of_each_listed_account() {
        let manager = Manager::new();
        let (coach_tab_a, mut coach_rx_a) = mpsc::unbounded_channel();
        let (coach_tab_b, mut coach_rx_b) = mpsc::unbounded_channel();
        let (user_tx, mut user_rx) = mpsc::unbounded_channel();
        manager.register_connection("coach:1".to_string(), coach_tab_a);
        manager.register_connection("coach:1".to_string(), coach_tab_b);
        manager.register_connection("user:1".to_string(), user_tx);

        let reached = manager.deliver_to_accounts(&session_changed(), &["coach:1".to_string()]);

        assert_eq!(reached, 2);
        assert!(coach_rx_a.try_recv().is_ok());
        assert!(coach_rx_b.try_recv().is_ok());
        assert!(user_rx.try_recv().is_err());
    }

    #[test]
    fn user_and_coach_with_same_id_stay_separate() {
        let manager = Manager::new();
        let (user_tx, mut user_rx) = mpsc::unbounded_channel();
        manager.register_connection("user:42".to_string(), user_tx);

        let reached = manager.send_message(SseMessage {
            event: session_changed(),
            scope: MessageScope::Account {
                account_key: "coach:42".to_string(),
            },
        });

        assert_eq!(reached, 0);
        assert!(user_rx.try_recv().is_err());
    }

    #[test]
    fn offline_after_last_stream_closes() {
        let manager = Manager::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let connection_id = manager.register_connection("user:7".to_string(), tx);
        assert!(manager.is_online("user:7"));

        manager.unregister_connection(&connection_id);

        assert!(!manager.is_online("user:7"));
        assert_eq!(manager.connection_count(), 0);
    }
}
