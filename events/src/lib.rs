//! Event system infrastructure for the booking platform.
//!
//! This crate provides the event system that enables loose coupling between
//! domain logic and infrastructure concerns (like SSE notifications).
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing all business events in the system
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on internal crates (entity, domain, etc.),
//! avoiding circular dependencies. Entity data is carried as serialized JSON values.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// A type alias that represents any Entity's internal id field data type.
/// This matches the definition in the entity crate to maintain compatibility.
pub type Id = Uuid;

/// The two kinds of account that can receive an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    User,
    Coach,
}

/// An account that should be told about an event. User and coach ids live in
/// different tables, so the kind is part of the address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    pub kind: RecipientKind,
    pub id: Id,
}

impl Recipient {
    pub fn user(id: Id) -> Self {
        Self {
            kind: RecipientKind::User,
            id,
        }
    }

    pub fn coach(id: Id) -> Self {
        Self {
            kind: RecipientKind::Coach,
            id,
        }
    }

    /// Stable string key used to route realtime messages, e.g. `coach:<uuid>`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RecipientKind::User => write!(f, "user:{}", self.id),
            RecipientKind::Coach => write!(f, "coach:{}", self.id),
        }
    }
}

/// Domain events that represent business-level changes in the system.
/// These events are emitted when domain operations complete successfully.
///
/// The domain layer decides who is notified and places those recipients
/// in the event.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A notification row was stored for `recipient`.
    NotificationCreated {
        recipient: Recipient,
        /// Complete serialized notification entity.
        notification: Value,
    },
    /// A message was sent within a coach/user conversation.
    MessageSent {
        coach_id: Id,
        user_id: Id,
        /// Complete serialized message entity.
        message: Value,
        notify: Vec<Recipient>,
    },
    /// A session was booked, rescheduled, cancelled, paid or otherwise updated.
    SessionChanged {
        session_id: Id,
        /// Complete serialized session entity after the change.
        session: Value,
        notify: Vec<Recipient>,
    },
}

impl DomainEvent {
    /// Everyone this event should be delivered to.
    pub fn recipients(&self) -> Vec<Recipient> {
        match self {
            DomainEvent::NotificationCreated { recipient, .. } => vec![*recipient],
            DomainEvent::MessageSent { notify, .. } => notify.clone(),
            DomainEvent::SessionChanged { notify, .. } => notify.clone(),
        }
    }
}

/// Trait for handling domain events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingHandler {
        seen: Mutex<Vec<Vec<Recipient>>>,
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn handle(&self, event: &DomainEvent) {
            self.seen.lock().unwrap().push(event.recipients());
        }
    }

    #[test]
    fn recipient_keys_are_scoped_by_account_kind() {
        let id = Uuid::new_v4();
        assert_eq!(Recipient::user(id).key(), format!("user:{id}"));
        assert_eq!(Recipient::coach(id).key(), format!("coach:{id}"));
        assert_ne!(Recipient::user(id), Recipient::coach(id));
    }

    #[tokio::test]
    async fn publish_calls_every_registered_handler() {
        let first = Arc::new(RecordingHandler {
            seen: Mutex::new(Vec::new()),
        });
        let second = Arc::new(RecordingHandler {
            seen: Mutex::new(Vec::new()),
        });
        let publisher = EventPublisher::new()
            .with_handler(first.clone())
            .with_handler(second.clone());
        assert_eq!(publisher.handler_count(), 2);

        let coach = Recipient::coach(Uuid::new_v4());
        publisher
            .publish(DomainEvent::NotificationCreated {
                recipient: coach,
                notification: serde_json::json!({"title": "Booked"}),
            })
            .await;

        assert_eq!(*first.seen.lock().unwrap(), vec![vec![coach]]);
        assert_eq!(*second.seen.lock().unwrap(), vec![vec![coach]]);
    }
}
