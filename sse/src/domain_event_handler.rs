use crate::message::Event as SseEvent;
use crate::Manager;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler, Recipient};
use log::*;
use std::sync::Arc;

/// Handles domain events by converting them to SSE messages and sending them to
/// the recipients listed in the event.
pub struct SseDomainEventHandler {
    sse_manager: Arc<Manager>,
}

impl SseDomainEventHandler {
    pub fn new(sse_manager: Arc<Manager>) -> Self {
        Self { sse_manager }
    }

    fn send_to_recipients(&self, sse_event: SseEvent, recipients: &[Recipient]) {
        let account_keys: Vec<_> = recipients.iter().map(Recipient::key).collect();
        let reached = self
            .sse_manager
            .deliver_to_accounts(&sse_event, &account_keys);

        debug!(
            "Sent SSE event to {} recipient(s) over {reached} stream(s): {:?}",
            recipients.len(),
            recipients
        );
    }
}

fn to_sse_event(event: &DomainEvent) -> SseEvent {
    match event {
        DomainEvent::NotificationCreated { notification, .. } => SseEvent::NotificationCreated {
            notification: notification.clone(),
        },
        DomainEvent::MessageSent {
            coach_id,
            user_id,
            message,
            ..
        } => SseEvent::MessageReceived {
            coach_id: coach_id.to_string(),
            user_id: user_id.to_string(),
            message: message.clone(),
        },
        DomainEvent::SessionChanged {
            session_id,
            session,
            ..
        } => SseEvent::SessionChanged {
            session_id: session_id.to_string(),
            session: session.clone(),
        },
    }
}

#[async_trait]
impl EventHandler for SseDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        debug!("Handling domain event {event:?}");
        self.send_to_recipients(to_sse_event(event), &event.recipients());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events::Id;
    use serde_json::json;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn session_changes_reach_every_listed_recipient() {
        let manager = Arc::new(Manager::new());
        let coach = Recipient::coach(Id::new_v4());
        let user = Recipient::user(Id::new_v4());
        let (coach_tx, mut coach_rx) = mpsc::unbounded_channel();
        let (user_tx, mut user_rx) = mpsc::unbounded_channel();
        manager.register_connection(coach.key(), coach_tx);
        manager.register_connection(user.key(), user_tx);

        let handler = SseDomainEventHandler::new(manager.clone());
        handler
            .handle(&DomainEvent::SessionChanged {
                session_id: Id::new_v4(),
                session: json!({"status": "scheduled"}),
                notify: vec![coach],
            })
            .await;

        assert!(coach_rx.try_recv().is_ok());
        assert!(user_rx.try_recv().is_err());
    }

    #[test]
    fn notification_events_keep_their_payload() {
        let payload = json!({"title": "Session booked"});
        let event = DomainEvent::NotificationCreated {
            recipient: Recipient::user(Id::new_v4()),
            notification: payload.clone(),
        };

        match to_sse_event(&event) {
            SseEvent::NotificationCreated { notification } => assert_eq!(notification, payload),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
