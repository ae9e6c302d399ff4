use axum::response::sse::Event;
use dashmap::DashMap;
use log::*;
use std::collections::HashSet;
use std::convert::Infallible;
use tokio::sync::mpsc::UnboundedSender;

/// Routing key of an account, e.g. `user:<uuid>` or `coach:<uuid>`.
/// Built by `events::Recipient::key` so both sides agree on the format.
pub type AccountKey = String;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub account_key: AccountKey,
    pub sender: UnboundedSender<Result<Event, Infallible>>,
}

/// Connection registry with dual indices for O(1) lookups
pub struct ConnectionRegistry {
    /// Primary storage: lookup by connection_id for registration/cleanup
    connections: DashMap<ConnectionId, ConnectionInfo>,

    /// Secondary index: lookup by account key for message routing
    account_index: DashMap<AccountKey, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            account_index: DashMap::new(),
        }
    }

    pub fn register(
        &self,
        account_key: AccountKey,
        sender: UnboundedSender<Result<Event, Infallible>>,
    ) -> ConnectionId {
        let connection_id = ConnectionId::new();

        self.connections.insert(
            connection_id.clone(),
            ConnectionInfo {
                account_key: account_key.clone(),
                sender,
            },
        );

        self.account_index
            .entry(account_key)
            .or_default()
            .insert(connection_id.clone());

        connection_id
    }

    pub fn unregister(&self, connection_id: &ConnectionId) {
        if let Some((_, info)) = self.connections.remove(connection_id) {
            let account_key = info.account_key;

            if let Some(mut entry) = self.account_index.get_mut(&account_key) {
                entry.remove(connection_id);

                if entry.is_empty() {
                    drop(entry); // Release lock before removal
                    self.account_index.remove(&account_key);
                }
            }
        }
    }

    /// Number of live connections held by `account_key`.
    pub fn connections_for(&self, account_key: &str) -> usize {
        self.account_index
            .get(account_key)
            .map(|ids| ids.len())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Sends to every connection of one account. Returns how many sends succeeded.
    pub fn send_to_account(&self, account_key: &str, event: Event) -> usize {
        let mut delivered = 0;
        if let Some(connection_ids) = self.account_index.get(account_key) {
            for conn_id in connection_ids.iter() {
                if let Some(info) = self.connections.get(conn_id) {
                    match info.sender.send(Ok(event.clone())) {
                        Ok(()) => delivered += 1,
                        Err(e) => warn!(
                            "Failed to send event to connection {}: {}. Connection will be cleaned up.",
                            conn_id.as_str(),
                            e
                        ),
                    }
                }
            }
        }
        delivered
    }

    pub fn broadcast(&self, event: Event) -> usize {
        let mut delivered = 0;
        for entry in self.connections.iter() {
            match entry.value().sender.send(Ok(event.clone())) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    "Failed to send broadcast to connection {}: {}",
                    entry.key().as_str(),
                    e
                ),
            }
        }
        delivered
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn register_and_unregister_maintain_both_indices() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        let first = registry.register("user:1".to_string(), tx);
        let second = registry.register("user:1".to_string(), tx2);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.connections_for("user:1"), 2);

        registry.unregister(&first);
        assert_eq!(registry.connections_for("user:1"), 1);

        registry.unregister(&second);
        assert_eq!(registry.connections_for("user:1"), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn send_to_account_only_reaches_that_account() {
        let registry = ConnectionRegistry::new();
        let (user_tx, mut user_rx) = mpsc::unbounded_channel();
        let (coach_tx, mut coach_rx) = mpsc::unbounded_channel();
        registry.register("user:42".to_string(), user_tx);
        registry.register("coach:42".to_string(), coach_tx);

        let delivered = registry.send_to_account("coach:42", Event::default().data("hi"));

        assert_eq!(delivered, 1);
        assert!(coach_rx.try_recv().is_ok());
        assert!(user_rx.try_recv().is_err());
    }

    #[test]
    fn closed_receivers_are_not_counted_as_delivered() {
        let registry = ConnectionRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register("user:7".to_string(), tx);
        drop(rx);

        assert_eq!(registry.broadcast(Event::default().data("bye")), 0);
    }
}
