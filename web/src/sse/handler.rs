use crate::extractors::authenticated_account::AuthenticatedAccount;
use async_stream::stream;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use log::*;
use service::AppState;
use sse::connection::ConnectionId;
use sse::Manager;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Unregisters the connection when the response stream is dropped, which is
/// also what happens when the client disconnects.
struct ConnectionGuard {
    manager: Arc<Manager>,
    connection_id: ConnectionId,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.manager.unregister_connection(&self.connection_id);
    }
}

/// SSE handler that establishes a long-lived connection for real-time updates.
/// Users and coaches may hold several connections at once (one per tab).
pub(crate) async fn sse_handler(
    AuthenticatedAccount(account): AuthenticatedAccount,
    State(app_state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let account_key = account.recipient().key();
    debug!("Establishing SSE connection for {account_key}");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let connection_id = app_state
        .sse_manager
        .register_connection(account_key.clone(), tx);

    let guard = ConnectionGuard {
        manager: app_state.sse_manager.clone(),
        connection_id,
    };

    let stream = stream! {
        let _guard = guard;
        while let Some(event) = rx.recv().await {
            yield event;
        }
        debug!("SSE channel closed for {account_key}");
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn dropping_the_guard_unregisters_the_connection() {
        let manager = Arc::new(Manager::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let connection_id = manager.register_connection("user:1".to_string(), tx);
        assert_eq!(manager.connection_count(), 1);

        drop(ConnectionGuard {
            manager: manager.clone(),
            connection_id,
        });

        assert_eq!(manager.connection_count(), 0);
    }
}
