//! Server-Sent Events (SSE) infrastructure for real-time updates.
//!
//! Connected accounts (users and coaches) receive notifications, new messages and
//! session changes the moment the domain layer records them.
//!
//! # Architecture
//!
//! - **Account keys**: connections are indexed by `user:<id>` / `coach:<id>` so that a
//!   user and a coach can never receive each other's events.
//! - **Dual-index registry**: O(1) lookups for both connection management and
//!   account-scoped message routing via separate DashMap indices.
//! - **Account and Broadcast scopes**: Messages can be sent to specific accounts or
//!   broadcast to all connected accounts.
//! - **Ephemeral messages**: if an account is offline it misses the event and sees
//!   fresh data (including stored notifications) on next page load.
//!
//! # Message Flow
//!
//! 1. Frontend establishes SSE connection via `/sse` endpoint
//! 2. Backend authenticates the bearer token (AuthenticatedAccount)
//! 3. Connection registered in ConnectionRegistry with dual indices
//! 4. Domain operation publishes a `DomainEvent` listing its recipients
//! 5. `SseDomainEventHandler` converts it and sends it to each recipient's connections
//!
//! # Modules
//!
//! - `connection`: ConnectionRegistry with dual-index architecture and type-safe ConnectionId
//! - `domain_event_handler`: bridges `events::DomainEvent` to SSE messages
//! - `manager`: High-level message routing (delegates to ConnectionRegistry)
//! - `message`: Type-safe event and scope definitions

pub mod connection;
pub mod domain_event_handler;
pub mod manager;
pub mod message;

pub use domain_event_handler::SseDomainEventHandler;
pub use manager::Manager;
