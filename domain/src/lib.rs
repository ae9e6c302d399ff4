//! This module re-exports various items from the `entity_api` crate.
//!
//! The purpose of this re-export is to ensure that consumers of the `domain` crate do not need to
//! directly depend on the `entity_api` crate. By re-exporting these items, we provide a clear and
//! consistent interface for working with query filters and updates within the domain layer, while
//! the underlying implementation details remain in the `entity_api` crate.
pub use entity_api::{
    mutate::{IntoUpdateMap, UpdateMap},
    query::{IntoQueryFilterMap, QueryFilterMap},
};

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{
    account_type, booking_types, coaches, custom_services, discount_kind, discounts, jwt as jwts,
    messages, notification_kind, notifications, payment_status, session_status, sessions,
    time_slots, users, Id,
};

pub mod account;
pub mod auth;
pub mod booking_type;
pub mod coach;
pub mod custom_service;
pub mod discount;
pub mod error;
pub mod jwt;
pub mod message;
pub mod notification;
pub mod payment;
pub mod session;
pub mod time_slot;
pub mod user;

pub mod gateway;
