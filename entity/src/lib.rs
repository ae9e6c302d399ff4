use uuid::Uuid;

pub mod prelude;

// Accounts
pub mod account_type;
pub mod coaches;
pub mod jwt;
pub mod refresh_tokens;
pub mod users;

// Booking
pub mod booking_types;
pub mod custom_services;
pub mod discount_kind;
pub mod discounts;
pub mod payment_status;
pub mod session_status;
pub mod sessions;
pub mod time_slots;

// Messaging
pub mod messages;
pub mod notification_kind;
pub mod notifications;

/// A type alias that represents any Entity's internal id field data type.
/// Aliased so that it's easy to change the underlying type if necessary.
pub type Id = Uuid;
