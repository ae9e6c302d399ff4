pub use super::booking_types::Entity as BookingTypes;
pub use super::coaches::Entity as Coaches;
pub use super::custom_services::Entity as CustomServices;
pub use super::discounts::Entity as Discounts;
pub use super::messages::Entity as Messages;
pub use super::notifications::Entity as Notifications;
pub use super::refresh_tokens::Entity as RefreshTokens;
pub use super::sessions::Entity as Sessions;
pub use super::time_slots::Entity as TimeSlots;
pub use super::users::Entity as Users;
