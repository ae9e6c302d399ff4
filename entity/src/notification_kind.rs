use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_kind")]
pub enum NotificationKind {
    #[sea_orm(string_value = "session_booked")]
    SessionBooked,
    #[sea_orm(string_value = "session_cancelled")]
    SessionCancelled,
    #[sea_orm(string_value = "session_rescheduled")]
    SessionRescheduled,
    #[sea_orm(string_value = "session_updated")]
    SessionUpdated,
    #[sea_orm(string_value = "message_received")]
    MessageReceived,
    #[sea_orm(string_value = "payment_received")]
    PaymentReceived,
}
