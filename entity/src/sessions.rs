use crate::payment_status::PaymentStatus;
use crate::session_status::SessionStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A booked appointment between a coach and a user.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::sessions::Model)]
#[sea_orm(schema_name = "booking_platform", table_name = "sessions")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,
    #[schema(value_type = Uuid)]
    pub coach_id: Id,
    #[schema(value_type = Uuid)]
    pub user_id: Id,
    #[schema(value_type = Uuid)]
    pub booking_type_id: Id,
    #[schema(value_type = Option<Uuid>)]
    pub time_slot_id: Option<Id>,
    #[schema(value_type = Option<Uuid>)]
    pub discount_id: Option<Id>,
    #[schema(value_type = String, format = DateTime)]
    pub start_time: DateTimeWithTimeZone,
    #[schema(value_type = String, format = DateTime)]
    pub end_time: DateTimeWithTimeZone,
    pub status: SessionStatus,
    pub price_cents: i64,
    pub payment_status: PaymentStatus,
    pub paypal_order_id: Option<String>,
    pub notes: Option<String>,
    pub meeting_url: Option<String>,
    pub cancellation_reason: Option<String>,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::coaches::Entity",
        from = "Column::CoachId",
        to = "super::coaches::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Coaches,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::booking_types::Entity",
        from = "Column::BookingTypeId",
        to = "super::booking_types::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    BookingTypes,
    #[sea_orm(
        belongs_to = "super::time_slots::Entity",
        from = "Column::TimeSlotId",
        to = "super::time_slots::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    TimeSlots,
    #[sea_orm(
        belongs_to = "super::discounts::Entity",
        from = "Column::DiscountId",
        to = "super::discounts::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Discounts,
}

impl Related<super::coaches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coaches.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::booking_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookingTypes.def()
    }
}

impl Related<super::time_slots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimeSlots.def()
    }
}

impl Related<super::discounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Discounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
