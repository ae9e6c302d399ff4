use super::error::Error;
use crate::mutate::{self, UpdateMap};
use chrono::Utc;
use entity::booking_types::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Unchanged, ConnectionTrait, DatabaseConnection,
    IntoActiveModel, QueryOrder, Set,
};

pub async fn create(db: &DatabaseConnection, booking_type_model: Model) -> Result<Model, Error> {
    debug!("New Booking Type Model to be inserted: {booking_type_model:?}");

    let now = Utc::now();
    let active_model: ActiveModel = ActiveModel {
        coach_id: Set(booking_type_model.coach_id),
        name: Set(booking_type_model.name),
        description: Set(booking_type_model.description),
        duration_minutes: Set(booking_type_model.duration_minutes),
        price_cents: Set(booking_type_model.price_cents),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Booking types of a coach, cheapest first. With `active_only` the soft
/// deleted ones are left out.
pub async fn find_by_coach(
    db: &DatabaseConnection,
    coach_id: Id,
    active_only: bool,
) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find().filter(Column::CoachId.eq(coach_id));
    if active_only {
        query = query.filter(Column::IsActive.eq(true));
    }

    Ok(query
        .order_by_asc(Column::PriceCents)
        .order_by_asc(Column::Name)
        .all(db)
        .await?)
}

pub async fn update(db: &DatabaseConnection, id: Id, update_map: UpdateMap) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    mutate::update::<ActiveModel, Column>(db, existing.into_active_model(), update_map).await
}

pub async fn deactivate(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    debug!("Deactivating booking type {id}");
    let active_model = ActiveModel {
        id: Unchanged(id),
        is_active: Set(false),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}
