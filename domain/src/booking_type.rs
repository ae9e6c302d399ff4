use crate::booking_types::Model;
use crate::error::Error;
use crate::{Id, IntoUpdateMap, UpdateMap};
use chrono::Utc;
use entity_api::booking_type;
use log::*;
use sea_orm::DatabaseConnection;
use std::ops::RangeInclusive;

pub use entity_api::booking_type::find_by_id;

pub const DURATION_MINUTES: RangeInclusive<i32> = 5..=1440;

#[derive(Debug, Clone, Default)]
pub struct NewBookingType {
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price_cents: i64,
}

#[derive(Debug, Clone, Default)]
pub struct BookingTypeUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub duration_minutes: Option<i32>,
    pub price_cents: Option<i64>,
    pub is_active: Option<bool>,
}

impl IntoUpdateMap for BookingTypeUpdate {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        update_map.insert_some("name", self.name.map(|name| name.trim().to_string()));
        update_map.insert_some("description", self.description);
        update_map.insert_some("duration_minutes", self.duration_minutes);
        update_map.insert_some("price_cents", self.price_cents);
        update_map.insert_some("is_active", self.is_active);
        update_map
    }
}

pub async fn create(
    db: &DatabaseConnection,
    coach_id: Id,
    new_booking_type: NewBookingType,
) -> Result<Model, Error> {
    validate(
        Some(&new_booking_type.name),
        Some(new_booking_type.duration_minutes),
        Some(new_booking_type.price_cents),
    )?;

    let now = Utc::now().fixed_offset();
    let created = booking_type::create(
        db,
        Model {
            id: Id::nil(),
            coach_id,
            name: new_booking_type.name.trim().to_string(),
            description: new_booking_type.description,
            duration_minutes: new_booking_type.duration_minutes,
            price_cents: new_booking_type.price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;
    info!("Coach {coach_id} created booking type {}", created.id);
    Ok(created)
}

/// Every booking type of the coach, including deactivated ones.
pub async fn find_by_coach(db: &DatabaseConnection, coach_id: Id) -> Result<Vec<Model>, Error> {
    Ok(booking_type::find_by_coach(db, coach_id, false).await?)
}

/// Public listing: active booking types of an active coach.
pub async fn find_public_by_coach(
    db: &DatabaseConnection,
    coach_id: Id,
) -> Result<Vec<Model>, Error> {
    entity_api::coach::find_active_by_id(db, coach_id).await?;
    Ok(booking_type::find_by_coach(db, coach_id, true).await?)
}

pub async fn update(
    db: &DatabaseConnection,
    coach_id: Id,
    id: Id,
    params: BookingTypeUpdate,
) -> Result<Model, Error> {
    find_owned(db, coach_id, id).await?;
    validate(
        params.name.as_deref(),
        params.duration_minutes,
        params.price_cents,
    )?;
    Ok(booking_type::update(db, id, params.into_update_map()).await?)
}

/// Soft delete; existing sessions keep referring to the booking type.
pub async fn deactivate(db: &DatabaseConnection, coach_id: Id, id: Id) -> Result<Model, Error> {
    find_owned(db, coach_id, id).await?;
    Ok(booking_type::deactivate(db, id).await?)
}

/// Loads a booking type and checks that `coach_id` owns it.
pub async fn find_owned(db: &DatabaseConnection, coach_id: Id, id: Id) -> Result<Model, Error> {
    let booking_type = booking_type::find_by_id(db, id).await?;
    if booking_type.coach_id != coach_id {
        warn!("Coach {coach_id} attempted to access booking type {id} they do not own");
        return Err(Error::forbidden());
    }
    Ok(booking_type)
}

fn validate(
    name: Option<&str>,
    duration_minutes: Option<i32>,
    price_cents: Option<i64>,
) -> Result<(), Error> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(Error::validation("name must not be empty"));
        }
    }
    if let Some(duration) = duration_minutes {
        if !DURATION_MINUTES.contains(&duration) {
            return Err(Error::validation(format!(
                "duration_minutes must be between {} and {}",
                DURATION_MINUTES.start(),
                DURATION_MINUTES.end()
            )));
        }
    }
    if let Some(price) = price_cents {
        if price < 0 {
            return Err(Error::validation("price_cents must not be negative"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_bounds_are_inclusive() {
        assert!(validate(None, Some(5), None).is_ok());
        assert!(validate(None, Some(1440), None).is_ok());
        assert!(validate(None, Some(4), None).is_err());
        assert!(validate(None, Some(1441), None).is_err());
    }

    #[test]
    fn blank_names_and_negative_prices_are_rejected() {
        assert!(validate(Some("   "), None, None).is_err());
        assert!(validate(None, None, Some(-1)).is_err());
        assert!(validate(Some("Deep dive"), Some(90), Some(0)).is_ok());
    }
}
