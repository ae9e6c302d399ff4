use crate::error::Error;
use crate::time_slots::Model;
use crate::Id;
use chrono::{DateTime, FixedOffset, Utc};
use entity_api::time_slot;
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::time_slot::find_by_id;

pub async fn create(
    db: &DatabaseConnection,
    coach_id: Id,
    start_time: DateTime<FixedOffset>,
    end_time: DateTime<FixedOffset>,
) -> Result<Model, Error> {
    validate_window(start_time, end_time, Utc::now())?;
    ensure_no_overlap(db, coach_id, start_time, end_time, None).await?;

    let now = Utc::now().fixed_offset();
    let created = time_slot::create(
        db,
        Model {
            id: Id::nil(),
            coach_id,
            start_time,
            end_time,
            is_available: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;
    debug!("Coach {coach_id} published time slot {}", created.id);
    Ok(created)
}

/// Moves a slot that has not been booked yet.
pub async fn update(
    db: &DatabaseConnection,
    coach_id: Id,
    id: Id,
    start_time: DateTime<FixedOffset>,
    end_time: DateTime<FixedOffset>,
) -> Result<Model, Error> {
    let existing = find_owned(db, coach_id, id).await?;
    if !existing.is_available {
        info!("Refusing to move booked time slot {id}");
        return Err(Error::conflict());
    }
    validate_window(start_time, end_time, Utc::now())?;
    ensure_no_overlap(db, coach_id, start_time, end_time, Some(id)).await?;

    time_slot::update_times_if_available(db, id, start_time, end_time)
        .await?
        .ok_or_else(|| {
            info!("Time slot {id} was booked before it could be moved");
            Error::conflict()
        })
}

/// Removes a slot that has not been booked.
pub async fn delete(db: &DatabaseConnection, coach_id: Id, id: Id) -> Result<(), Error> {
    let existing = find_owned(db, coach_id, id).await?;
    if !existing.is_available {
        info!("Refusing to delete booked time slot {id}");
        return Err(Error::conflict());
    }
    if !time_slot::delete_if_available(db, id).await? {
        info!("Time slot {id} was booked before it could be deleted");
        return Err(Error::conflict());
    }
    Ok(())
}

pub async fn find_by_coach(
    db: &DatabaseConnection,
    coach_id: Id,
    from: Option<DateTime<FixedOffset>>,
    to: Option<DateTime<FixedOffset>>,
) -> Result<Vec<Model>, Error> {
    Ok(time_slot::find_by_coach(db, coach_id, from, to).await?)
}

/// Public availability of an active coach: free slots that have not started yet.
pub async fn find_available(
    db: &DatabaseConnection,
    coach_id: Id,
    from: Option<DateTime<FixedOffset>>,
    to: Option<DateTime<FixedOffset>>,
) -> Result<Vec<Model>, Error> {
    entity_api::coach::find_active_by_id(db, coach_id).await?;

    let now = Utc::now().fixed_offset();
    let from = from.filter(|from| *from > now).unwrap_or(now);
    Ok(time_slot::find_available_by_coach(db, coach_id, from, to).await?)
}

pub async fn find_owned(db: &DatabaseConnection, coach_id: Id, id: Id) -> Result<Model, Error> {
    let slot = time_slot::find_by_id(db, id).await?;
    if slot.coach_id != coach_id {
        warn!("Coach {coach_id} attempted to access time slot {id} they do not own");
        return Err(Error::forbidden());
    }
    Ok(slot)
}

fn validate_window(
    start_time: DateTime<FixedOffset>,
    end_time: DateTime<FixedOffset>,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    if end_time <= start_time {
        return Err(Error::validation("end_time must be after start_time"));
    }
    if start_time <= now {
        return Err(Error::validation("start_time must be in the future"));
    }
    Ok(())
}

async fn ensure_no_overlap(
    db: &DatabaseConnection,
    coach_id: Id,
    start_time: DateTime<FixedOffset>,
    end_time: DateTime<FixedOffset>,
    exclude: Option<Id>,
) -> Result<(), Error> {
    let overlapping =
        time_slot::find_overlapping(db, coach_id, start_time, end_time, exclude).await?;
    if let Some(clash) = overlapping.first() {
        info!(
            "Time slot {start_time}..{end_time} for coach {coach_id} overlaps slot {}",
            clash.id
        );
        return Err(Error::conflict());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn windows_must_be_forward_and_in_the_future() {
        let now = Utc::now();
        let start = (now + Duration::hours(2)).fixed_offset();

        assert!(validate_window(start, start + Duration::minutes(30), now).is_ok());
        assert!(validate_window(start, start, now).is_err());
        assert!(validate_window(start, start - Duration::minutes(1), now).is_err());

        let past = (now - Duration::hours(1)).fixed_offset();
        assert!(validate_window(past, past + Duration::hours(2), now).is_err());
    }
}
