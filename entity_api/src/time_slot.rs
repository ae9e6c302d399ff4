use super::error::Error;
use chrono::Utc;
use entity::time_slots::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, sea_query::Expr, ConnectionTrait, DatabaseConnection, QueryOrder, Select,
    Set,
};

pub async fn create(db: &impl ConnectionTrait, time_slot_model: Model) -> Result<Model, Error> {
    debug!("New Time Slot Model to be inserted: {time_slot_model:?}");

    let now = Utc::now();
    let active_model: ActiveModel = ActiveModel {
        coach_id: Set(time_slot_model.coach_id),
        start_time: Set(time_slot_model.start_time),
        end_time: Set(time_slot_model.end_time),
        is_available: Set(true),
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

/// All slots of a coach whose start falls in `[from, to)`, earliest first.
pub async fn find_by_coach(
    db: &DatabaseConnection,
    coach_id: Id,
    from: Option<DateTimeWithTimeZone>,
    to: Option<DateTimeWithTimeZone>,
) -> Result<Vec<Model>, Error> {
    let query = within(Entity::find().filter(Column::CoachId.eq(coach_id)), from, to);
    Ok(query.order_by_asc(Column::StartTime).all(db).await?)
}

/// Bookable slots of a coach: available and starting at or after `from`.
pub async fn find_available_by_coach(
    db: &DatabaseConnection,
    coach_id: Id,
    from: DateTimeWithTimeZone,
    to: Option<DateTimeWithTimeZone>,
) -> Result<Vec<Model>, Error> {
    let query = within(
        Entity::find()
            .filter(Column::CoachId.eq(coach_id))
            .filter(Column::IsAvailable.eq(true)),
        Some(from),
        to,
    );
    Ok(query.order_by_asc(Column::StartTime).all(db).await?)
}

/// Slots of a coach that intersect `[start, end)`. `exclude` leaves one slot
/// out, used when moving an existing slot.
pub async fn find_overlapping(
    db: &impl ConnectionTrait,
    coach_id: Id,
    start: DateTimeWithTimeZone,
    end: DateTimeWithTimeZone,
    exclude: Option<Id>,
) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find()
        .filter(Column::CoachId.eq(coach_id))
        .filter(Column::StartTime.lt(end))
        .filter(Column::EndTime.gt(start));
    if let Some(id) = exclude {
        query = query.filter(Column::Id.ne(id));
    }

    Ok(query.all(db).await?)
}

/// Moves a slot that is still available. Returns `None` when the slot is
/// missing or was booked in the meantime.
pub async fn update_times_if_available(
    db: &impl ConnectionTrait,
    id: Id,
    start_time: DateTimeWithTimeZone,
    end_time: DateTimeWithTimeZone,
) -> Result<Option<Model>, Error> {
    let updated = Entity::update_many()
        .col_expr(Column::StartTime, Expr::value(start_time))
        .col_expr(Column::EndTime, Expr::value(end_time))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(Column::Id.eq(id))
        .filter(Column::IsAvailable.eq(true))
        .exec_with_returning(db)
        .await?;

    Ok(updated.into_iter().next())
}

/// Takes a slot for a booking. Returns `false` when it was not available.
pub async fn claim(db: &impl ConnectionTrait, id: Id) -> Result<bool, Error> {
    debug!("Claiming time slot {id}");
    let result = Entity::update_many()
        .col_expr(Column::IsAvailable, Expr::value(false))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(Column::Id.eq(id))
        .filter(Column::IsAvailable.eq(true))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

/// Frees a slot again after its session was cancelled or moved.
pub async fn release(db: &impl ConnectionTrait, id: Id) -> Result<(), Error> {
    debug!("Releasing time slot {id}");
    Entity::update_many()
        .col_expr(Column::IsAvailable, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

/// Deletes a slot only while nobody has booked it. Returns `false` otherwise.
pub async fn delete_if_available(db: &impl ConnectionTrait, id: Id) -> Result<bool, Error> {
    let result = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::IsAvailable.eq(true))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

fn within(
    mut query: Select<Entity>,
    from: Option<DateTimeWithTimeZone>,
    to: Option<DateTimeWithTimeZone>,
) -> Select<Entity> {
    if let Some(from) = from {
        query = query.filter(Column::StartTime.gte(from));
    }
    if let Some(to) = to {
        query = query.filter(Column::StartTime.lt(to));
    }
    query
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    #[tokio::test]
    async fn find_overlapping_excludes_the_slot_being_moved() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let coach_id = Id::new_v4();
        let slot_id = Id::new_v4();
        let start: DateTimeWithTimeZone = Utc::now().into();
        let end = start + Duration::hours(1);

        let overlapping = find_overlapping(&db, coach_id, start, end, Some(slot_id)).await?;
        assert!(overlapping.is_empty());

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "time_slots"."id", "time_slots"."coach_id", "time_slots"."start_time", "time_slots"."end_time", "time_slots"."is_available", "time_slots"."created_at", "time_slots"."updated_at" FROM "booking_platform"."time_slots" WHERE "time_slots"."coach_id" = $1 AND "time_slots"."start_time" < $2 AND "time_slots"."end_time" > $3 AND "time_slots"."id" <> $4"#,
                [coach_id.into(), end.into(), start.into(), slot_id.into()]
            )]
        );
        Ok(())
    }

    #[tokio::test]
    async fn booked_slots_are_neither_deleted_nor_claimed() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let slot_id = Id::new_v4();
        assert!(!delete_if_available(&db, slot_id).await?);
        assert!(!claim(&db, slot_id).await?);

        let log = db.into_transaction_log();
        let delete_sql = &log[0].statements()[0].sql;
        assert!(delete_sql.starts_with(r#"DELETE FROM "booking_platform"."time_slots""#));
        assert!(delete_sql.ends_with(
            r#"WHERE "time_slots"."id" = $1 AND "time_slots"."is_available" = $2"#
        ));
        let claim_sql = &log[1].statements()[0].sql;
        assert!(claim_sql.contains(r#"AND "time_slots"."is_available" = $"#));
        Ok(())
    }

    #[tokio::test]
    async fn moving_a_booked_slot_updates_nothing() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let start: DateTimeWithTimeZone = (Utc::now() + Duration::days(1)).into();
        let moved =
            update_times_if_available(&db, Id::new_v4(), start, start + Duration::hours(1))
                .await?;

        assert!(moved.is_none());
        let log = db.into_transaction_log();
        assert!(log[0].statements()[0]
            .sql
            .contains(r#""time_slots"."is_available" = $"#));
        Ok(())
    }
}
