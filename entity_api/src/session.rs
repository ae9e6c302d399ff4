use super::error::Error;
use crate::mutate::{self, UpdateMap};
use crate::query::{self, QueryFilterMap};
use chrono::Utc;
use entity::payment_status::PaymentStatus;
use entity::session_status::SessionStatus;
use entity::sessions::{ActiveModel, Column, Entity, Model};
use entity::time_slots;
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Unchanged, ConnectionTrait, DatabaseConnection,
    IntoActiveModel, QuerySelect, Set,
};

pub async fn create(db: &impl ConnectionTrait, session_model: Model) -> Result<Model, Error> {
    debug!("New Session Model to be inserted: {session_model:?}");

    let now = Utc::now();
    let active_model: ActiveModel = ActiveModel {
        coach_id: Set(session_model.coach_id),
        user_id: Set(session_model.user_id),
        booking_type_id: Set(session_model.booking_type_id),
        time_slot_id: Set(session_model.time_slot_id),
        discount_id: Set(session_model.discount_id),
        start_time: Set(session_model.start_time),
        end_time: Set(session_model.end_time),
        status: Set(SessionStatus::Scheduled),
        price_cents: Set(session_model.price_cents),
        payment_status: Set(session_model.payment_status),
        paypal_order_id: Set(None),
        notes: Set(session_model.notes),
        meeting_url: Set(None),
        cancellation_reason: Set(None),
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

/// Reads a session and holds a row lock on it until the transaction ends.
pub async fn lock_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

pub async fn find_by_paypal_order_id(
    db: &DatabaseConnection,
    order_id: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::PaypalOrderId.eq(order_id))
        .one(db)
        .await?)
}

/// Sessions matching the filter (e.g. `coach_id`, `user_id`, `status`), latest start first.
pub async fn find_by(
    db: &DatabaseConnection,
    query_filter_map: QueryFilterMap,
) -> Result<Vec<Model>, Error> {
    query::find_by::<Entity, Column>(db, query_filter_map, Column::StartTime).await
}

/// Updates coach-editable details such as notes, meeting url and status.
pub async fn update(db: &DatabaseConnection, id: Id, update_map: UpdateMap) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    mutate::update::<ActiveModel, Column>(db, existing.into_active_model(), update_map).await
}

pub async fn cancel(
    db: &impl ConnectionTrait,
    id: Id,
    reason: Option<String>,
) -> Result<Model, Error> {
    debug!("Cancelling session {id}");
    let active_model = ActiveModel {
        id: Unchanged(id),
        status: Set(SessionStatus::Cancelled),
        cancellation_reason: Set(reason),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

/// Moves a session onto `time_slot`, taking the slot's start and an end that
/// keeps the session's original length.
pub async fn reschedule(
    db: &impl ConnectionTrait,
    session: &Model,
    time_slot: &time_slots::Model,
) -> Result<Model, Error> {
    debug!(
        "Rescheduling session {} onto time slot {}",
        session.id, time_slot.id
    );
    let length = session.end_time - session.start_time;
    let active_model = ActiveModel {
        id: Unchanged(session.id),
        time_slot_id: Set(Some(time_slot.id)),
        start_time: Set(time_slot.start_time),
        end_time: Set(time_slot.start_time + length),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

pub async fn set_paypal_order_id(
    db: &impl ConnectionTrait,
    id: Id,
    order_id: String,
) -> Result<Model, Error> {
    let active_model = ActiveModel {
        id: Unchanged(id),
        paypal_order_id: Set(Some(order_id)),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

pub async fn set_payment_status(
    db: &impl ConnectionTrait,
    id: Id,
    payment_status: PaymentStatus,
) -> Result<Model, Error> {
    info!("Session {id} payment status is now {payment_status}");
    let active_model = ActiveModel {
        id: Unchanged(id),
        payment_status: Set(payment_status),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, id: Id) -> Result<(), Error> {
    Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn session_model() -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            coach_id: Id::new_v4(),
            user_id: Id::new_v4(),
            booking_type_id: Id::new_v4(),
            time_slot_id: Some(Id::new_v4()),
            discount_id: None,
            start_time: (now + Duration::days(1)).into(),
            end_time: (now + Duration::days(1) + Duration::minutes(45)).into(),
            status: SessionStatus::Scheduled,
            price_cents: 5000,
            payment_status: PaymentStatus::Pending,
            paypal_order_id: None,
            notes: None,
            meeting_url: None,
            cancellation_reason: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_by_filters_by_status_and_orders_latest_first() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let user_id = Id::new_v4();
        let mut query_filter_map = QueryFilterMap::new();
        query_filter_map.insert("user_id".to_string(), Some(user_id.into()));
        query_filter_map.insert(
            "status".to_string(),
            Some(SessionStatus::Confirmed.into()),
        );
        find_by(&db, query_filter_map).await?;

        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.contains(r#""sessions"."user_id" = $"#));
        assert!(sql.contains(r#""sessions"."status" = CAST($"#));
        assert!(sql.ends_with(r#"ORDER BY "sessions"."start_time" DESC"#));
        Ok(())
    }

    #[tokio::test]
    async fn reschedule_keeps_the_session_length() -> Result<(), Error> {
        let session = session_model();
        let now = Utc::now();
        let new_slot = time_slots::Model {
            id: Id::new_v4(),
            coach_id: session.coach_id,
            start_time: (now + Duration::days(3)).into(),
            end_time: (now + Duration::days(3) + Duration::hours(1)).into(),
            is_available: true,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let mut moved = session.clone();
        moved.time_slot_id = Some(new_slot.id);
        moved.start_time = new_slot.start_time;
        moved.end_time = new_slot.start_time + Duration::minutes(45);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![moved.clone()]])
            .into_connection();

        let result = reschedule(&db, &session, &new_slot).await?;
        assert_eq!(result.time_slot_id, Some(new_slot.id));

        let log = db.into_transaction_log();
        let values = log[0].statements()[0]
            .values
            .as_ref()
            .map(|values| values.0.clone())
            .unwrap_or_default();
        let expected_end: DateTimeWithTimeZone = new_slot.start_time + Duration::minutes(45);
        assert!(values.contains(&expected_end.into()));
        Ok(())
    }

    #[tokio::test]
    async fn lock_by_id_selects_for_update() -> Result<(), Error> {
        let session = session_model();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![session.clone()]])
            .into_connection();

        let locked = lock_by_id(&db, session.id).await?;
        assert_eq!(locked.id, session.id);

        let log = db.into_transaction_log();
        assert!(log[0].statements()[0].sql.ends_with("FOR UPDATE"));
        Ok(())
    }

    #[tokio::test]
    async fn cancel_records_the_reason() -> Result<(), Error> {
        let mut session = session_model();
        session.status = SessionStatus::Cancelled;
        session.cancellation_reason = Some("Sick".to_string());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![session.clone()]])
            .into_connection();

        let result = cancel(&db, session.id, Some("Sick".to_string())).await?;

        assert_eq!(result.status, SessionStatus::Cancelled);
        assert_eq!(result.cancellation_reason.as_deref(), Some("Sick"));
        Ok(())
    }
}
