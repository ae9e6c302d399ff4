//! Booking, rescheduling and cancelling coaching sessions.

use crate::account::Account;
use crate::discount;
use crate::error::Error;
use crate::notification;
use crate::notification_kind::NotificationKind;
use crate::payment_status::PaymentStatus;
use crate::session_status::SessionStatus;
use crate::sessions::Model;
use crate::{time_slots, users, Id, IntoQueryFilterMap, IntoUpdateMap, QueryFilterMap, UpdateMap};
use chrono::{DateTime, Duration, Utc};
use entity_api::{booking_type, coach, session, time_slot};
use events::{DomainEvent, EventPublisher, Recipient};
use log::*;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

#[derive(Debug, Clone)]
pub struct NewSession {
    pub coach_id: Id,
    pub booking_type_id: Id,
    pub time_slot_id: Id,
    pub discount_code: Option<String>,
    pub notes: Option<String>,
}

/// Coach-editable fields. Cancelling goes through [`cancel`].
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub notes: Option<Option<String>>,
    pub meeting_url: Option<Option<String>>,
    pub status: Option<SessionStatus>,
}

impl IntoUpdateMap for SessionUpdate {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        update_map.insert_some("notes", self.notes);
        update_map.insert_some("meeting_url", self.meeting_url);
        update_map.insert_some("status", self.status);
        update_map
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub status: Option<SessionStatus>,
}

impl IntoQueryFilterMap for SessionFilter {
    fn into_query_filter_map(self) -> QueryFilterMap {
        let mut query_filter_map = QueryFilterMap::new();
        if let Some(status) = self.status {
            query_filter_map.insert("status".to_string(), Some(status.into()));
        }
        query_filter_map
    }
}

/// Books `params.time_slot_id` for `user`. The session row, the slot and the
/// discount usage are written in one transaction.
pub async fn book(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    user: &users::Model,
    params: NewSession,
) -> Result<Model, Error> {
    coach::find_active_by_id(db, params.coach_id).await?;
    let booking_type = booking_type::find_by_id(db, params.booking_type_id).await?;
    if booking_type.coach_id != params.coach_id || !booking_type.is_active {
        debug!(
            "Booking type {} is not bookable with coach {}",
            booking_type.id, params.coach_id
        );
        return Err(Error::not_found());
    }

    let txn = db.begin().await?;

    let slot = time_slot::find_by_id(&txn, params.time_slot_id).await?;
    ensure_bookable(&slot, params.coach_id, booking_type.duration_minutes, Utc::now())?;

    let (discount_id, pricing) = match params.discount_code.as_deref() {
        Some(code) if !code.trim().is_empty() => {
            let found = discount::find_redeemable(&txn, params.coach_id, code).await?;
            if !entity_api::discount::redeem(&txn, found.id).await? {
                return Err(Error::validation("Discount code has been fully redeemed"));
            }
            (
                Some(found.id),
                discount::apply(found.kind, found.value, booking_type.price_cents),
            )
        }
        _ => (
            None,
            discount::Pricing {
                original_price_cents: booking_type.price_cents,
                discount_cents: 0,
                final_price_cents: booking_type.price_cents,
            },
        ),
    };

    claim_slot(&txn, slot.id).await?;

    let now = Utc::now().fixed_offset();
    let booked = session::create(
        &txn,
        Model {
            id: Id::nil(),
            coach_id: params.coach_id,
            user_id: user.id,
            booking_type_id: booking_type.id,
            time_slot_id: Some(slot.id),
            discount_id,
            start_time: slot.start_time,
            end_time: slot.start_time + Duration::minutes(booking_type.duration_minutes.into()),
            status: SessionStatus::Scheduled,
            price_cents: pricing.final_price_cents,
            payment_status: initial_payment_status(pricing.final_price_cents),
            paypal_order_id: None,
            notes: params.notes,
            meeting_url: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    txn.commit().await?;
    info!(
        "User {} booked session {} with coach {}",
        user.id, booked.id, booked.coach_id
    );

    notification::notify_best_effort(
        db,
        event_publisher,
        Recipient::coach(booked.coach_id),
        NotificationKind::SessionBooked,
        "New session booked",
        format!(
            "{} booked {} on {}",
            user.full_name(),
            booking_type.name,
            booked.start_time.to_rfc3339()
        ),
    )
    .await;
    publish_change(event_publisher, &booked).await;

    Ok(booked)
}

/// Cancels a session for either participant and frees its slot.
pub async fn cancel(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    account: &Account,
    id: Id,
    reason: Option<String>,
) -> Result<Model, Error> {
    let existing = find_for_participant(db, account, id).await?;
    if existing.status.is_final() {
        info!("Session {id} is already {}", existing.status);
        return Err(Error::conflict());
    }

    let txn = db.begin().await?;
    let current = session::lock_by_id(&txn, id).await?;
    if current.status.is_final() {
        info!("Session {id} became {} before it could be cancelled", current.status);
        return Err(Error::conflict());
    }
    let cancelled = session::cancel(&txn, id, reason.filter(|r| !r.trim().is_empty())).await?;
    if let Some(time_slot_id) = current.time_slot_id {
        time_slot::release(&txn, time_slot_id).await?;
    }
    txn.commit().await?;
    info!("{} cancelled session {id}", account.recipient());

    notification::notify_best_effort(
        db,
        event_publisher,
        other_party(account, &cancelled),
        NotificationKind::SessionCancelled,
        "Session cancelled",
        format!(
            "{} cancelled the session on {}",
            account.full_name(),
            cancelled.start_time.to_rfc3339()
        ),
    )
    .await;
    publish_change(event_publisher, &cancelled).await;

    Ok(cancelled)
}

/// Moves a session onto another slot of the same coach.
pub async fn reschedule(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    account: &Account,
    id: Id,
    time_slot_id: Id,
) -> Result<Model, Error> {
    let existing = find_for_participant(db, account, id).await?;
    if existing.status.is_final() {
        return Err(Error::conflict());
    }
    if existing.time_slot_id == Some(time_slot_id) {
        return Ok(existing);
    }

    let txn = db.begin().await?;
    let current = session::lock_by_id(&txn, id).await?;
    if current.status.is_final() {
        info!("Session {id} became {} before it could be moved", current.status);
        return Err(Error::conflict());
    }
    if current.time_slot_id == Some(time_slot_id) {
        txn.commit().await?;
        return Ok(current);
    }

    let length_minutes = (current.end_time - current.start_time).num_minutes();
    let slot = time_slot::find_by_id(&txn, time_slot_id).await?;
    ensure_bookable(
        &slot,
        current.coach_id,
        i32::try_from(length_minutes).unwrap_or(i32::MAX),
        Utc::now(),
    )?;
    claim_slot(&txn, slot.id).await?;
    if let Some(previous_slot_id) = current.time_slot_id {
        time_slot::release(&txn, previous_slot_id).await?;
    }
    let rescheduled = session::reschedule(&txn, &current, &slot).await?;
    txn.commit().await?;
    info!(
        "{} moved session {id} to time slot {time_slot_id}",
        account.recipient()
    );

    notification::notify_best_effort(
        db,
        event_publisher,
        other_party(account, &rescheduled),
        NotificationKind::SessionRescheduled,
        "Session rescheduled",
        format!(
            "{} moved the session to {}",
            account.full_name(),
            rescheduled.start_time.to_rfc3339()
        ),
    )
    .await;
    publish_change(event_publisher, &rescheduled).await;

    Ok(rescheduled)
}

/// Coach updates of notes, meeting url and forward status changes.
pub async fn update(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    coach_id: Id,
    id: Id,
    params: SessionUpdate,
) -> Result<Model, Error> {
    let existing = find_owned(db, coach_id, id).await?;
    if let Some(next) = params.status {
        ensure_transition(existing.status, next)?;
    }
    let status_changed = params.status.is_some_and(|next| next != existing.status);

    let updated = session::update(db, id, params.into_update_map()).await?;

    if status_changed {
        notification::notify_best_effort(
            db,
            event_publisher,
            Recipient::user(updated.user_id),
            NotificationKind::SessionUpdated,
            "Session updated",
            format!(
                "Your session on {} is now {}",
                updated.start_time.to_rfc3339(),
                updated.status
            ),
        )
        .await;
    }
    publish_change(event_publisher, &updated).await;

    Ok(updated)
}

/// Removes a cancelled session for good.
pub async fn delete(db: &DatabaseConnection, coach_id: Id, id: Id) -> Result<(), Error> {
    let existing = find_owned(db, coach_id, id).await?;
    if existing.status != SessionStatus::Cancelled {
        info!("Refusing to delete session {id} in status {}", existing.status);
        return Err(Error::conflict());
    }
    Ok(session::delete(db, id).await?)
}

/// Sessions the account takes part in, latest start first.
pub async fn find_by_account(
    db: &DatabaseConnection,
    account: &Account,
    filter: SessionFilter,
) -> Result<Vec<Model>, Error> {
    let mut query_filter_map = filter.into_query_filter_map();
    let owner_column = match account {
        Account::User(_) => "user_id",
        Account::Coach(_) => "coach_id",
    };
    query_filter_map.insert(owner_column.to_string(), Some(account.id().into()));
    Ok(session::find_by(db, query_filter_map).await?)
}

pub async fn find_for_participant(
    db: &DatabaseConnection,
    account: &Account,
    id: Id,
) -> Result<Model, Error> {
    let found = session::find_by_id(db, id).await?;
    if !is_participant(&found, account) {
        warn!("{} attempted to access session {id}", account.recipient());
        return Err(Error::forbidden());
    }
    Ok(found)
}

async fn find_owned(db: &DatabaseConnection, coach_id: Id, id: Id) -> Result<Model, Error> {
    let found = session::find_by_id(db, id).await?;
    if found.coach_id != coach_id {
        warn!("Coach {coach_id} attempted to manage session {id} they do not own");
        return Err(Error::forbidden());
    }
    Ok(found)
}

/// A slot can take a booking of `duration_minutes` for `coach_id` at `now`.
fn ensure_bookable(
    slot: &time_slots::Model,
    coach_id: Id,
    duration_minutes: i32,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    if slot.coach_id != coach_id {
        return Err(Error::not_found());
    }
    if !slot.is_available {
        info!("Time slot {} is already booked", slot.id);
        return Err(Error::conflict());
    }
    if slot.start_time <= now {
        return Err(Error::validation("Time slot has already started"));
    }
    if slot.duration_minutes() < i64::from(duration_minutes) {
        return Err(Error::validation(
            "Time slot is too short for this booking type",
        ));
    }
    Ok(())
}

/// Takes `time_slot_id` inside the booking transaction. A concurrent booking
/// that got there first turns into a conflict.
async fn claim_slot(txn: &impl ConnectionTrait, time_slot_id: Id) -> Result<(), Error> {
    if !time_slot::claim(txn, time_slot_id).await? {
        info!("Time slot {time_slot_id} was booked concurrently");
        return Err(Error::conflict());
    }
    Ok(())
}

fn ensure_transition(current: SessionStatus, next: SessionStatus) -> Result<(), Error> {
    if next == SessionStatus::Cancelled || !current.can_transition_to(next) {
        info!("Rejected session status change {current} -> {next}");
        return Err(Error::conflict());
    }
    Ok(())
}

fn initial_payment_status(price_cents: i64) -> PaymentStatus {
    if price_cents == 0 {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Pending
    }
}

fn is_participant(session: &Model, account: &Account) -> bool {
    match account {
        Account::User(user) => session.user_id == user.id,
        Account::Coach(coach) => session.coach_id == coach.id,
    }
}

fn other_party(account: &Account, session: &Model) -> Recipient {
    match account {
        Account::User(_) => Recipient::coach(session.coach_id),
        Account::Coach(_) => Recipient::user(session.user_id),
    }
}

pub(crate) async fn publish_change(event_publisher: &EventPublisher, session: &Model) {
    match serde_json::to_value(session) {
        Ok(value) => {
            event_publisher
                .publish(DomainEvent::SessionChanged {
                    session_id: session.id,
                    session: value,
                    notify: vec![
                        Recipient::coach(session.coach_id),
                        Recipient::user(session.user_id),
                    ],
                })
                .await
        }
        Err(e) => warn!("Failed to serialize session {}: {e}", session.id),
    }
}
