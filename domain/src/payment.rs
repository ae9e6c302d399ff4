//! Paying for sessions through PayPal checkout orders.

use crate::error::Error;
use crate::gateway::paypal::PayPalClient;
use crate::notification_kind::NotificationKind;
use crate::payment_status::PaymentStatus;
use crate::session_status::SessionStatus;
use crate::sessions::Model;
use crate::{notification, session as session_domain, users, Id};
use entity_api::{coach, session};
use events::{EventPublisher, Recipient};
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use service::config::Config;

/// Outcome of starting a payment. Free sessions are settled immediately and
/// carry no PayPal order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentOrder {
    pub session_id: Id,
    pub order_id: Option<String>,
    pub approval_url: Option<String>,
    pub payment_status: PaymentStatus,
}

pub async fn create_paypal_order(
    db: &DatabaseConnection,
    config: &Config,
    user: &users::Model,
    session_id: Id,
) -> Result<PaymentOrder, Error> {
    let existing = find_payable(db, user, session_id).await?;

    if existing.price_cents == 0 {
        let settled = session::set_payment_status(db, session_id, PaymentStatus::Paid).await?;
        return Ok(PaymentOrder {
            session_id,
            order_id: None,
            approval_url: None,
            payment_status: settled.payment_status,
        });
    }

    let coach = coach::find_by_id(db, existing.coach_id).await?;
    let client = PayPalClient::new(config)?;
    let order = client
        .create_order(session_id, existing.price_cents, &coach.currency)
        .await?;
    let approval_url = order.approval_url().map(str::to_string);

    let updated = session::set_paypal_order_id(db, session_id, order.id.clone()).await?;
    info!("Session {session_id} awaits payment of PayPal order {}", order.id);

    Ok(PaymentOrder {
        session_id,
        order_id: Some(order.id),
        approval_url,
        payment_status: updated.payment_status,
    })
}

/// Captures an approved order and records the result on its session.
pub async fn capture_paypal_order(
    db: &DatabaseConnection,
    config: &Config,
    event_publisher: &EventPublisher,
    user: &users::Model,
    order_id: &str,
) -> Result<Model, Error> {
    let existing = session::find_by_paypal_order_id(db, order_id)
        .await?
        .ok_or_else(|| {
            debug!("No session for PayPal order {order_id}");
            Error::not_found()
        })?;
    if existing.user_id != user.id {
        warn!("User {} attempted to capture order {order_id}", user.id);
        return Err(Error::forbidden());
    }
    if existing.payment_status == PaymentStatus::Paid {
        return Ok(existing);
    }
    if existing.status == SessionStatus::Cancelled {
        info!("Refusing to capture order {order_id} for cancelled session {}", existing.id);
        return Err(Error::validation("Cancelled sessions cannot be paid"));
    }

    let client = PayPalClient::new(config)?;
    let order = client.capture_order(order_id).await?;
    let payment_status = if order.is_completed() {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Failed
    };

    let updated = session::set_payment_status(db, existing.id, payment_status).await?;

    if payment_status == PaymentStatus::Paid {
        notification::notify_best_effort(
            db,
            event_publisher,
            Recipient::coach(updated.coach_id),
            NotificationKind::PaymentReceived,
            "Payment received",
            format!(
                "{} paid for the session on {}",
                user.full_name(),
                updated.start_time.to_rfc3339()
            ),
        )
        .await;
    }
    session_domain::publish_change(event_publisher, &updated).await;

    Ok(updated)
}

async fn find_payable(
    db: &DatabaseConnection,
    user: &users::Model,
    session_id: Id,
) -> Result<Model, Error> {
    let existing = session::find_by_id(db, session_id).await?;
    if existing.user_id != user.id {
        warn!("User {} attempted to pay for session {session_id}", user.id);
        return Err(Error::forbidden());
    }
    ensure_payable(&existing)?;
    Ok(existing)
}

fn ensure_payable(session: &Model) -> Result<(), Error> {
    if session.status == SessionStatus::Cancelled {
        return Err(Error::validation("Cancelled sessions cannot be paid"));
    }
    if matches!(
        session.payment_status,
        PaymentStatus::Paid | PaymentStatus::Refunded
    ) {
        info!("Session {} is already {}", session.id, session.payment_status);
        return Err(Error::conflict());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn session_model(status: SessionStatus, payment_status: PaymentStatus) -> Model {
        let start = Utc::now() + Duration::days(2);
        Model {
            id: Id::new_v4(),
            coach_id: Id::new_v4(),
            user_id: Id::new_v4(),
            booking_type_id: Id::new_v4(),
            time_slot_id: None,
            discount_id: None,
            start_time: start.fixed_offset(),
            end_time: (start + Duration::minutes(30)).fixed_offset(),
            status,
            price_cents: 12000,
            payment_status,
            paypal_order_id: None,
            notes: None,
            meeting_url: None,
            cancellation_reason: None,
            created_at: Utc::now().fixed_offset(),
            updated_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn pending_and_failed_payments_can_be_retried() {
        assert!(ensure_payable(&session_model(SessionStatus::Scheduled, PaymentStatus::Pending)).is_ok());
        assert!(ensure_payable(&session_model(SessionStatus::Confirmed, PaymentStatus::Failed)).is_ok());
    }

    #[test]
    fn paid_sessions_conflict_and_cancelled_ones_are_rejected() {
        let paid = ensure_payable(&session_model(SessionStatus::Scheduled, PaymentStatus::Paid));
        assert_eq!(paid.unwrap_err().error_kind, Error::conflict().error_kind);

        let cancelled =
            ensure_payable(&session_model(SessionStatus::Cancelled, PaymentStatus::Pending));
        assert!(cancelled.is_err());
    }

    #[cfg(feature = "mock")]
    mod mock_tests {
        use super::*;
        use crate::account::test_support;
        use clap::Parser;
        use mockito::Server;
        use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

        #[tokio::test]
        async fn free_sessions_are_marked_paid_without_paypal() -> Result<(), Error> {
            let user = test_support::user();
            let mut free = session_model(SessionStatus::Scheduled, PaymentStatus::Pending);
            free.user_id = user.id;
            free.price_cents = 0;
            let mut paid = free.clone();
            paid.payment_status = PaymentStatus::Paid;

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![free.clone()], vec![paid]])
                .into_connection();
            let config = Config::parse_from(["booking_platform_rs"]);

            let order = create_paypal_order(&db, &config, &user, free.id).await?;

            assert_eq!(order.order_id, None);
            assert_eq!(order.payment_status, PaymentStatus::Paid);
            Ok(())
        }

        #[tokio::test]
        async fn orders_of_cancelled_sessions_are_not_captured() {
            let mut server = Server::new_async().await;
            let capture = server
                .mock("POST", "/v2/checkout/orders/ORDER-7/capture")
                .expect(0)
                .create_async()
                .await;

            let user = test_support::user();
            let mut cancelled = session_model(SessionStatus::Cancelled, PaymentStatus::Pending);
            cancelled.user_id = user.id;
            cancelled.paypal_order_id = Some("ORDER-7".to_string());

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![cancelled]])
                .into_connection();
            let config = Config::parse_from(["booking_platform_rs"])
                .set_paypal_base_url(server.url())
                .set_paypal_credentials("client".to_string(), "secret".to_string());

            let result =
                capture_paypal_order(&db, &config, &EventPublisher::new(), &user, "ORDER-7").await;

            assert_eq!(
                result.unwrap_err().error_kind,
                Error::validation("Cancelled sessions cannot be paid").error_kind
            );
            capture.assert_async().await;
        }

        #[tokio::test]
        async fn a_failing_notification_does_not_undo_a_capture() -> Result<(), Error> {
            let mut server = Server::new_async().await;
            server
                .mock("POST", "/v1/oauth2/token")
                .with_status(200)
                .with_body(r#"{"access_token":"token-123"}"#)
                .create_async()
                .await;
            server
                .mock("POST", "/v2/checkout/orders/ORDER-8/capture")
                .with_status(201)
                .with_body(r#"{"id":"ORDER-8","status":"COMPLETED"}"#)
                .create_async()
                .await;

            let user = test_support::user();
            let mut pending = session_model(SessionStatus::Scheduled, PaymentStatus::Pending);
            pending.user_id = user.id;
            pending.paypal_order_id = Some("ORDER-8".to_string());
            let mut paid = pending.clone();
            paid.payment_status = PaymentStatus::Paid;

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![pending], vec![paid]])
                .append_query_errors(vec![DbErr::Custom("notifications unavailable".to_string())])
                .into_connection();
            let config = Config::parse_from(["booking_platform_rs"])
                .set_paypal_base_url(server.url())
                .set_paypal_credentials("client".to_string(), "secret".to_string());

            let captured =
                capture_paypal_order(&db, &config, &EventPublisher::new(), &user, "ORDER-8")
                    .await?;

            assert_eq!(captured.payment_status, PaymentStatus::Paid);
            Ok(())
        }

        #[tokio::test]
        async fn failed_captures_mark_the_session_failed() -> Result<(), Error> {
            let mut server = Server::new_async().await;
            server
                .mock("POST", "/v1/oauth2/token")
                .with_status(200)
                .with_body(r#"{"access_token":"token-123"}"#)
                .create_async()
                .await;
            server
                .mock("POST", "/v2/checkout/orders/ORDER-9/capture")
                .with_status(201)
                .with_body(r#"{"id":"ORDER-9","status":"PAYER_ACTION_REQUIRED"}"#)
                .create_async()
                .await;

            let user = test_support::user();
            let mut pending = session_model(SessionStatus::Scheduled, PaymentStatus::Pending);
            pending.user_id = user.id;
            pending.paypal_order_id = Some("ORDER-9".to_string());
            let mut failed = pending.clone();
            failed.payment_status = PaymentStatus::Failed;

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![pending], vec![failed]])
                .into_connection();
            let config = Config::parse_from(["booking_platform_rs"])
                .set_paypal_base_url(server.url())
                .set_paypal_credentials("client".to_string(), "secret".to_string());

            let captured =
                capture_paypal_order(&db, &config, &EventPublisher::new(), &user, "ORDER-9")
                    .await?;

            assert_eq!(captured.payment_status, PaymentStatus::Failed);
            Ok(())
        }
    }
}
