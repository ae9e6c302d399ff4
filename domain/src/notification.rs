//! In-app notifications. Every stored notification is also pushed to the
//! recipient as a `NotificationCreated` domain event.

use crate::account::Account;
use crate::error::Error;
use crate::notification_kind::NotificationKind;
use crate::notifications::Model;
use crate::Id;
use chrono::Utc;
use entity_api::notification;
use events::{DomainEvent, EventPublisher, Recipient, RecipientKind};
use log::*;
use sea_orm::DatabaseConnection;

/// Stores a notification for `recipient` and publishes it.
pub async fn notify(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    recipient: Recipient,
    kind: NotificationKind,
    title: impl Into<String>,
    body: impl Into<String>,
) -> Result<Model, Error> {
    let (user_id, coach_id) = match recipient.kind {
        RecipientKind::User => (Some(recipient.id), None),
        RecipientKind::Coach => (None, Some(recipient.id)),
    };

    let created = notification::create(
        db,
        Model {
            id: Id::nil(),
            user_id,
            coach_id,
            kind,
            title: title.into(),
            body: body.into(),
            is_read: false,
            created_at: Utc::now().fixed_offset(),
        },
    )
    .await?;

    match serde_json::to_value(&created) {
        Ok(value) => {
            event_publisher
                .publish(DomainEvent::NotificationCreated {
                    recipient,
                    notification: value,
                })
                .await
        }
        Err(e) => warn!("Failed to serialize notification {}: {e}", created.id),
    }

    Ok(created)
}

/// Like [`notify`] for side effects of a change that is already committed: a
/// failure is logged and does not fail the caller.
pub async fn notify_best_effort(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    recipient: Recipient,
    kind: NotificationKind,
    title: impl Into<String>,
    body: impl Into<String>,
) {
    if let Err(e) = notify(db, event_publisher, recipient, kind, title, body).await {
        warn!("Failed to notify {recipient} ({kind:?}): {e}");
    }
}

pub async fn find_by_account(
    db: &DatabaseConnection,
    account: &Account,
    unread_only: bool,
) -> Result<Vec<Model>, Error> {
    Ok(
        notification::find_by_account(db, account.account_type(), account.id(), unread_only)
            .await?,
    )
}

pub async fn mark_read(db: &DatabaseConnection, account: &Account, id: Id) -> Result<Model, Error> {
    find_owned(db, account, id).await?;
    Ok(notification::mark_read(db, id).await?)
}

pub async fn mark_all_read(db: &DatabaseConnection, account: &Account) -> Result<u64, Error> {
    Ok(notification::mark_all_read(db, account.account_type(), account.id()).await?)
}

pub async fn delete(db: &DatabaseConnection, account: &Account, id: Id) -> Result<(), Error> {
    find_owned(db, account, id).await?;
    Ok(notification::delete(db, id).await?)
}

async fn find_owned(db: &DatabaseConnection, account: &Account, id: Id) -> Result<Model, Error> {
    let found = notification::find_by_id(db, id).await?;
    if !is_owner(&found, account) {
        warn!("{} attempted to access notification {id}", account.recipient());
        return Err(Error::forbidden());
    }
    Ok(found)
}

fn is_owner(notification: &Model, account: &Account) -> bool {
    match account {
        Account::User(user) => notification.user_id == Some(user.id),
        Account::Coach(coach) => notification.coach_id == Some(coach.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::test_support;

    fn notification_for(user_id: Option<Id>, coach_id: Option<Id>) -> Model {
        Model {
            id: Id::new_v4(),
            user_id,
            coach_id,
            kind: NotificationKind::SessionBooked,
            title: "Session booked".to_string(),
            body: "A new session was booked".to_string(),
            is_read: false,
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn only_the_addressed_account_owns_a_notification() {
        let user = test_support::user();
        let coach = test_support::coach();
        let for_user = notification_for(Some(user.id), None);

        assert!(is_owner(&for_user, &Account::User(user.clone())));
        assert!(!is_owner(&for_user, &Account::Coach(coach.clone())));

        let mut coach_with_same_id = coach;
        coach_with_same_id.id = user.id;
        assert!(!is_owner(&for_user, &Account::Coach(coach_with_same_id)));
    }

    #[cfg(feature = "mock")]
    mod mock_tests {
        use super::*;
        use async_trait::async_trait;
        use events::EventHandler;
        use sea_orm::{DatabaseBackend, MockDatabase};
        use std::sync::{Arc, Mutex};

        #[derive(Default)]
        struct Recorder {
            events: Mutex<Vec<Recipient>>,
        }

        #[async_trait]
        impl EventHandler for Recorder {
            async fn handle(&self, event: &DomainEvent) {
                self.events.lock().unwrap().extend(event.recipients());
            }
        }

        #[tokio::test]
        async fn notify_stores_and_publishes_to_the_recipient() -> Result<(), Error> {
            let coach_id = Id::new_v4();
            let stored = notification_for(None, Some(coach_id));
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![stored.clone()]])
                .into_connection();
            let recorder = Arc::new(Recorder::default());
            let publisher = EventPublisher::new().with_handler(recorder.clone());

            let created = notify(
                &db,
                &publisher,
                Recipient::coach(coach_id),
                NotificationKind::SessionBooked,
                "Session booked",
                "A new session was booked",
            )
            .await?;

            assert_eq!(created.coach_id, Some(coach_id));
            assert_eq!(
                *recorder.events.lock().unwrap(),
                vec![Recipient::coach(coach_id)]
            );
            Ok(())
        }

        #[tokio::test]
        async fn mark_read_is_forbidden_for_other_accounts() {
            let stored = notification_for(Some(Id::new_v4()), None);
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![stored.clone()]])
                .into_connection();

            let result = mark_read(&db, &Account::User(test_support::user()), stored.id).await;

            assert!(result.is_err());
        }
    }
}
