//! Direct messages between a user and a coach.

use crate::account::Account;
use crate::account_type::AccountType;
use crate::error::Error;
use crate::messages::Model;
use crate::notification_kind::NotificationKind;
use crate::{notification, Id};
use chrono::Utc;
use entity_api::{coach, message, user};
use events::{DomainEvent, EventPublisher};
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::HashMap;

pub const MAX_BODY_LENGTH: usize = 5000;
const PREVIEW_LENGTH: usize = 120;

/// Latest state of a conversation with one counterpart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSummary {
    pub counterpart_id: Id,
    pub last_message: Model,
    pub unread_count: u64,
}

/// Sends `body` from `account` to its counterpart: a coach when a user sends,
/// a user when a coach sends.
pub async fn send(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    account: &Account,
    counterpart_id: Id,
    body: &str,
) -> Result<Model, Error> {
    let body = validate_body(body)?;
    let (coach_id, user_id) = pair(account, counterpart_id);

    match account {
        Account::User(_) => {
            coach::find_active_by_id(db, coach_id).await?;
        }
        Account::Coach(_) => {
            let recipient = user::find_by_id(db, user_id).await?;
            if !recipient.is_active {
                return Err(Error::not_found());
            }
        }
    }

    let sent = message::create(
        db,
        Model {
            id: Id::nil(),
            coach_id,
            user_id,
            sender: account.account_type(),
            body,
            read_at: None,
            created_at: Utc::now().fixed_offset(),
        },
    )
    .await?;
    debug!("{} sent message {}", account.recipient(), sent.id);

    let recipient = crate::account::recipient(counterpart_type(account), counterpart_id);
    notification::notify_best_effort(
        db,
        event_publisher,
        recipient,
        NotificationKind::MessageReceived,
        format!("New message from {}", account.full_name()),
        preview(&sent.body),
    )
    .await;

    match serde_json::to_value(&sent) {
        Ok(value) => {
            event_publisher
                .publish(DomainEvent::MessageSent {
                    coach_id,
                    user_id,
                    message: value,
                    notify: vec![recipient],
                })
                .await
        }
        Err(e) => warn!("Failed to serialize message {}: {e}", sent.id),
    }

    Ok(sent)
}

/// Messages between `account` and `counterpart_id`, oldest first.
pub async fn conversation(
    db: &DatabaseConnection,
    account: &Account,
    counterpart_id: Id,
) -> Result<Vec<Model>, Error> {
    let (coach_id, user_id) = pair(account, counterpart_id);
    Ok(message::find_conversation(db, coach_id, user_id).await?)
}

/// One summary per counterpart, most recently active conversation first.
pub async fn conversations(
    db: &DatabaseConnection,
    account: &Account,
) -> Result<Vec<ConversationSummary>, Error> {
    let (latest, unread) = tokio::try_join!(
        message::find_latest_per_counterpart(db, account.account_type(), account.id()),
        message::count_unread_per_counterpart(db, account.account_type(), account.id()),
    )?;
    Ok(summarize(account.account_type(), latest, unread))
}

/// Marks a message read. Only its recipient may do so.
pub async fn mark_read(db: &DatabaseConnection, account: &Account, id: Id) -> Result<Model, Error> {
    let existing = message::find_by_id(db, id).await?;
    if !is_recipient(&existing, account) {
        warn!("{} attempted to mark message {id} as read", account.recipient());
        return Err(Error::forbidden());
    }
    if existing.read_at.is_some() {
        return Ok(existing);
    }
    Ok(message::mark_read(db, id).await?)
}

/// Marks every message of a conversation addressed to `account` as read.
pub async fn mark_conversation_read(
    db: &DatabaseConnection,
    account: &Account,
    counterpart_id: Id,
) -> Result<u64, Error> {
    let (coach_id, user_id) = pair(account, counterpart_id);
    Ok(message::mark_conversation_read(db, coach_id, user_id, account.account_type()).await?)
}

fn validate_body(body: &str) -> Result<String, Error> {
    let body = body.trim();
    let length = body.chars().count();
    if length == 0 || length > MAX_BODY_LENGTH {
        return Err(Error::validation(format!(
            "body must be 1 to {MAX_BODY_LENGTH} characters"
        )));
    }
    Ok(body.to_string())
}

/// (coach_id, user_id) of the conversation between `account` and `counterpart_id`.
fn pair(account: &Account, counterpart_id: Id) -> (Id, Id) {
    match account {
        Account::User(user) => (counterpart_id, user.id),
        Account::Coach(coach) => (coach.id, counterpart_id),
    }
}

fn counterpart_type(account: &Account) -> AccountType {
    match account {
        Account::User(_) => AccountType::Coach,
        Account::Coach(_) => AccountType::User,
    }
}

fn is_recipient(message: &Model, account: &Account) -> bool {
    match account {
        Account::User(user) => message.user_id == user.id && message.sender == AccountType::Coach,
        Account::Coach(coach) => {
            message.coach_id == coach.id && message.sender == AccountType::User
        }
    }
}

/// Joins each conversation's latest message with its unread count, most
/// recently active conversation first.
fn summarize(
    reader: AccountType,
    latest: Vec<Model>,
    unread: Vec<message::UnreadCount>,
) -> Vec<ConversationSummary> {
    let unread: HashMap<Id, i64> = unread
        .into_iter()
        .map(|count| (count.counterpart_id, count.unread_count))
        .collect();

    let mut summaries: Vec<ConversationSummary> = latest
        .into_iter()
        .map(|last_message| {
            let counterpart_id = match reader {
                AccountType::User => last_message.coach_id,
                AccountType::Coach => last_message.user_id,
            };
            ConversationSummary {
                counterpart_id,
                unread_count: unread
                    .get(&counterpart_id)
                    .map_or(0, |count| u64::try_from(*count).unwrap_or(0)),
                last_message,
            }
        })
        .collect();
    summaries.sort_by(|a, b| b.last_message.created_at.cmp(&a.last_message.created_at));
    summaries
}

fn preview(body: &str) -> String {
    if body.chars().count() <= PREVIEW_LENGTH {
        return body.to_string();
    }
    let mut preview: String = body.chars().take(PREVIEW_LENGTH).collect();
    preview.push('…');
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::test_support;
    use chrono::Duration;

    fn message(coach_id: Id, user_id: Id, sender: AccountType, minutes_ago: i64) -> Model {
        Model {
            id: Id::new_v4(),
            coach_id,
            user_id,
            sender,
            body: "Hello".to_string(),
            read_at: None,
            created_at: (Utc::now() - Duration::minutes(minutes_ago)).fixed_offset(),
        }
    }

    #[test]
    fn body_is_trimmed_and_bounded() -> Result<(), Error> {
        assert_eq!(validate_body("  hi  ")?, "hi");
        assert!(validate_body("   ").is_err());
        assert!(validate_body(&"x".repeat(MAX_BODY_LENGTH)).is_ok());
        assert!(validate_body(&"x".repeat(MAX_BODY_LENGTH + 1)).is_err());
        Ok(())
    }

    #[test]
    fn pair_orders_ids_as_coach_then_user() {
        let user = test_support::user();
        let coach = test_support::coach();
        let other = Id::new_v4();

        assert_eq!(pair(&Account::User(user.clone()), other), (other, user.id));
        assert_eq!(pair(&Account::Coach(coach.clone()), other), (coach.id, other));
    }

    #[test]
    fn only_the_receiving_side_is_the_recipient() {
        let user = test_support::user();
        let coach = test_support::coach();
        let from_coach = message(coach.id, user.id, AccountType::Coach, 0);

        assert!(is_recipient(&from_coach, &Account::User(user.clone())));
        assert!(!is_recipient(&from_coach, &Account::Coach(coach)));

        let mut stranger = user;
        stranger.id = Id::new_v4();
        assert!(!is_recipient(&from_coach, &Account::User(stranger)));
    }

    #[test]
    fn summaries_pair_latest_messages_with_unread_counts_newest_first() {
        let coach_id = Id::new_v4();
        let (quiet_user, chatty_user) = (Id::new_v4(), Id::new_v4());
        let older = message(coach_id, quiet_user, AccountType::Coach, 30);
        let newer = message(coach_id, chatty_user, AccountType::User, 1);

        let summaries = summarize(
            AccountType::Coach,
            vec![older.clone(), newer.clone()],
            vec![message::UnreadCount {
                counterpart_id: chatty_user,
                unread_count: 4,
            }],
        );

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].counterpart_id, chatty_user);
        assert_eq!(summaries[0].last_message.id, newer.id);
        assert_eq!(summaries[0].unread_count, 4);
        assert_eq!(summaries[1].counterpart_id, quiet_user);
        assert_eq!(summaries[1].last_message.id, older.id);
        assert_eq!(summaries[1].unread_count, 0);
    }

    #[test]
    fn long_bodies_are_shortened_for_notifications() {
        assert_eq!(preview("short"), "short");
        assert_eq!(preview(&"a".repeat(500)).chars().count(), PREVIEW_LENGTH + 1);
    }
}
