use super::error::Error;
use chrono::Utc;
use entity::account_type::AccountType;
use entity::messages::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, sea_query::Expr, ActiveValue::Unchanged, DatabaseConnection,
    FromQueryResult, QueryOrder, QuerySelect, Set,
};

pub async fn create(db: &DatabaseConnection, message_model: Model) -> Result<Model, Error> {
    debug!(
        "New Message from {} between coach {} and user {}",
        message_model.sender, message_model.coach_id, message_model.user_id
    );

    let active_model: ActiveModel = ActiveModel {
        coach_id: Set(message_model.coach_id),
        user_id: Set(message_model.user_id),
        sender: Set(message_model.sender),
        body: Set(message_model.body),
        read_at: Set(None),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Messages exchanged between one coach and one user, oldest first.
pub async fn find_conversation(
    db: &DatabaseConnection,
    coach_id: Id,
    user_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::CoachId.eq(coach_id))
        .filter(Column::UserId.eq(user_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Unread messages from one counterpart.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct UnreadCount {
    pub counterpart_id: Id,
    pub unread_count: i64,
}

/// Owner and counterpart columns of `account_type`'s side of a conversation.
fn columns(account_type: AccountType) -> (Column, Column) {
    match account_type {
        AccountType::User => (Column::UserId, Column::CoachId),
        AccountType::Coach => (Column::CoachId, Column::UserId),
    }
}

/// The newest message of each conversation the account takes part in.
pub async fn find_latest_per_counterpart(
    db: &DatabaseConnection,
    account_type: AccountType,
    account_id: Id,
) -> Result<Vec<Model>, Error> {
    let (owner, counterpart) = columns(account_type);
    Ok(Entity::find()
        .distinct_on([counterpart])
        .filter(owner.eq(account_id))
        .order_by_asc(counterpart)
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Unread messages addressed to the account, counted per counterpart.
pub async fn count_unread_per_counterpart(
    db: &DatabaseConnection,
    account_type: AccountType,
    account_id: Id,
) -> Result<Vec<UnreadCount>, Error> {
    let (owner, counterpart) = columns(account_type);
    Ok(Entity::find()
        .select_only()
        .column_as(counterpart, "counterpart_id")
        .column_as(Expr::col(Column::Id).count(), "unread_count")
        .filter(owner.eq(account_id))
        .filter(Column::Sender.ne(account_type))
        .filter(Column::ReadAt.is_null())
        .group_by(counterpart)
        .into_model::<UnreadCount>()
        .all(db)
        .await?)
}

pub async fn mark_read(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    let active_model = ActiveModel {
        id: Unchanged(id),
        read_at: Set(Some(Utc::now().into())),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

/// Marks every unread message of a conversation addressed to `reader` as read.
pub async fn mark_conversation_read(
    db: &DatabaseConnection,
    coach_id: Id,
    user_id: Id,
    reader: AccountType,
) -> Result<u64, Error> {
    let sent_by = match reader {
        AccountType::User => AccountType::Coach,
        AccountType::Coach => AccountType::User,
    };
    let result = Entity::update_many()
        .col_expr(Column::ReadAt, Expr::value(Utc::now().fixed_offset()))
        .filter(Column::CoachId.eq(coach_id))
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Sender.eq(sent_by))
        .filter(Column::ReadAt.is_null())
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn find_conversation_orders_oldest_first() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        find_conversation(&db, Id::new_v4(), Id::new_v4()).await?;

        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.contains(r#""messages"."coach_id" = $1 AND "messages"."user_id" = $2"#));
        assert!(sql.ends_with(r#"ORDER BY "messages"."created_at" ASC"#));
        Ok(())
    }

    #[tokio::test]
    async fn latest_messages_are_picked_per_counterpart_in_sql() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        find_latest_per_counterpart(&db, AccountType::Coach, Id::new_v4()).await?;

        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.starts_with(r#"SELECT DISTINCT ON ("user_id")"#));
        assert!(sql.contains(r#"WHERE "messages"."coach_id" = $1"#));
        assert!(sql.ends_with(
            r#"ORDER BY "messages"."user_id" ASC, "messages"."created_at" DESC"#
        ));
        Ok(())
    }

    #[tokio::test]
    async fn unread_counts_are_grouped_by_counterpart() -> Result<(), Error> {
        let counterpart_id = Id::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![BTreeMap::from([
                ("counterpart_id", Into::<Value>::into(counterpart_id)),
                ("unread_count", Into::<Value>::into(3_i64)),
            ])]])
            .into_connection();

        let counts = count_unread_per_counterpart(&db, AccountType::User, Id::new_v4()).await?;

        assert_eq!(
            counts,
            vec![UnreadCount {
                counterpart_id,
                unread_count: 3
            }]
        );
        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.contains(r#"COUNT("id") AS "unread_count""#));
        assert!(sql.contains(r#""messages"."read_at" IS NULL"#));
        assert!(sql.ends_with(r#"GROUP BY "messages"."coach_id""#));
        Ok(())
    }
}
