use super::error::Error;
use chrono::Utc;
use entity::account_type::AccountType;
use entity::notifications::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, sea_query::Expr, ActiveValue::Unchanged, ConnectionTrait,
    DatabaseConnection, QueryOrder, Set,
};

pub async fn create(db: &impl ConnectionTrait, notification_model: Model) -> Result<Model, Error> {
    debug!(
        "New Notification {:?} for user {:?} / coach {:?}",
        notification_model.kind, notification_model.user_id, notification_model.coach_id
    );

    let active_model: ActiveModel = ActiveModel {
        user_id: Set(notification_model.user_id),
        coach_id: Set(notification_model.coach_id),
        kind: Set(notification_model.kind),
        title: Set(notification_model.title),
        body: Set(notification_model.body),
        is_read: Set(false),
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

/// Notifications of an account, newest first.
pub async fn find_by_account(
    db: &DatabaseConnection,
    account_type: AccountType,
    account_id: Id,
    unread_only: bool,
) -> Result<Vec<Model>, Error> {
    let mut query = Entity::find().filter(owner_column(account_type).eq(account_id));
    if unread_only {
        query = query.filter(Column::IsRead.eq(false));
    }

    Ok(query.order_by_desc(Column::CreatedAt).all(db).await?)
}

pub async fn mark_read(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    let active_model = ActiveModel {
        id: Unchanged(id),
        is_read: Set(true),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

/// Marks every unread notification of an account as read. Returns how many changed.
pub async fn mark_all_read(
    db: &DatabaseConnection,
    account_type: AccountType,
    account_id: Id,
) -> Result<u64, Error> {
    let result = Entity::update_many()
        .col_expr(Column::IsRead, Expr::value(true))
        .filter(owner_column(account_type).eq(account_id))
        .filter(Column::IsRead.eq(false))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub async fn delete(db: &DatabaseConnection, id: Id) -> Result<(), Error> {
    Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}

fn owner_column(account_type: AccountType) -> Column {
    match account_type {
        AccountType::User => Column::UserId,
        AccountType::Coach => Column::CoachId,
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

    #[tokio::test]
    async fn mark_all_read_only_touches_unread_rows_of_the_account() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        let user_id = Id::new_v4();
        let changed = mark_all_read(&db, AccountType::User, user_id).await?;
        assert_eq!(changed, 2);

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"UPDATE "booking_platform"."notifications" SET "is_read" = $1 WHERE "notifications"."user_id" = $2 AND "notifications"."is_read" = $3"#,
                [true.into(), user_id.into(), false.into()]
            )]
        );
        Ok(())
    }

    #[tokio::test]
    async fn find_by_account_with_unread_filter() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        find_by_account(&db, AccountType::Coach, Id::new_v4(), true).await?;

        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.contains(r#""notifications"."coach_id" = $1 AND "notifications"."is_read" = $2"#));
        assert!(sql.ends_with(r#"ORDER BY "notifications"."created_at" DESC"#));
        Ok(())
    }
}
