use super::error::Error;
use chrono::Utc;
use entity::account_type::AccountType;
use entity::refresh_tokens::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ConnectionTrait, Set};

/// Stores a refresh token for exactly one account. `jti` becomes the row id.
pub async fn create(
    db: &impl ConnectionTrait,
    jti: Id,
    account_type: AccountType,
    account_id: Id,
    token_hash: String,
    expires_at: DateTimeWithTimeZone,
) -> Result<Model, Error> {
    debug!("Storing refresh token {jti} for {account_type}:{account_id}");

    let (user_id, coach_id) = owner_columns(account_type, account_id);
    let active_model = ActiveModel {
        id: Set(jti),
        user_id: Set(user_id),
        coach_id: Set(coach_id),
        token_hash: Set(token_hash),
        expires_at: Set(expires_at),
        created_at: Set(Utc::now().into()),
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, jti: Id) -> Result<Option<Model>, Error> {
    Ok(Entity::find_by_id(jti).one(db).await?)
}

/// Deletes a single token. Returns whether a row was removed.
pub async fn delete_by_id(db: &impl ConnectionTrait, jti: Id) -> Result<bool, Error> {
    let result = Entity::delete_by_id(jti).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Revokes every refresh token held by an account. Returns the number removed.
pub async fn delete_all_for_account(
    db: &impl ConnectionTrait,
    account_type: AccountType,
    account_id: Id,
) -> Result<u64, Error> {
    let column = match account_type {
        AccountType::User => Column::UserId,
        AccountType::Coach => Column::CoachId,
    };
    let result = Entity::delete_many()
        .filter(column.eq(account_id))
        .exec(db)
        .await?;
    info!(
        "Revoked {} refresh token(s) for {account_type}:{account_id}",
        result.rows_affected
    );
    Ok(result.rows_affected)
}

/// Which account owns `token`, or an error if the row violates the single-owner rule.
pub fn owner(token: &Model) -> Result<(AccountType, Id), Error> {
    match (token.user_id, token.coach_id) {
        (Some(user_id), None) => Ok((AccountType::User, user_id)),
        (None, Some(coach_id)) => Ok((AccountType::Coach, coach_id)),
        _ => Err(Error::invalid_record()),
    }
}

fn owner_columns(account_type: AccountType, account_id: Id) -> (Option<Id>, Option<Id>) {
    match account_type {
        AccountType::User => (Some(account_id), None),
        AccountType::Coach => (None, Some(account_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(user_id: Option<Id>, coach_id: Option<Id>) -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            user_id,
            coach_id,
            token_hash: "hash".to_string(),
            expires_at: now.into(),
            created_at: now.into(),
        }
    }

    #[test]
    fn owner_columns_set_exactly_one_owner() {
        let id = Id::new_v4();
        assert_eq!(owner_columns(AccountType::User, id), (Some(id), None));
        assert_eq!(owner_columns(AccountType::Coach, id), (None, Some(id)));
    }

    #[test]
    fn owner_rejects_rows_with_zero_or_two_owners() {
        let id = Id::new_v4();
        assert_eq!(
            owner(&token(Some(id), None)).unwrap(),
            (AccountType::User, id)
        );
        assert!(owner(&token(None, None)).is_err());
        assert!(owner(&token(Some(id), Some(id))).is_err());
    }

    #[cfg(feature = "mock")]
    #[tokio::test]
    async fn delete_all_for_account_filters_on_the_owner_column() -> Result<(), Error> {
        use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Transaction};

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            }])
            .into_connection();

        let coach_id = Id::new_v4();
        let removed = delete_all_for_account(&db, AccountType::Coach, coach_id).await?;
        assert_eq!(removed, 3);

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"DELETE FROM "booking_platform"."refresh_tokens" WHERE "refresh_tokens"."coach_id" = $1"#,
                [coach_id.into()]
            )]
        );
        Ok(())
    }
}
