use super::error::{EntityApiErrorKind, Error};
use crate::mutate::{self, UpdateMap};
use chrono::Utc;
use entity::users::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Unchanged, ConnectionTrait, DatabaseConnection,
    IntoActiveModel, Set,
};

/// Inserts a new user. `user_model.password` is expected to be the plain text
/// password; it is hashed before it is stored.
pub async fn create(db: &impl ConnectionTrait, user_model: Model) -> Result<Model, Error> {
    debug!("New User Model to be inserted: {}", user_model.email);

    let now = Utc::now();
    let user_active_model: ActiveModel = ActiveModel {
        email: Set(user_model.email),
        password: Set(generate_hash(user_model.password)),
        first_name: Set(user_model.first_name),
        last_name: Set(user_model.last_name),
        phone: Set(user_model.phone),
        timezone: Set(user_model.timezone),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(user_active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

pub async fn find_by_email(db: &impl ConnectionTrait, email: &str) -> Result<Option<Model>, Error> {
    Ok(Entity::find().filter(Column::Email.eq(email)).one(db).await?)
}

/// Applies a partial update to a user's profile fields.
pub async fn update(db: &DatabaseConnection, id: Id, update_map: UpdateMap) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    debug!("Updating user {id} with {update_map:?}");
    mutate::update::<ActiveModel, Column>(db, existing.into_active_model(), update_map).await
}

/// Stores a new password hash for the user.
pub async fn update_password(
    db: &impl ConnectionTrait,
    id: Id,
    new_password: String,
) -> Result<Model, Error> {
    let active_model = ActiveModel {
        id: Unchanged(id),
        password: Set(generate_hash(new_password)),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

/// Soft deletes the user by flagging it inactive.
pub async fn deactivate(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    let active_model = ActiveModel {
        id: Unchanged(id),
        is_active: Set(false),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

pub async fn verify_password(password_to_verify: &str, password_hash: &str) -> Result<(), Error> {
    match password_auth::verify_password(password_to_verify, password_hash) {
        Ok(_) => Ok(()),
        Err(_) => Err(Error::unauthenticated()),
    }
}

pub fn generate_hash(password: String) -> String {
    password_auth::generate_hash(password)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    fn user_model() -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            email: "ada@example.com".to_string(),
            password: generate_hash("password123".to_string()),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: None,
            timezone: "Europe/London".to_string(),
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn find_by_email_returns_a_single_record() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let user_email = "test@test.com";
        let user = find_by_email(&db, user_email).await?;
        assert!(user.is_none());

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "users"."id", "users"."email", "users"."password", "users"."first_name", "users"."last_name", "users"."phone", "users"."timezone", "users"."is_active", "users"."created_at", "users"."updated_at" FROM "booking_platform"."users" WHERE "users"."email" = $1 LIMIT $2"#,
                [user_email.into(), 1u64.into()]
            )]
        );

        Ok(())
    }

    #[tokio::test]
    async fn find_by_id_returns_not_found_for_missing_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let result = find_by_id(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }

    #[tokio::test]
    async fn create_returns_the_inserted_user() -> Result<(), Error> {
        let user = user_model();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user.clone()]])
            .into_connection();

        let mut new_user = user.clone();
        new_user.password = "password123".to_string();
        let created = create(&db, new_user).await?;

        assert_eq!(created.id, user.id);
        assert!(created.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn deactivate_flags_the_user_inactive() -> Result<(), Error> {
        let mut user = user_model();
        user.is_active = false;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user.clone()]])
            .into_connection();

        let deactivated = deactivate(&db, user.id).await?;

        assert!(!deactivated.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn verify_password_rejects_wrong_password() {
        let hash = generate_hash("correct horse".to_string());

        assert!(verify_password("correct horse", &hash).await.is_ok());
        assert_eq!(
            verify_password("battery staple", &hash)
                .await
                .unwrap_err()
                .error_kind,
            EntityApiErrorKind::RecordUnauthenticated
        );
    }
}
