use super::error::Error;
use crate::mutate::{self, UpdateMap};
use crate::user::generate_hash;
use chrono::Utc;
use entity::coaches::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, ActiveValue::Unchanged, ConnectionTrait, DatabaseConnection,
    IntoActiveModel, QueryOrder, Set,
};

pub const DEFAULT_CURRENCY: &str = "USD";

/// Inserts a new coach. `coach_model.password` is the plain text password and
/// is hashed before it is stored.
pub async fn create(db: &impl ConnectionTrait, coach_model: Model) -> Result<Model, Error> {
    debug!("New Coach Model to be inserted: {}", coach_model.email);

    let now = Utc::now();
    let currency = if coach_model.currency.is_empty() {
        DEFAULT_CURRENCY.to_string()
    } else {
        coach_model.currency.to_uppercase()
    };

    let coach_active_model: ActiveModel = ActiveModel {
        email: Set(coach_model.email),
        password: Set(generate_hash(coach_model.password)),
        first_name: Set(coach_model.first_name),
        last_name: Set(coach_model.last_name),
        bio: Set(coach_model.bio),
        headline: Set(coach_model.headline),
        timezone: Set(coach_model.timezone),
        currency: Set(currency),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(coach_active_model.insert(db).await?)
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

/// Public directory lookup; inactive coaches are reported as missing.
pub async fn find_active_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .filter(Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// All active coaches ordered by name.
pub async fn find_active(db: &impl ConnectionTrait) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::IsActive.eq(true))
        .order_by_asc(Column::LastName)
        .order_by_asc(Column::FirstName)
        .all(db)
        .await?)
}

pub async fn update(db: &DatabaseConnection, id: Id, update_map: UpdateMap) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    debug!("Updating coach {id} with {update_map:?}");
    mutate::update::<ActiveModel, Column>(db, existing.into_active_model(), update_map).await
}

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

/// Soft deletes the coach by flagging it inactive.
pub async fn deactivate(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    let active_model = ActiveModel {
        id: Unchanged(id),
        is_active: Set(false),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(active_model.update(db).await?)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    fn coach_model() -> Model {
        let now = Utc::now();
        Model {
            id: Id::new_v4(),
            email: "grace@example.com".to_string(),
            password: "password123".to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            bio: Some("Compilers and leadership".to_string()),
            headline: None,
            timezone: "America/New_York".to_string(),
            currency: "usd".to_string(),
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_the_inserted_coach() -> Result<(), Error> {
        let coach = coach_model();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![coach.clone()]])
            .into_connection();

        let created = create(&db, coach.clone()).await?;

        assert_eq!(created.id, coach.id);
        Ok(())
    }

    #[tokio::test]
    async fn find_active_only_selects_active_coaches() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![coach_model()]])
            .into_connection();

        let coaches = find_active(&db).await?;
        assert_eq!(coaches.len(), 1);

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "coaches"."id", "coaches"."email", "coaches"."password", "coaches"."first_name", "coaches"."last_name", "coaches"."bio", "coaches"."headline", "coaches"."timezone", "coaches"."currency", "coaches"."is_active", "coaches"."created_at", "coaches"."updated_at" FROM "booking_platform"."coaches" WHERE "coaches"."is_active" = $1 ORDER BY "coaches"."last_name" ASC, "coaches"."first_name" ASC"#,
                [true.into()]
            )]
        );

        Ok(())
    }

    #[tokio::test]
    async fn find_active_by_id_returns_not_found_for_inactive_coach() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let result = find_active_by_id(&db, Id::new_v4()).await;

        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotFound
        );
    }
}
