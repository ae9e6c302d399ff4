use super::error::Error;
use crate::mutate::{self, UpdateMap};
use chrono::Utc;
use entity::custom_services::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, Condition, DatabaseConnection, IntoActiveModel, QueryOrder, Set,
};

pub async fn create(db: &DatabaseConnection, custom_service_model: Model) -> Result<Model, Error> {
    debug!("New Custom Service Model to be inserted: {custom_service_model:?}");

    let now = Utc::now();
    let active_model: ActiveModel = ActiveModel {
        coach_id: Set(custom_service_model.coach_id),
        user_id: Set(custom_service_model.user_id),
        name: Set(custom_service_model.name),
        description: Set(custom_service_model.description),
        price_cents: Set(custom_service_model.price_cents),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
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

/// Every custom service of a coach, including inactive and private ones.
pub async fn find_by_coach(db: &DatabaseConnection, coach_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::CoachId.eq(coach_id))
        .order_by_asc(Column::Name)
        .all(db)
        .await?)
}

/// Active services of a coach a given user may see: public ones plus those
/// addressed to that user.
pub async fn find_visible_to_user(
    db: &DatabaseConnection,
    coach_id: Id,
    user_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::CoachId.eq(coach_id))
        .filter(Column::IsActive.eq(true))
        .filter(
            Condition::any()
                .add(Column::UserId.is_null())
                .add(Column::UserId.eq(user_id)),
        )
        .order_by_asc(Column::Name)
        .all(db)
        .await?)
}

pub async fn update(db: &DatabaseConnection, id: Id, update_map: UpdateMap) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;
    mutate::update::<ActiveModel, Column>(db, existing.into_active_model(), update_map).await
}

pub async fn deactivate(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    let mut update_map = UpdateMap::new();
    update_map.insert_some("is_active", Some(false));
    update(db, id, update_map).await
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};

    #[tokio::test]
    async fn find_visible_to_user_includes_public_and_private_offers() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let coach_id = Id::new_v4();
        let user_id = Id::new_v4();
        find_visible_to_user(&db, coach_id, user_id).await?;

        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"SELECT "custom_services"."id", "custom_services"."coach_id", "custom_services"."user_id", "custom_services"."name", "custom_services"."description", "custom_services"."price_cents", "custom_services"."is_active", "custom_services"."created_at", "custom_services"."updated_at" FROM "booking_platform"."custom_services" WHERE "custom_services"."coach_id" = $1 AND "custom_services"."is_active" = $2 AND ("custom_services"."user_id" IS NULL OR "custom_services"."user_id" = $3) ORDER BY "custom_services"."name" ASC"#,
                [coach_id.into(), true.into(), user_id.into()]
            )]
        );
        Ok(())
    }

    #[tokio::test]
    async fn deactivate_soft_deletes() -> Result<(), Error> {
        let now = Utc::now();
        let service = Model {
            id: Id::new_v4(),
            coach_id: Id::new_v4(),
            user_id: None,
            name: "Résumé review".to_string(),
            description: None,
            price_cents: 7500,
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let mut inactive = service.clone();
        inactive.is_active = false;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![service.clone()]])
            .append_query_results(vec![vec![inactive]])
            .into_connection();

        let result = deactivate(&db, service.id).await?;

        assert!(!result.is_active);
        Ok(())
    }
}
