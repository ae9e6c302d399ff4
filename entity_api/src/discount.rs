use super::error::Error;
use crate::mutate::{self, UpdateMap};
use chrono::Utc;
use entity::discounts::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{
    entity::prelude::*, sea_query::Expr, ConnectionTrait, DatabaseConnection, IntoActiveModel,
    QueryOrder, Set,
};

/// Inserts a new discount. The code is stored upper-cased.
pub async fn create(db: &DatabaseConnection, discount_model: Model) -> Result<Model, Error> {
    debug!("New Discount Model to be inserted: {discount_model:?}");

    let now = Utc::now();
    let active_model: ActiveModel = ActiveModel {
        coach_id: Set(discount_model.coach_id),
        code: Set(discount_model.code.to_uppercase()),
        kind: Set(discount_model.kind),
        value: Set(discount_model.value),
        max_uses: Set(discount_model.max_uses),
        used_count: Set(0),
        expires_at: Set(discount_model.expires_at),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

pub async fn find_by_coach(db: &DatabaseConnection, coach_id: Id) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::CoachId.eq(coach_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Looks a code up case-insensitively within one coach's discounts.
pub async fn find_by_coach_and_code(
    db: &impl ConnectionTrait,
    coach_id: Id,
    code: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::CoachId.eq(coach_id))
        .filter(Column::Code.eq(code.trim().to_uppercase()))
        .one(db)
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

/// Counts one more use of an active discount, unless it already reached
/// `max_uses`. Returns `false` when nothing was counted.
pub async fn redeem(db: &impl ConnectionTrait, id: Id) -> Result<bool, Error> {
    let result = Entity::update_many()
        .col_expr(Column::UsedCount, Expr::col(Column::UsedCount).add(1))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .filter(Column::Id.eq(id))
        .filter(Column::IsActive.eq(true))
        .filter(
            Column::MaxUses
                .is_null()
                .or(Expr::col(Column::UsedCount).lt(Expr::col(Column::MaxUses))),
        )
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        info!("Discount {id} could not be redeemed");
    }
    Ok(result.rows_affected > 0)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn find_by_coach_and_code_normalises_the_code() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<Model, Vec<Model>, _>(vec![vec![]])
            .into_connection();

        let coach_id = Id::new_v4();
        find_by_coach_and_code(&db, coach_id, " spring10 ").await?;

        let log = db.into_transaction_log();
        let statement = &log[0].statements()[0];
        assert!(statement
            .sql
            .contains(r#"WHERE "discounts"."coach_id" = $1 AND "discounts"."code" = $2"#));
        let values = statement
            .values
            .as_ref()
            .map(|values| values.0.clone())
            .unwrap_or_default();
        assert_eq!(values[1], "SPRING10".into());
        Ok(())
    }

    #[tokio::test]
    async fn redeem_only_counts_uses_below_the_limit() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let redeemed = redeem(&db, Id::new_v4()).await?;
        assert!(!redeemed);

        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.contains(r#""used_count" = "used_count" + $1"#));
        assert!(sql.contains(r#""discounts"."max_uses" IS NULL OR "used_count" < "max_uses""#));
        Ok(())
    }
}
