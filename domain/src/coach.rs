use crate::auth::{validate_currency, validate_password, validate_timezone};
use crate::coaches::Model;
use crate::error::Error;
use crate::{Id, IntoUpdateMap, UpdateMap};
use entity::account_type::AccountType;
use entity_api::{coach, refresh_token};
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};

pub use entity_api::coach::{find_active, find_active_by_id, find_by_id};

/// Editable profile fields of a coach. Nested options clear nullable fields.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<Option<String>>,
    pub headline: Option<Option<String>>,
    pub timezone: Option<String>,
    pub currency: Option<String>,
}

impl IntoUpdateMap for ProfileUpdate {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        update_map.insert_some("first_name", self.first_name);
        update_map.insert_some("last_name", self.last_name);
        update_map.insert_some("bio", self.bio);
        update_map.insert_some("headline", self.headline);
        update_map.insert_some("timezone", self.timezone);
        update_map.insert_some("currency", self.currency);
        update_map
    }
}

pub async fn update_profile(
    db: &DatabaseConnection,
    coach_id: Id,
    mut profile: ProfileUpdate,
) -> Result<Model, Error> {
    if let Some(timezone) = profile.timezone.take() {
        profile.timezone = Some(validate_timezone(Some(&timezone))?);
    }
    if let Some(currency) = profile.currency.take() {
        profile.currency = Some(validate_currency(Some(&currency))?);
    }
    Ok(coach::update(db, coach_id, profile.into_update_map()).await?)
}

pub async fn change_password(
    db: &DatabaseConnection,
    coach_id: Id,
    current_password: &str,
    new_password: String,
) -> Result<(), Error> {
    let existing = coach::find_by_id(db, coach_id).await?;
    entity_api::user::verify_password(current_password, &existing.password).await?;
    validate_password(&new_password)?;

    coach::update_password(db, coach_id, new_password).await?;
    info!("Coach {coach_id} changed their password");
    Ok(())
}

/// Soft deletes the coach and revokes all of their refresh tokens. Their
/// catalogue disappears from the public directory with them.
pub async fn deactivate(db: &DatabaseConnection, coach_id: Id) -> Result<Model, Error> {
    let txn = db.begin().await?;
    let coach = coach::deactivate(&txn, coach_id).await?;
    refresh_token::delete_all_for_account(&txn, AccountType::Coach, coach_id).await?;
    txn.commit().await?;

    info!("Deactivated coach {coach_id}");
    Ok(coach)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::account::test_support;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn deactivate_flags_the_coach_inactive() -> Result<(), Error> {
        let mut coach = test_support::coach();
        coach.is_active = false;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![coach.clone()]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();

        let result = deactivate(&db, coach.id).await?;
        assert!(!result.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn update_profile_upper_cases_currency() -> Result<(), Error> {
        let coach = test_support::coach();
        let mut updated = coach.clone();
        updated.currency = "EUR".to_string();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![coach.clone()]])
            .append_query_results(vec![vec![updated]])
            .into_connection();

        let result = update_profile(
            &db,
            coach.id,
            ProfileUpdate {
                currency: Some("eur".to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(result.currency, "EUR");
        Ok(())
    }
}
