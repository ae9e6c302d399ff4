use crate::auth::{validate_password, validate_timezone};
use crate::error::Error;
use crate::users::Model;
use crate::{Id, IntoUpdateMap, UpdateMap};
use entity::account_type::AccountType;
use entity_api::{refresh_token, user};
use log::*;
use sea_orm::{DatabaseConnection, TransactionTrait};

pub use entity_api::user::find_by_id;

/// Editable profile fields of a user. `None` leaves a field untouched;
/// `phone: Some(None)` clears the phone number.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<Option<String>>,
    pub timezone: Option<String>,
}

impl IntoUpdateMap for ProfileUpdate {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        update_map.insert_some("first_name", self.first_name);
        update_map.insert_some("last_name", self.last_name);
        update_map.insert_some("phone", self.phone);
        update_map.insert_some("timezone", self.timezone);
        update_map
    }
}

pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: Id,
    mut profile: ProfileUpdate,
) -> Result<Model, Error> {
    if let Some(timezone) = profile.timezone.take() {
        profile.timezone = Some(validate_timezone(Some(&timezone))?);
    }
    Ok(user::update(db, user_id, profile.into_update_map()).await?)
}

/// Replaces the password after checking the current one.
pub async fn change_password(
    db: &DatabaseConnection,
    user_id: Id,
    current_password: &str,
    new_password: String,
) -> Result<(), Error> {
    let existing = user::find_by_id(db, user_id).await?;
    user::verify_password(current_password, &existing.password).await?;
    validate_password(&new_password)?;

    user::update_password(db, user_id, new_password).await?;
    info!("User {user_id} changed their password");
    Ok(())
}

/// Soft deletes the user and revokes all of their refresh tokens.
pub async fn deactivate(db: &DatabaseConnection, user_id: Id) -> Result<Model, Error> {
    let txn = db.begin().await?;
    let user = user::deactivate(&txn, user_id).await?;
    refresh_token::delete_all_for_account(&txn, AccountType::User, user_id).await?;
    txn.commit().await?;

    info!("Deactivated user {user_id}");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Value;

    #[test]
    fn profile_update_only_maps_present_fields() {
        let update_map = ProfileUpdate {
            first_name: Some("Ada".to_string()),
            phone: Some(None),
            ..Default::default()
        }
        .into_update_map();

        assert_eq!(
            update_map.get("first_name"),
            Some(&Value::from("Ada".to_string()))
        );
        assert_eq!(update_map.get("phone"), Some(&Value::String(None)));
        assert!(!update_map.contains_key("last_name"));
        assert!(!update_map.contains_key("timezone"));
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::account::test_support;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn change_password_requires_the_current_password() {
        let user = test_support::user();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user.clone()]])
            .into_connection();

        let err = change_password(&db, user.id, "not-it", "new-password".to_string())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Unauthenticated
            ))
        );
    }

    #[tokio::test]
    async fn update_profile_rejects_unknown_timezones() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let result = update_profile(
            &db,
            Id::new_v4(),
            ProfileUpdate {
                timezone: Some("Nowhere/Special".to_string()),
                ..Default::default()
            },
        )
        .await;

        assert!(result.is_err());
    }
}
