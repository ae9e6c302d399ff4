use crate::custom_services::Model;
use crate::error::Error;
use crate::{Id, IntoUpdateMap, UpdateMap};
use chrono::Utc;
use entity_api::{coach, custom_service, user};
use log::*;
use sea_orm::DatabaseConnection;

pub use entity_api::custom_service::find_by_id;

#[derive(Debug, Clone, Default)]
pub struct NewCustomService {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    /// Restricts the service to a single user; `None` makes it public.
    pub user_id: Option<Id>,
}

#[derive(Debug, Clone, Default)]
pub struct CustomServiceUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price_cents: Option<i64>,
    pub user_id: Option<Option<Id>>,
    pub is_active: Option<bool>,
}

impl IntoUpdateMap for CustomServiceUpdate {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        update_map.insert_some("name", self.name.map(|name| name.trim().to_string()));
        update_map.insert_some("description", self.description);
        update_map.insert_some("price_cents", self.price_cents);
        update_map.insert_some("user_id", self.user_id);
        update_map.insert_some("is_active", self.is_active);
        update_map
    }
}

pub async fn create(
    db: &DatabaseConnection,
    coach_id: Id,
    new_service: NewCustomService,
) -> Result<Model, Error> {
    validate(Some(&new_service.name), Some(new_service.price_cents))?;
    if let Some(user_id) = new_service.user_id {
        user::find_by_id(db, user_id).await?;
    }

    let now = Utc::now().fixed_offset();
    let created = custom_service::create(
        db,
        Model {
            id: Id::nil(),
            coach_id,
            user_id: new_service.user_id,
            name: new_service.name.trim().to_string(),
            description: new_service.description,
            price_cents: new_service.price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;
    info!("Coach {coach_id} created custom service {}", created.id);
    Ok(created)
}

pub async fn find_by_coach(db: &DatabaseConnection, coach_id: Id) -> Result<Vec<Model>, Error> {
    Ok(custom_service::find_by_coach(db, coach_id).await?)
}

/// Services of an active coach that `user_id` is allowed to see.
pub async fn find_visible_to_user(
    db: &DatabaseConnection,
    coach_id: Id,
    user_id: Id,
) -> Result<Vec<Model>, Error> {
    coach::find_active_by_id(db, coach_id).await?;
    Ok(custom_service::find_visible_to_user(db, coach_id, user_id).await?)
}

pub async fn update(
    db: &DatabaseConnection,
    coach_id: Id,
    id: Id,
    params: CustomServiceUpdate,
) -> Result<Model, Error> {
    find_owned(db, coach_id, id).await?;
    validate(params.name.as_deref(), params.price_cents)?;
    if let Some(Some(user_id)) = params.user_id {
        user::find_by_id(db, user_id).await?;
    }
    Ok(custom_service::update(db, id, params.into_update_map()).await?)
}

pub async fn deactivate(db: &DatabaseConnection, coach_id: Id, id: Id) -> Result<Model, Error> {
    find_owned(db, coach_id, id).await?;
    Ok(custom_service::deactivate(db, id).await?)
}

pub async fn find_owned(db: &DatabaseConnection, coach_id: Id, id: Id) -> Result<Model, Error> {
    let service = custom_service::find_by_id(db, id).await?;
    if service.coach_id != coach_id {
        warn!("Coach {coach_id} attempted to access custom service {id} they do not own");
        return Err(Error::forbidden());
    }
    Ok(service)
}

fn validate(name: Option<&str>, price_cents: Option<i64>) -> Result<(), Error> {
    if name.is_some_and(|name| name.trim().is_empty()) {
        return Err(Error::validation("name must not be empty"));
    }
    if price_cents.is_some_and(|price| price < 0) {
        return Err(Error::validation("price_cents must not be negative"));
    }
    Ok(())
}
