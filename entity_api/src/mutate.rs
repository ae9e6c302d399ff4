use crate::error::Error;
use chrono::Utc;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, Value,
};
use std::collections::HashMap;

const UPDATED_AT: &str = "updated_at";

/// Updates an existing record in the database using a map of column names to values.
///
/// Only the fields present in the map are modified. Entities with an `updated_at`
/// column get it bumped to now unless the map already carries a value for it.
///
/// # Type Parameters
///
/// * `A` - The ActiveModel type that implements ActiveModelTrait and ActiveModelBehavior
/// * `C` - The Column type that implements ColumnTrait
///
/// Values must match the column's Rust type (e.g. `i64` for `*_cents`,
/// `Option<String>` for nullable text).
pub async fn update<A, C>(
    db: &DatabaseConnection,
    mut active_model: A,
    update_map: UpdateMap,
) -> Result<<A::Entity as EntityTrait>::Model, Error>
where
    A: ActiveModelTrait + ActiveModelBehavior + Send,
    C: ColumnTrait,
    A::Entity: EntityTrait<Column = C>,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    for column in C::iter() {
        let name = column.to_string();
        if let Some(value) = update_map.get(&name) {
            active_model.set(column, value.clone());
        } else if name == UPDATED_AT && !update_map.is_empty() {
            active_model.set(column, Utc::now().fixed_offset().into());
        }
    }
    Ok(active_model.update(db).await?)
}

/// A map structure that holds column names and their corresponding values for updates.
#[derive(Default, Debug)]
pub struct UpdateMap {
    map: HashMap<String, Option<Value>>,
}

impl UpdateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `key`, or None if the key is absent or explicitly unset.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key).and_then(|opt| opt.as_ref())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.remove(key).and_then(|opt| opt)
    }

    /// Inserts a key-value pair into the map, overwriting any previous value.
    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }

    /// Inserts `value` under `key` only when it is `Some`.
    pub fn insert_some<V: Into<Value>>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.map.insert(key.to_string(), Some(value.into()));
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// A trait that allows types to be converted into an UpdateMap.
pub trait IntoUpdateMap {
    fn into_update_map(self) -> UpdateMap;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_some_skips_none_values() {
        let mut update_map = UpdateMap::new();
        update_map.insert_some::<String>("name", None);
        update_map.insert_some("price_cents", Some(2500_i64));

        assert!(!update_map.contains_key("name"));
        assert_eq!(update_map.get("price_cents"), Some(&Value::BigInt(Some(2500))));
    }

    #[test]
    fn explicitly_unset_values_are_not_returned() {
        let mut update_map = UpdateMap::new();
        update_map.insert("description".to_string(), None);

        assert!(update_map.contains_key("description"));
        assert!(update_map.get("description").is_none());
        assert!(update_map.remove("description").is_none());
    }
}
