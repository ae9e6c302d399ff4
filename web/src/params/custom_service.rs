use super::double_option;
use domain::custom_service::{CustomServiceUpdate, NewCustomService};
use domain::Id;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub(crate) struct CreateParams {
    #[validate(length(min = 1, max = 200))]
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    #[validate(range(min = 0))]
    pub(crate) price_cents: i64,
    /// Restricts the service to a single user when set.
    #[schema(value_type = Option<Uuid>)]
    pub(crate) user_id: Option<Id>,
}

impl From<CreateParams> for NewCustomService {
    fn from(params: CreateParams) -> Self {
        NewCustomService {
            name: params.name,
            description: params.description,
            price_cents: params.price_cents,
            user_id: params.user_id,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub(crate) struct UpdateParams {
    #[validate(length(min = 1, max = 200))]
    pub(crate) name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub(crate) description: Option<Option<String>>,
    #[validate(range(min = 0))]
    pub(crate) price_cents: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub(crate) user_id: Option<Option<Id>>,
    pub(crate) is_active: Option<bool>,
}

impl From<UpdateParams> for CustomServiceUpdate {
    fn from(params: UpdateParams) -> Self {
        CustomServiceUpdate {
            name: params.name,
            description: params.description,
            price_cents: params.price_cents,
            user_id: params.user_id,
            is_active: params.is_active,
        }
    }
}
