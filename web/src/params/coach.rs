use super::double_option;
use domain::coach::ProfileUpdate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub(crate) struct UpdateParams {
    #[validate(length(min = 1, max = 100))]
    pub(crate) first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub(crate) last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub(crate) bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub(crate) headline: Option<Option<String>>,
    pub(crate) timezone: Option<String>,
    #[validate(length(equal = 3))]
    pub(crate) currency: Option<String>,
}

impl From<UpdateParams> for ProfileUpdate {
    fn from(params: UpdateParams) -> Self {
        ProfileUpdate {
            first_name: params.first_name,
            last_name: params.last_name,
            bio: params.bio,
            headline: params.headline,
            timezone: params.timezone,
            currency: params.currency,
        }
    }
}
