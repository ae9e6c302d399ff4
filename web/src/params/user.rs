use super::double_option;
use domain::user::ProfileUpdate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub(crate) struct UpdateParams {
    #[validate(length(min = 1, max = 100))]
    pub(crate) first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub(crate) last_name: Option<String>,
    /// `null` clears the phone number.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub(crate) phone: Option<Option<String>>,
    pub(crate) timezone: Option<String>,
}

impl From<UpdateParams> for ProfileUpdate {
    fn from(params: UpdateParams) -> Self {
        ProfileUpdate {
            first_name: params.first_name,
            last_name: params.last_name,
            phone: params.phone,
            timezone: params.timezone,
        }
    }
}
