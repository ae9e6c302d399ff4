use domain::Id;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub(crate) struct SendParams {
    /// The coach (when sent by a user) or user (when sent by a coach) on the other side.
    #[schema(value_type = Uuid)]
    pub(crate) recipient_id: Id,
    #[validate(length(min = 1, max = 5000))]
    pub(crate) body: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    #[param(value_type = Uuid)]
    pub(crate) counterpart_id: Id,
}
