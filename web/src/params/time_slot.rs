use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreateParams {
    #[schema(value_type = String, format = DateTime)]
    pub(crate) start_time: DateTime<FixedOffset>,
    #[schema(value_type = String, format = DateTime)]
    pub(crate) end_time: DateTime<FixedOffset>,
}

/// Same shape as [`CreateParams`]; a slot is always moved as a whole window.
pub(crate) type UpdateParams = CreateParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    /// Only slots starting at or after this instant.
    #[param(value_type = Option<String>, format = DateTime)]
    pub(crate) from: Option<DateTime<FixedOffset>>,
    /// Only slots starting before this instant.
    #[param(value_type = Option<String>, format = DateTime)]
    pub(crate) to: Option<DateTime<FixedOffset>>,
}
