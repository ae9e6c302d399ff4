use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub(crate) struct CaptureParams {
    #[validate(length(min = 1))]
    pub(crate) order_id: String,
}
