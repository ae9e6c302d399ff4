use super::double_option;
use domain::session::{NewSession, SessionFilter, SessionUpdate};
use domain::session_status::SessionStatus;
use domain::Id;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub(crate) struct CreateParams {
    #[schema(value_type = Uuid)]
    pub(crate) coach_id: Id,
    #[schema(value_type = Uuid)]
    pub(crate) booking_type_id: Id,
    #[schema(value_type = Uuid)]
    pub(crate) time_slot_id: Id,
    #[validate(length(min = 1))]
    pub(crate) discount_code: Option<String>,
    #[validate(length(max = 2000))]
    pub(crate) notes: Option<String>,
}

impl From<CreateParams> for NewSession {
    fn from(params: CreateParams) -> Self {
        NewSession {
            coach_id: params.coach_id,
            booking_type_id: params.booking_type_id,
            time_slot_id: params.time_slot_id,
            discount_code: params.discount_code,
            notes: params.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub(crate) struct UpdateParams {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub(crate) notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub(crate) meeting_url: Option<Option<String>>,
    pub(crate) status: Option<SessionStatus>,
}

impl From<UpdateParams> for SessionUpdate {
    fn from(params: UpdateParams) -> Self {
        SessionUpdate {
            notes: params.notes,
            meeting_url: params.meeting_url,
            status: params.status,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub(crate) struct CancelParams {
    #[validate(length(max = 1000))]
    pub(crate) reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct RescheduleParams {
    #[schema(value_type = Uuid)]
    pub(crate) time_slot_id: Id,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct IndexParams {
    pub(crate) status: Option<SessionStatus>,
}

impl From<IndexParams> for SessionFilter {
    fn from(params: IndexParams) -> Self {
        SessionFilter {
            status: params.status,
        }
    }
}
