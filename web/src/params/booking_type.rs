use super::double_option;
use domain::booking_type::{BookingTypeUpdate, NewBookingType, DURATION_MINUTES};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub(crate) struct CreateParams {
    #[validate(length(min = 1, max = 200))]
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    #[validate(range(min = 5, max = 1440))]
    pub(crate) duration_minutes: i32,
    #[validate(range(min = 0))]
    pub(crate) price_cents: i64,
}

impl From<CreateParams> for NewBookingType {
    fn from(params: CreateParams) -> Self {
        NewBookingType {
            name: params.name,
            description: params.description,
            duration_minutes: params.duration_minutes,
            price_cents: params.price_cents,
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
    #[validate(range(min = 5, max = 1440))]
    pub(crate) duration_minutes: Option<i32>,
    #[validate(range(min = 0))]
    pub(crate) price_cents: Option<i64>,
    pub(crate) is_active: Option<bool>,
}

impl From<UpdateParams> for BookingTypeUpdate {
    fn from(params: UpdateParams) -> Self {
        BookingTypeUpdate {
            name: params.name,
            description: params.description,
            duration_minutes: params.duration_minutes,
            price_cents: params.price_cents,
            is_active: params.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn duration_bounds_match_the_domain_rule() {
        for (minutes, valid) in [(4, false), (5, true), (1440, true), (1441, false)] {
            let params: CreateParams = serde_json::from_value(json!({
                "name": "Call",
                "duration_minutes": minutes,
                "price_cents": 0
            }))
            .unwrap();
            assert_eq!(params.validate().is_ok(), valid, "{minutes} minutes");
            assert_eq!(DURATION_MINUTES.contains(&minutes), valid);
        }
    }
}
