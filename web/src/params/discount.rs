use super::double_option;
use chrono::{DateTime, FixedOffset};
use domain::discount::{DiscountUpdate, NewDiscount};
use domain::discount_kind::DiscountKind;
use domain::Id;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub(crate) struct CreateParams {
    #[validate(length(min = 1, max = 32))]
    pub(crate) code: String,
    pub(crate) kind: DiscountKind,
    #[validate(range(min = 1))]
    pub(crate) value: i64,
    #[validate(range(min = 1))]
    pub(crate) max_uses: Option<i32>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub(crate) expires_at: Option<DateTime<FixedOffset>>,
}

impl From<CreateParams> for NewDiscount {
    fn from(params: CreateParams) -> Self {
        NewDiscount {
            code: params.code,
            kind: params.kind,
            value: params.value,
            max_uses: params.max_uses,
            expires_at: params.expires_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub(crate) struct UpdateParams {
    #[validate(length(min = 1, max = 32))]
    pub(crate) code: Option<String>,
    pub(crate) kind: Option<DiscountKind>,
    #[validate(range(min = 1))]
    pub(crate) value: Option<i64>,
    /// `null` removes the usage cap.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub(crate) max_uses: Option<Option<i32>>,
    /// `null` removes the expiry.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub(crate) expires_at: Option<Option<DateTime<FixedOffset>>>,
    pub(crate) is_active: Option<bool>,
}

impl From<UpdateParams> for DiscountUpdate {
    fn from(params: UpdateParams) -> Self {
        DiscountUpdate {
            code: params.code,
            kind: params.kind,
            value: params.value,
            max_uses: params.max_uses,
            expires_at: params.expires_at,
            is_active: params.is_active,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub(crate) struct ValidateParams {
    #[validate(length(min = 1, max = 32))]
    pub(crate) code: String,
    #[schema(value_type = Uuid)]
    pub(crate) booking_type_id: Id,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_null_clears_the_usage_cap() {
        let params: UpdateParams = serde_json::from_value(json!({"max_uses": null})).unwrap();
        let update = DiscountUpdate::from(params);

        assert_eq!(update.max_uses, Some(None));
        assert_eq!(update.expires_at, None);
    }

    #[test]
    fn codes_longer_than_the_limit_are_rejected() {
        let params: CreateParams = serde_json::from_value(json!({
            "code": "X".repeat(domain::discount::MAX_CODE_LENGTH + 1),
            "kind": "fixed_amount",
            "value": 500
        }))
        .unwrap();

        assert!(params.validate().is_err());
    }
}
