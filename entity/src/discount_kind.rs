use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How a discount's `value` is interpreted: a whole percentage (1-100) or an
/// amount in minor currency units.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum, ToSchema, Default,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "discount_kind")]
pub enum DiscountKind {
    #[sea_orm(string_value = "percentage")]
    #[default]
    Percentage,
    #[sea_orm(string_value = "fixed_amount")]
    FixedAmount,
}
