//! Coach discount codes and the pricing rules applied when booking.

use crate::discount_kind::DiscountKind;
use crate::discounts::Model;
use crate::error::Error;
use crate::{Id, IntoUpdateMap, UpdateMap};
use chrono::{DateTime, FixedOffset, Utc};
use entity_api::{booking_type, discount};
use log::*;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use serde::Serialize;

pub use entity_api::discount::find_by_id;

pub const MAX_CODE_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct NewDiscount {
    pub code: String,
    pub kind: DiscountKind,
    pub value: i64,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default)]
pub struct DiscountUpdate {
    pub code: Option<String>,
    pub kind: Option<DiscountKind>,
    pub value: Option<i64>,
    pub max_uses: Option<Option<i32>>,
    pub expires_at: Option<Option<DateTime<FixedOffset>>>,
    pub is_active: Option<bool>,
}

impl IntoUpdateMap for DiscountUpdate {
    fn into_update_map(self) -> UpdateMap {
        let mut update_map = UpdateMap::new();
        update_map.insert_some("code", self.code);
        update_map.insert_some("kind", self.kind);
        update_map.insert_some("value", self.value);
        update_map.insert_some("max_uses", self.max_uses);
        update_map.insert_some("expires_at", self.expires_at);
        update_map.insert_some("is_active", self.is_active);
        update_map
    }
}

/// Result of applying a discount to a price, all in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pricing {
    pub original_price_cents: i64,
    pub discount_cents: i64,
    pub final_price_cents: i64,
}

/// A priced quote for a booking type with a given code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountQuote {
    pub discount_id: Id,
    pub code: String,
    pub booking_type_id: Id,
    #[serde(flatten)]
    pub pricing: Pricing,
}

/// Percentage discounts round down to whole cents; the final price never
/// drops below zero.
pub fn apply(kind: DiscountKind, value: i64, price_cents: i64) -> Pricing {
    let price_cents = price_cents.max(0);
    let discount_cents = match kind {
        DiscountKind::Percentage => price_cents * value.clamp(0, 100) / 100,
        DiscountKind::FixedAmount => value.max(0),
    }
    .min(price_cents);

    Pricing {
        original_price_cents: price_cents,
        discount_cents,
        final_price_cents: price_cents - discount_cents,
    }
}

/// Whether the discount can be redeemed at `now`.
pub fn ensure_redeemable(discount: &Model, now: DateTime<Utc>) -> Result<(), Error> {
    if !discount.is_active {
        return Err(Error::validation("Discount code is no longer active"));
    }
    if discount.expires_at.is_some_and(|expires_at| expires_at <= now) {
        return Err(Error::validation("Discount code has expired"));
    }
    if discount
        .max_uses
        .is_some_and(|max_uses| discount.used_count >= max_uses)
    {
        return Err(Error::validation("Discount code has been fully redeemed"));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    coach_id: Id,
    new_discount: NewDiscount,
) -> Result<Model, Error> {
    let code = normalize_code(&new_discount.code)?;
    validate_value(new_discount.kind, new_discount.value)?;
    validate_max_uses(new_discount.max_uses)?;

    if discount::find_by_coach_and_code(db, coach_id, &code)
        .await?
        .is_some()
    {
        info!("Coach {coach_id} already has a discount with code {code}");
        return Err(Error::conflict());
    }

    let now = Utc::now().fixed_offset();
    Ok(discount::create(
        db,
        Model {
            id: Id::nil(),
            coach_id,
            code,
            kind: new_discount.kind,
            value: new_discount.value,
            max_uses: new_discount.max_uses,
            used_count: 0,
            expires_at: new_discount.expires_at,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?)
}

pub async fn find_by_coach(db: &DatabaseConnection, coach_id: Id) -> Result<Vec<Model>, Error> {
    Ok(discount::find_by_coach(db, coach_id).await?)
}

pub async fn update(
    db: &DatabaseConnection,
    coach_id: Id,
    id: Id,
    mut params: DiscountUpdate,
) -> Result<Model, Error> {
    let existing = find_owned(db, coach_id, id).await?;

    if let Some(code) = params.code.take() {
        let code = normalize_code(&code)?;
        if code != existing.code
            && discount::find_by_coach_and_code(db, coach_id, &code)
                .await?
                .is_some()
        {
            return Err(Error::conflict());
        }
        params.code = Some(code);
    }
    validate_value(
        params.kind.unwrap_or(existing.kind),
        params.value.unwrap_or(existing.value),
    )?;
    if let Some(max_uses) = params.max_uses {
        validate_max_uses(max_uses)?;
    }

    Ok(discount::update(db, id, params.into_update_map()).await?)
}

pub async fn deactivate(db: &DatabaseConnection, coach_id: Id, id: Id) -> Result<Model, Error> {
    find_owned(db, coach_id, id).await?;
    Ok(discount::deactivate(db, id).await?)
}

/// Prices `booking_type_id` with `code` without redeeming the code.
pub async fn quote(
    db: &DatabaseConnection,
    coach_id: Id,
    code: &str,
    booking_type_id: Id,
) -> Result<DiscountQuote, Error> {
    let booking_type = booking_type::find_by_id(db, booking_type_id).await?;
    if booking_type.coach_id != coach_id || !booking_type.is_active {
        return Err(Error::not_found());
    }

    let discount = find_redeemable(db, coach_id, code).await?;
    Ok(DiscountQuote {
        discount_id: discount.id,
        code: discount.code.clone(),
        booking_type_id,
        pricing: apply(discount.kind, discount.value, booking_type.price_cents),
    })
}

/// Looks a code up for a coach and checks it can be redeemed now.
pub(crate) async fn find_redeemable(
    db: &impl ConnectionTrait,
    coach_id: Id,
    code: &str,
) -> Result<Model, Error> {
    let discount = discount::find_by_coach_and_code(db, coach_id, code)
        .await?
        .ok_or_else(|| {
            debug!("Unknown discount code for coach {coach_id}");
            Error::not_found()
        })?;
    ensure_redeemable(&discount, Utc::now())?;
    Ok(discount)
}

pub async fn find_owned(db: &DatabaseConnection, coach_id: Id, id: Id) -> Result<Model, Error> {
    let discount = discount::find_by_id(db, id).await?;
    if discount.coach_id != coach_id {
        warn!("Coach {coach_id} attempted to access discount {id} they do not own");
        return Err(Error::forbidden());
    }
    Ok(discount)
}

fn normalize_code(code: &str) -> Result<String, Error> {
    let code = code.trim().to_uppercase();
    if code.is_empty() || code.len() > MAX_CODE_LENGTH {
        return Err(Error::validation(format!(
            "code must be 1 to {MAX_CODE_LENGTH} characters"
        )));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::validation(
            "code may only contain letters, digits, '-' and '_'",
        ));
    }
    Ok(code)
}

fn validate_value(kind: DiscountKind, value: i64) -> Result<(), Error> {
    match kind {
        DiscountKind::Percentage if !(1..=100).contains(&value) => Err(Error::validation(
            "percentage discounts must be between 1 and 100",
        )),
        DiscountKind::FixedAmount if value <= 0 => Err(Error::validation(
            "fixed amount discounts must be greater than zero",
        )),
        _ => Ok(()),
    }
}

fn validate_max_uses(max_uses: Option<i32>) -> Result<(), Error> {
    match max_uses {
        Some(max_uses) if max_uses < 1 => Err(Error::validation("max_uses must be at least 1")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn discount(kind: DiscountKind, value: i64) -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            id: Id::new_v4(),
            coach_id: Id::new_v4(),
            code: "SPRING".to_string(),
            kind,
            value,
            max_uses: None,
            used_count: 0,
            expires_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn percentage_discounts_round_down() {
        let pricing = apply(DiscountKind::Percentage, 15, 999);
        assert_eq!(pricing.discount_cents, 149);
        assert_eq!(pricing.final_price_cents, 850);
    }

    #[test]
    fn fixed_discounts_never_go_below_zero() {
        let pricing = apply(DiscountKind::FixedAmount, 5000, 3000);
        assert_eq!(pricing.discount_cents, 3000);
        assert_eq!(pricing.final_price_cents, 0);
    }

    #[test]
    fn full_percentage_makes_it_free() {
        assert_eq!(apply(DiscountKind::Percentage, 100, 12000).final_price_cents, 0);
    }

    #[test]
    fn expired_exhausted_and_inactive_codes_are_not_redeemable() {
        let now = Utc::now();

        let mut expired = discount(DiscountKind::Percentage, 10);
        expired.expires_at = Some((now - Duration::minutes(1)).fixed_offset());
        assert!(ensure_redeemable(&expired, now).is_err());

        let mut exhausted = discount(DiscountKind::Percentage, 10);
        exhausted.max_uses = Some(3);
        exhausted.used_count = 3;
        assert!(ensure_redeemable(&exhausted, now).is_err());

        let mut inactive = discount(DiscountKind::Percentage, 10);
        inactive.is_active = false;
        assert!(ensure_redeemable(&inactive, now).is_err());

        let mut fine = discount(DiscountKind::FixedAmount, 500);
        fine.max_uses = Some(3);
        fine.used_count = 2;
        fine.expires_at = Some((now + Duration::days(1)).fixed_offset());
        assert!(ensure_redeemable(&fine, now).is_ok());
    }

    #[test]
    fn codes_are_normalised_and_checked() -> Result<(), Error> {
        assert_eq!(normalize_code(" summer-24 ")?, "SUMMER-24");
        assert!(normalize_code("").is_err());
        assert!(normalize_code("NO SPACES").is_err());
        Ok(())
    }

    #[test]
    fn values_are_checked_per_kind() {
        assert!(validate_value(DiscountKind::Percentage, 0).is_err());
        assert!(validate_value(DiscountKind::Percentage, 101).is_err());
        assert!(validate_value(DiscountKind::Percentage, 100).is_ok());
        assert!(validate_value(DiscountKind::FixedAmount, 0).is_err());
        assert!(validate_value(DiscountKind::FixedAmount, 1).is_ok());
    }
}
