use domain::discount::DiscountQuote;
use domain::Id;
use serde::Serialize;
use utoipa::ToSchema;

/// Price breakdown for a discount code applied to one booking type.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DiscountQuoteResponse {
    #[schema(value_type = Uuid)]
    pub(crate) discount_id: Id,
    pub(crate) code: String,
    #[schema(value_type = Uuid)]
    pub(crate) booking_type_id: Id,
    pub(crate) original_price_cents: i64,
    pub(crate) discount_cents: i64,
    pub(crate) final_price_cents: i64,
}

impl From<DiscountQuote> for DiscountQuoteResponse {
    fn from(quote: DiscountQuote) -> Self {
        Self {
            discount_id: quote.discount_id,
            code: quote.code,
            booking_type_id: quote.booking_type_id,
            original_price_cents: quote.pricing.original_price_cents,
            discount_cents: quote.pricing.discount_cents,
            final_price_cents: quote.pricing.final_price_cents,
        }
    }
}
