use domain::payment::PaymentOrder;
use domain::payment_status::PaymentStatus;
use domain::Id;
use serde::Serialize;
use utoipa::ToSchema;

/// Result of starting a PayPal checkout. `approval_url` is where the user
/// approves the payment; free sessions come back already `paid` without one.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PaymentOrderResponse {
    #[schema(value_type = Uuid)]
    pub(crate) session_id: Id,
    pub(crate) order_id: Option<String>,
    pub(crate) approval_url: Option<String>,
    pub(crate) payment_status: PaymentStatus,
}

impl From<PaymentOrder> for PaymentOrderResponse {
    fn from(order: PaymentOrder) -> Self {
        Self {
            session_id: order.session_id,
            order_id: order.order_id,
            approval_url: order.approval_url,
            payment_status: order.payment_status,
        }
    }
}
