use serde::Serialize;
pub(crate) mod auth_controller;
pub(crate) mod booking_type_controller;
pub(crate) mod coach;
pub(crate) mod coach_controller;
pub(crate) mod custom_service_controller;
pub(crate) mod discount_controller;
pub(crate) mod health_check_controller;
pub(crate) mod message_controller;
pub(crate) mod metrics_controller;
pub(crate) mod notification_controller;
pub(crate) mod payment_controller;
pub(crate) mod session_controller;
pub(crate) mod time_slot_controller;
pub(crate) mod user_controller;

#[derive(Debug, Serialize)]
pub(crate) struct ApiResponse<T: Serialize> {
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T) -> Self {
        Self {
            status_code,
            data: Some(data),
        }
    }

    pub fn no_content(status_code: u16) -> ApiResponse<()> {
        ApiResponse {
            status_code,
            data: None,
        }
    }
}
