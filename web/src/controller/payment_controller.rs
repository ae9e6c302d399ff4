use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_account::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::payment::CaptureParams;
use crate::response::payment::PaymentOrderResponse;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{payment as PaymentApi, Id};
use log::*;
use service::config::ApiVersion;
use validator::Validate;

/// POST start a PayPal checkout for a booked session
#[utoipa::path(
    post,
    path = "/sessions/{id}/payments/paypal",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Session id to pay for")
    ),
    responses(
        (status = 200, description = "PayPal order created, or free session marked paid", body = PaymentOrderResponse),
        (status = 400, description = "Session is cancelled"),
        (status = 403, description = "Session belongs to another user"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Session is already paid"),
        (status = 502, description = "PayPal request failed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_order(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    info!("POST create PayPal order for session {id} by user {}", user.id);

    let order = app_state
        .monitor
        .instrument(
            "paypal_create_order",
            PaymentApi::create_paypal_order(app_state.db_conn_ref(), &app_state.config, &user, id),
        )
        .await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        PaymentOrderResponse::from(order),
    )))
}

/// POST capture an approved PayPal order
#[utoipa::path(
    post,
    path = "/payments/paypal/capture",
    params(ApiVersion),
    request_body = CaptureParams,
    responses(
        (status = 200, description = "Order captured; the session carries the resulting payment status", body = domain::sessions::Model),
        (status = 403, description = "Session belongs to another user"),
        (status = 404, description = "No session for this order"),
        (status = 502, description = "PayPal request failed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn capture_order(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<CaptureParams>,
) -> Result<impl IntoResponse, Error> {
    info!(
        "POST capture PayPal order {} by user {}",
        params.order_id, user.id
    );
    params.validate()?;

    let session = app_state
        .monitor
        .instrument(
            "paypal_capture_order",
            PaymentApi::capture_paypal_order(
                app_state.db_conn_ref(),
                &app_state.config,
                &app_state.event_publisher,
                &user,
                &params.order_id,
            ),
        )
        .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), session)))
}
