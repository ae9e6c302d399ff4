use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_account::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::discount::ValidateParams;
use crate::response::discount::DiscountQuoteResponse;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{discount as DiscountApi, Id};
use log::*;
use service::config::ApiVersion;
use validator::Validate;

/// POST check a discount code against one of the coach's booking types
///
/// Nothing is redeemed; the code is only consumed when a session is booked with it.
#[utoipa::path(
    post,
    path = "/coaches/{id}/discounts/validate",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Coach who issued the code")
    ),
    request_body = ValidateParams,
    responses(
        (status = 200, description = "Code is redeemable; price breakdown", body = DiscountQuoteResponse),
        (status = 400, description = "Code is inactive, expired or used up"),
        (status = 403, description = "Caller is not a user"),
        (status = 404, description = "Unknown code or booking type")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn validate(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(coach_id): Path<Id>,
    Json(params): Json<ValidateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST validate discount {} of coach {coach_id} for user {}",
        params.code, user.id
    );
    params.validate()?;

    let quote = DiscountApi::quote(
        app_state.db_conn_ref(),
        coach_id,
        &params.code,
        params.booking_type_id,
    )
    .await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        DiscountQuoteResponse::from(quote),
    )))
}
