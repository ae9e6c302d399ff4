use crate::controller::ApiResponse;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{booking_type as BookingTypeApi, Id};
use log::*;
use service::config::ApiVersion;

/// GET the active booking types a coach offers
#[utoipa::path(
    get,
    path = "/coaches/{id}/booking_types",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Coach whose booking types to list")
    ),
    responses(
        (status = 200, description = "Successfully retrieved booking types", body = [domain::booking_types::Model]),
        (status = 404, description = "Coach not found or inactive")
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(coach_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET public booking types for coach {coach_id}");

    let booking_types =
        BookingTypeApi::find_public_by_coach(app_state.db_conn_ref(), coach_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), booking_types)))
}
