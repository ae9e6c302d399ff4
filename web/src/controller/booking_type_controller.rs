use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_account::AuthenticatedCoach, compare_api_version::CompareApiVersion,
};
use crate::params::booking_type::{CreateParams, UpdateParams};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{booking_type as BookingTypeApi, Id};
use log::*;
use service::config::ApiVersion;
use validator::Validate;

/// POST create a booking type for the calling coach
#[utoipa::path(
    post,
    path = "/booking_types",
    params(ApiVersion),
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created a new booking type", body = domain::booking_types::Model),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a coach")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedCoach(coach): AuthenticatedCoach,
    State(app_state): State<AppState>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST create booking type for coach {}: {params:?}", coach.id);
    params.validate()?;

    let booking_type =
        BookingTypeApi::create(app_state.db_conn_ref(), coach.id, params.into()).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::CREATED.into(),
        booking_type,
    )))
}

/// GET all booking types of the calling coach, including inactive ones
#[utoipa::path(
    get,
    path = "/booking_types",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved booking types", body = [domain::booking_types::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a coach")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedCoach(coach): AuthenticatedCoach,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let booking_types = BookingTypeApi::find_by_coach(app_state.db_conn_ref(), coach.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), booking_types)))
}

/// PUT update a booking type owned by the calling coach
#[utoipa::path(
    put,
    path = "/booking_types/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Booking type id to update")
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated the booking type", body = domain::booking_types::Model),
        (status = 400, description = "Bad Request"),
        (status = 403, description = "Booking type belongs to another coach"),
        (status = 404, description = "Booking type not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedCoach(coach): AuthenticatedCoach,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT update booking type {id} with {params:?}");
    params.validate()?;

    let booking_type =
        BookingTypeApi::update(app_state.db_conn_ref(), coach.id, id, params.into()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), booking_type)))
}

/// DELETE deactivate a booking type owned by the calling coach
#[utoipa::path(
    delete,
    path = "/booking_types/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Booking type id to deactivate")
    ),
    responses(
        (status = 200, description = "Successfully deactivated the booking type", body = domain::booking_types::Model),
        (status = 403, description = "Booking type belongs to another coach"),
        (status = 404, description = "Booking type not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedCoach(coach): AuthenticatedCoach,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE booking type {id}");

    let booking_type = BookingTypeApi::deactivate(app_state.db_conn_ref(), coach.id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), booking_type)))
}
