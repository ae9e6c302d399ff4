use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_account::AuthenticatedCoach, compare_api_version::CompareApiVersion,
};
use crate::params::time_slot::{CreateParams, IndexParams, UpdateParams};
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{time_slot as TimeSlotApi, Id};
use log::*;
use service::config::ApiVersion;

/// POST publish a new availability window for the calling coach
#[utoipa::path(
    post,
    path = "/time_slots",
    params(ApiVersion),
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created a new time slot", body = domain::time_slots::Model),
        (status = 400, description = "Slot ends before it starts or starts in the past"),
        (status = 403, description = "Caller is not a coach"),
        (status = 409, description = "Slot overlaps an existing slot")
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
    debug!("POST create time slot for coach {}: {params:?}", coach.id);

    let time_slot = TimeSlotApi::create(
        app_state.db_conn_ref(),
        coach.id,
        params.start_time,
        params.end_time,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), time_slot)))
}

/// GET the calling coach's time slots, optionally within a window
#[utoipa::path(
    get,
    path = "/time_slots",
    params(ApiVersion, IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved time slots", body = [domain::time_slots::Model]),
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
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET time slots for coach {}: {params:?}", coach.id);

    let time_slots =
        TimeSlotApi::find_by_coach(app_state.db_conn_ref(), coach.id, params.from, params.to)
            .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), time_slots)))
}

/// PUT move a time slot that has not been booked
#[utoipa::path(
    put,
    path = "/time_slots/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Time slot id to update")
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated the time slot", body = domain::time_slots::Model),
        (status = 400, description = "Slot ends before it starts or starts in the past"),
        (status = 403, description = "Time slot belongs to another coach"),
        (status = 404, description = "Time slot not found"),
        (status = 409, description = "Slot is booked or overlaps another slot")
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
    debug!("PUT update time slot {id} with {params:?}");

    let time_slot = TimeSlotApi::update(
        app_state.db_conn_ref(),
        coach.id,
        id,
        params.start_time,
        params.end_time,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), time_slot)))
}

/// DELETE a time slot that has not been booked
#[utoipa::path(
    delete,
    path = "/time_slots/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Time slot id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted the time slot"),
        (status = 403, description = "Time slot belongs to another coach"),
        (status = 404, description = "Time slot not found"),
        (status = 409, description = "Slot is booked")
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
    debug!("DELETE time slot {id}");

    TimeSlotApi::delete(app_state.db_conn_ref(), coach.id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::NO_CONTENT.into(), ())))
}
