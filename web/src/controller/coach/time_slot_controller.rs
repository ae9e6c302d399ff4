use crate::controller::ApiResponse;
use crate::extractors::compare_api_version::CompareApiVersion;
use crate::params::time_slot::IndexParams;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{time_slot as TimeSlotApi, Id};
use log::*;
use service::config::ApiVersion;

/// GET a coach's bookable time slots: available and starting in the future
#[utoipa::path(
    get,
    path = "/coaches/{id}/time_slots",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Coach whose availability to list"),
        IndexParams
    ),
    responses(
        (status = 200, description = "Successfully retrieved available time slots", body = [domain::time_slots::Model])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(coach_id): Path<Id>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET available time slots for coach {coach_id}: {params:?}");

    let time_slots =
        TimeSlotApi::find_available(app_state.db_conn_ref(), coach_id, params.from, params.to)
            .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), time_slots)))
}
