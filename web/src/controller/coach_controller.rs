use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_account::AuthenticatedCoach, compare_api_version::CompareApiVersion,
};
use crate::params::coach::UpdateParams;
use crate::params::password::UpdatePasswordParams;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{coach as CoachApi, Id};
use log::*;
use service::config::ApiVersion;
use validator::Validate;

/// GET all active coaches
#[utoipa::path(
    get,
    path = "/coaches",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved the coach directory", body = [domain::coaches::Model]),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let coaches = CoachApi::find_active(app_state.db_conn_ref()).await?;
    debug!("Found {} active coaches", coaches.len());

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), coaches)))
}

/// GET a single active coach by id
#[utoipa::path(
    get,
    path = "/coaches/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Coach id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the coach", body = domain::coaches::Model),
        (status = 404, description = "Coach not found or inactive")
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET coach by id: {id}");

    let coach = CoachApi::find_active_by_id(app_state.db_conn_ref(), id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), coach)))
}

/// GET the profile of the calling coach
#[utoipa::path(
    get,
    path = "/coaches/me",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved the coach", body = domain::coaches::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a coach")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn read_me(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedCoach(coach): AuthenticatedCoach,
) -> Result<impl IntoResponse, Error> {
    Ok(Json(ApiResponse::new(StatusCode::OK.into(), coach)))
}

/// PUT update the profile of the calling coach
#[utoipa::path(
    put,
    path = "/coaches/me",
    params(ApiVersion),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated the coach", body = domain::coaches::Model),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a coach")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_me(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedCoach(coach): AuthenticatedCoach,
    State(app_state): State<AppState>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT update coach {} with {params:?}", coach.id);
    params.validate()?;

    let updated =
        CoachApi::update_profile(app_state.db_conn_ref(), coach.id, params.into()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), updated)))
}

/// PUT change the password of the calling coach
#[utoipa::path(
    put,
    path = "/coaches/me/password",
    params(ApiVersion),
    request_body = UpdatePasswordParams,
    responses(
        (status = 200, description = "Successfully changed the password"),
        (status = 400, description = "New password is too short or does not match its confirmation"),
        (status = 401, description = "Current password is wrong")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_password(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedCoach(coach): AuthenticatedCoach,
    State(app_state): State<AppState>,
    Json(params): Json<UpdatePasswordParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT update password for coach {}", coach.id);
    params.validate()?;

    CoachApi::change_password(
        app_state.db_conn_ref(),
        coach.id,
        &params.current_password,
        params.new_password,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::NO_CONTENT.into(), ())))
}

/// DELETE deactivate the calling coach's account
#[utoipa::path(
    delete,
    path = "/coaches/me",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully deactivated the coach"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a coach")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_me(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedCoach(coach): AuthenticatedCoach,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    info!("DELETE deactivate coach {}", coach.id);

    CoachApi::deactivate(app_state.db_conn_ref(), coach.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::NO_CONTENT.into(), ())))
}
