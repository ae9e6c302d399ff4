use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_account::AuthenticatedCoach, compare_api_version::CompareApiVersion,
};
use crate::params::custom_service::{CreateParams, UpdateParams};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{custom_service as CustomServiceApi, Id};
use log::*;
use service::config::ApiVersion;
use validator::Validate;

/// POST create a custom service, public or addressed to one user
#[utoipa::path(
    post,
    path = "/custom_services",
    params(ApiVersion),
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created a new custom service", body = domain::custom_services::Model),
        (status = 400, description = "Bad Request"),
        (status = 403, description = "Caller is not a coach"),
        (status = 404, description = "Addressed user not found")
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
    debug!("POST create custom service for coach {}: {params:?}", coach.id);
    params.validate()?;

    let custom_service =
        CustomServiceApi::create(app_state.db_conn_ref(), coach.id, params.into()).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::CREATED.into(),
        custom_service,
    )))
}

/// GET all custom services of the calling coach
#[utoipa::path(
    get,
    path = "/custom_services",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved custom services", body = [domain::custom_services::Model]),
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
    let custom_services =
        CustomServiceApi::find_by_coach(app_state.db_conn_ref(), coach.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), custom_services)))
}

/// PUT update a custom service owned by the calling coach
#[utoipa::path(
    put,
    path = "/custom_services/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Custom service id to update")
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated the custom service", body = domain::custom_services::Model),
        (status = 400, description = "Bad Request"),
        (status = 403, description = "Custom service belongs to another coach"),
        (status = 404, description = "Custom service not found")
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
    debug!("PUT update custom service {id} with {params:?}");
    params.validate()?;

    let custom_service =
        CustomServiceApi::update(app_state.db_conn_ref(), coach.id, id, params.into()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), custom_service)))
}

/// DELETE deactivate a custom service owned by the calling coach
#[utoipa::path(
    delete,
    path = "/custom_services/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Custom service id to deactivate")
    ),
    responses(
        (status = 200, description = "Successfully deactivated the custom service", body = domain::custom_services::Model),
        (status = 403, description = "Custom service belongs to another coach"),
        (status = 404, description = "Custom service not found")
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
    debug!("DELETE custom service {id}");

    let custom_service =
        CustomServiceApi::deactivate(app_state.db_conn_ref(), coach.id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), custom_service)))
}
