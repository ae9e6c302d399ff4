use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_account::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{custom_service as CustomServiceApi, Id};
use log::*;
use service::config::ApiVersion;

/// GET the custom services of a coach visible to the calling user: public ones
/// and those addressed to them
#[utoipa::path(
    get,
    path = "/coaches/{id}/custom_services",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Coach whose custom services to list")
    ),
    responses(
        (status = 200, description = "Successfully retrieved custom services", body = [domain::custom_services::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a user"),
        (status = 404, description = "Coach not found or inactive")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(coach_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET custom services of coach {coach_id} for user {}", user.id);

    let custom_services =
        CustomServiceApi::find_visible_to_user(app_state.db_conn_ref(), coach_id, user.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), custom_services)))
}
