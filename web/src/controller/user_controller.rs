use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_account::AuthenticatedUser, compare_api_version::CompareApiVersion,
};
use crate::params::password::UpdatePasswordParams;
use crate::params::user::UpdateParams;
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::user as UserApi;
use log::*;
use service::config::ApiVersion;
use validator::Validate;

/// GET the profile of the calling user
#[utoipa::path(
    get,
    path = "/users/me",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved the user", body = domain::users::Model),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a user")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, Error> {
    Ok(Json(ApiResponse::new(StatusCode::OK.into(), user)))
}

/// PUT update the profile of the calling user
#[utoipa::path(
    put,
    path = "/users/me",
    params(ApiVersion),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated the user", body = domain::users::Model),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a user")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT update user {} with {params:?}", user.id);
    params.validate()?;

    let updated = UserApi::update_profile(app_state.db_conn_ref(), user.id, params.into()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), updated)))
}

/// PUT change the password of the calling user
#[utoipa::path(
    put,
    path = "/users/me/password",
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
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<UpdatePasswordParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT update password for user {}", user.id);
    params.validate()?;

    UserApi::change_password(
        app_state.db_conn_ref(),
        user.id,
        &params.current_password,
        params.new_password,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::NO_CONTENT.into(), ())))
}

/// DELETE deactivate the calling user's account
#[utoipa::path(
    delete,
    path = "/users/me",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully deactivated the user"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not a user")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    info!("DELETE deactivate user {}", user.id);

    UserApi::deactivate(app_state.db_conn_ref(), user.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::NO_CONTENT.into(), ())))
}
