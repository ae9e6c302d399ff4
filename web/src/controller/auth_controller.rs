use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_account::AuthenticatedAccount, compare_api_version::CompareApiVersion,
};
use crate::params::auth::{LoginParams, RefreshTokenParams, RegisterCoachParams, RegisterUserParams};
use crate::response::account::{AccountResponse, AuthenticatedResponse};
use crate::{AppState, Error};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::account_type::AccountType;
use domain::auth as AuthApi;
use log::*;
use service::config::ApiVersion;
use validator::Validate;

/// POST register a new user account
#[utoipa::path(
    post,
    path = "/auth/users/register",
    params(ApiVersion),
    request_body = RegisterUserParams,
    responses(
        (status = 201, description = "Successfully registered a new user", body = AuthenticatedResponse),
        (status = 400, description = "Bad Request"),
        (status = 409, description = "Email address already registered"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn register_user(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Json(params): Json<RegisterUserParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST register user {}", params.email);
    params.validate()?;

    let authenticated =
        AuthApi::register_user(app_state.db_conn_ref(), &app_state.config, params.into()).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::CREATED.into(),
        AuthenticatedResponse::from(authenticated),
    )))
}

/// POST register a new coach account
#[utoipa::path(
    post,
    path = "/auth/coaches/register",
    params(ApiVersion),
    request_body = RegisterCoachParams,
    responses(
        (status = 201, description = "Successfully registered a new coach", body = AuthenticatedResponse),
        (status = 400, description = "Bad Request"),
        (status = 409, description = "Email address already registered"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn register_coach(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Json(params): Json<RegisterCoachParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST register coach {}", params.email);
    params.validate()?;

    let authenticated =
        AuthApi::register_coach(app_state.db_conn_ref(), &app_state.config, params.into()).await?;

    Ok(Json(ApiResponse::new(
        StatusCode::CREATED.into(),
        AuthenticatedResponse::from(authenticated),
    )))
}

/// POST log in as a user
#[utoipa::path(
    post,
    path = "/auth/users/login",
    params(ApiVersion),
    request_body = LoginParams,
    responses(
        (status = 200, description = "Successfully logged in", body = AuthenticatedResponse),
        (status = 401, description = "Unknown email, wrong password or inactive account")
    )
)]
pub async fn login_user(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Json(params): Json<LoginParams>,
) -> Result<impl IntoResponse, Error> {
    login(&app_state, AccountType::User, params).await
}

/// POST log in as a coach
#[utoipa::path(
    post,
    path = "/auth/coaches/login",
    params(ApiVersion),
    request_body = LoginParams,
    responses(
        (status = 200, description = "Successfully logged in", body = AuthenticatedResponse),
        (status = 401, description = "Unknown email, wrong password or inactive account")
    )
)]
pub async fn login_coach(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Json(params): Json<LoginParams>,
) -> Result<impl IntoResponse, Error> {
    login(&app_state, AccountType::Coach, params).await
}

async fn login(
    app_state: &AppState,
    account_type: AccountType,
    params: LoginParams,
) -> Result<Json<ApiResponse<AuthenticatedResponse>>, Error> {
    params.validate()?;

    let authenticated = app_state
        .monitor
        .instrument(
            "login",
            AuthApi::login(
                app_state.db_conn_ref(),
                &app_state.config,
                account_type,
                &params.email,
                &params.password,
            ),
        )
        .await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        AuthenticatedResponse::from(authenticated),
    )))
}

/// POST exchange a refresh token for a new token pair
///
/// The presented refresh token is consumed; reusing it fails with 401.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    params(ApiVersion),
    request_body = RefreshTokenParams,
    responses(
        (status = 200, description = "Issued a new token pair", body = AuthenticatedResponse),
        (status = 401, description = "Invalid, expired or already used refresh token")
    )
)]
pub async fn refresh(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Json(params): Json<RefreshTokenParams>,
) -> Result<impl IntoResponse, Error> {
    params.validate()?;

    let authenticated = app_state
        .monitor
        .instrument(
            "refresh_token",
            AuthApi::refresh(
                app_state.db_conn_ref(),
                &app_state.config,
                &params.refresh_token,
            ),
        )
        .await?;

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        AuthenticatedResponse::from(authenticated),
    )))
}

/// POST revoke a single refresh token
#[utoipa::path(
    post,
    path = "/auth/logout",
    params(ApiVersion),
    request_body = RefreshTokenParams,
    responses(
        (status = 200, description = "Refresh token revoked"),
        (status = 401, description = "Malformed or expired refresh token")
    )
)]
pub async fn logout(
    CompareApiVersion(_v): CompareApiVersion,
    State(app_state): State<AppState>,
    Json(params): Json<RefreshTokenParams>,
) -> Result<impl IntoResponse, Error> {
    params.validate()?;

    AuthApi::logout(
        app_state.db_conn_ref(),
        &app_state.config,
        &params.refresh_token,
    )
    .await?;

    Ok(Json(ApiResponse::<()>::no_content(
        StatusCode::NO_CONTENT.into(),
    )))
}

/// POST revoke every refresh token of the calling account
#[utoipa::path(
    post,
    path = "/auth/logout_all",
    params(ApiVersion),
    responses(
        (status = 200, description = "Number of revoked refresh tokens", body = u64),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout_all(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedAccount(account): AuthenticatedAccount,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let revoked = AuthApi::logout_all(app_state.db_conn_ref(), &account).await?;
    info!("Revoked {revoked} refresh token(s) for {}", account.email());

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), revoked)))
}

/// GET the account behind the presented access token
#[utoipa::path(
    get,
    path = "/auth/me",
    params(ApiVersion),
    responses(
        (status = 200, description = "The authenticated account", body = AccountResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedAccount(account): AuthenticatedAccount,
) -> Result<impl IntoResponse, Error> {
    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        AccountResponse::from(account),
    )))
}
