use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_account::{AuthenticatedAccount, AuthenticatedCoach, AuthenticatedUser},
    compare_api_version::CompareApiVersion,
};
use crate::params::session::{
    CancelParams, CreateParams, IndexParams, RescheduleParams, UpdateParams,
};
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{session as SessionApi, Id};
use log::*;
use service::config::ApiVersion;
use validator::Validate;

/// POST book a session in one of a coach's time slots
#[utoipa::path(
    post,
    path = "/sessions",
    params(ApiVersion),
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully booked a session", body = domain::sessions::Model),
        (status = 400, description = "Slot too short or in the past, or discount not redeemable"),
        (status = 403, description = "Caller is not a user"),
        (status = 404, description = "Coach, booking type, slot or discount not found"),
        (status = 409, description = "Slot is no longer available")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedUser(user): AuthenticatedUser,
    State(app_state): State<AppState>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST book session for user {}: {params:?}", user.id);
    params.validate()?;

    let session = app_state
        .monitor
        .instrument(
            "book_session",
            SessionApi::book(
                app_state.db_conn_ref(),
                &app_state.event_publisher,
                &user,
                params.into(),
            ),
        )
        .await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), session)))
}

/// GET the sessions the caller takes part in, newest first
#[utoipa::path(
    get,
    path = "/sessions",
    params(ApiVersion, IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved sessions", body = [domain::sessions::Model]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn index(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedAccount(account): AuthenticatedAccount,
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET sessions for {}: {params:?}", account.email());

    let sessions =
        SessionApi::find_by_account(app_state.db_conn_ref(), &account, params.into()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), sessions)))
}

/// GET a session the caller takes part in
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Session id to retrieve")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the session", body = domain::sessions::Model),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Session not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedAccount(account): AuthenticatedAccount,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET session by id: {id}");

    let session = SessionApi::find_for_participant(app_state.db_conn_ref(), &account, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), session)))
}

/// PUT update notes, meeting link or status of a session the coach owns
#[utoipa::path(
    put,
    path = "/sessions/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Session id to update")
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated the session", body = domain::sessions::Model),
        (status = 403, description = "Session belongs to another coach"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Status transition not allowed")
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
    debug!("PUT update session {id} with {params:?}");

    let session = SessionApi::update(
        app_state.db_conn_ref(),
        &app_state.event_publisher,
        coach.id,
        id,
        params.into(),
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), session)))
}

/// PUT cancel a session and free its time slot
#[utoipa::path(
    put,
    path = "/sessions/{id}/cancel",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Session id to cancel")
    ),
    request_body = CancelParams,
    responses(
        (status = 200, description = "Successfully cancelled the session", body = domain::sessions::Model),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Session is already cancelled or completed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn cancel(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedAccount(account): AuthenticatedAccount,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<CancelParams>,
) -> Result<impl IntoResponse, Error> {
    info!("PUT cancel session {id} by {}", account.email());
    params.validate()?;

    let session = app_state
        .monitor
        .instrument(
            "cancel_session",
            SessionApi::cancel(
                app_state.db_conn_ref(),
                &app_state.event_publisher,
                &account,
                id,
                params.reason,
            ),
        )
        .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), session)))
}

/// PUT move a session to another time slot of the same coach
#[utoipa::path(
    put,
    path = "/sessions/{id}/reschedule",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Session id to reschedule")
    ),
    request_body = RescheduleParams,
    responses(
        (status = 200, description = "Successfully rescheduled the session", body = domain::sessions::Model),
        (status = 400, description = "New slot is too short or in the past"),
        (status = 403, description = "Caller is not a participant"),
        (status = 404, description = "Session or slot not found"),
        (status = 409, description = "Session is final or the new slot is taken")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn reschedule(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedAccount(account): AuthenticatedAccount,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<RescheduleParams>,
) -> Result<impl IntoResponse, Error> {
    info!(
        "PUT reschedule session {id} to slot {} by {}",
        params.time_slot_id,
        account.email()
    );

    let session = app_state
        .monitor
        .instrument(
            "reschedule_session",
            SessionApi::reschedule(
                app_state.db_conn_ref(),
                &app_state.event_publisher,
                &account,
                id,
                params.time_slot_id,
            ),
        )
        .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), session)))
}

/// DELETE remove a cancelled session the coach owns
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Session id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted the session"),
        (status = 403, description = "Session belongs to another coach"),
        (status = 404, description = "Session not found"),
        (status = 409, description = "Only cancelled sessions can be deleted")
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
    info!("DELETE session {id} by coach {}", coach.id);

    SessionApi::delete(app_state.db_conn_ref(), coach.id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::NO_CONTENT.into(), ())))
}
