use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_account::AuthenticatedAccount, compare_api_version::CompareApiVersion,
};
use crate::params::notification::IndexParams;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{notification as NotificationApi, Id};
use log::*;
use service::config::ApiVersion;

/// GET the caller's notifications, newest first
#[utoipa::path(
    get,
    path = "/notifications",
    params(ApiVersion, IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved notifications", body = [domain::notifications::Model]),
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
    debug!("GET notifications for {}: {params:?}", account.email());

    let notifications =
        NotificationApi::find_by_account(app_state.db_conn_ref(), &account, params.unread_only)
            .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), notifications)))
}

/// PUT mark one notification as read
#[utoipa::path(
    put,
    path = "/notifications/{id}/read",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Notification id to mark as read")
    ),
    responses(
        (status = 200, description = "Successfully marked the notification as read", body = domain::notifications::Model),
        (status = 403, description = "Notification belongs to another account"),
        (status = 404, description = "Notification not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedAccount(account): AuthenticatedAccount,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    let notification = NotificationApi::mark_read(app_state.db_conn_ref(), &account, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), notification)))
}

/// PUT mark all of the caller's notifications as read
#[utoipa::path(
    put,
    path = "/notifications/read_all",
    params(ApiVersion),
    responses(
        (status = 200, description = "Number of notifications marked as read", body = u64),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_all_read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedAccount(account): AuthenticatedAccount,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let updated = NotificationApi::mark_all_read(app_state.db_conn_ref(), &account).await?;
    debug!("Marked {updated} notification(s) read for {}", account.email());

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), updated)))
}

/// DELETE one of the caller's notifications
#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Notification id to delete")
    ),
    responses(
        (status = 200, description = "Successfully deleted the notification"),
        (status = 403, description = "Notification belongs to another account"),
        (status = 404, description = "Notification not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedAccount(account): AuthenticatedAccount,
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    NotificationApi::delete(app_state.db_conn_ref(), &account, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::NO_CONTENT.into(), ())))
}
