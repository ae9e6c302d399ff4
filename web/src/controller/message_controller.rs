use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_account::AuthenticatedAccount, compare_api_version::CompareApiVersion,
};
use crate::params::message::{IndexParams, SendParams};
use crate::response::message::ConversationSummaryResponse;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{message as MessageApi, Id};
use log::*;
use service::config::ApiVersion;
use validator::Validate;

/// POST send a message to the other side: a coach when a user sends, a user when
/// a coach sends
#[utoipa::path(
    post,
    path = "/messages",
    params(ApiVersion),
    request_body = SendParams,
    responses(
        (status = 201, description = "Successfully sent the message", body = domain::messages::Model),
        (status = 400, description = "Empty or oversized body"),
        (status = 404, description = "Recipient not found or inactive")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedAccount(account): AuthenticatedAccount,
    State(app_state): State<AppState>,
    Json(params): Json<SendParams>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST message from {} to {}",
        account.email(),
        params.recipient_id
    );
    params.validate()?;

    let message = MessageApi::send(
        app_state.db_conn_ref(),
        &app_state.event_publisher,
        &account,
        params.recipient_id,
        &params.body,
    )
    .await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), message)))
}

/// GET the conversation with one counterpart, oldest message first
#[utoipa::path(
    get,
    path = "/messages",
    params(ApiVersion, IndexParams),
    responses(
        (status = 200, description = "Successfully retrieved the conversation", body = [domain::messages::Model]),
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
    debug!(
        "GET conversation between {} and {}",
        account.email(),
        params.counterpart_id
    );

    let messages =
        MessageApi::conversation(app_state.db_conn_ref(), &account, params.counterpart_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), messages)))
}

/// GET one summary per counterpart with the latest message and unread count
#[utoipa::path(
    get,
    path = "/messages/conversations",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved conversations", body = [ConversationSummaryResponse]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn conversations(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedAccount(account): AuthenticatedAccount,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    let summaries: Vec<ConversationSummaryResponse> =
        MessageApi::conversations(app_state.db_conn_ref(), &account)
            .await?
            .into_iter()
            .map(ConversationSummaryResponse::from)
            .collect();

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), summaries)))
}

/// PUT mark a received message as read
#[utoipa::path(
    put,
    path = "/messages/{id}/read",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Message id to mark as read")
    ),
    responses(
        (status = 200, description = "Successfully marked the message as read", body = domain::messages::Model),
        (status = 403, description = "Caller is not the recipient"),
        (status = 404, description = "Message not found")
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
    let message = MessageApi::mark_read(app_state.db_conn_ref(), &account, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), message)))
}

/// PUT mark every message received from one counterpart as read
#[utoipa::path(
    put,
    path = "/messages/conversations/{id}/read",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "The other side of the conversation")
    ),
    responses(
        (status = 200, description = "Number of messages marked as read", body = u64),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_conversation_read(
    CompareApiVersion(_v): CompareApiVersion,
    AuthenticatedAccount(account): AuthenticatedAccount,
    State(app_state): State<AppState>,
    Path(counterpart_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    let updated =
        MessageApi::mark_conversation_read(app_state.db_conn_ref(), &account, counterpart_id)
            .await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), updated)))
}
