use crate::controller::ApiResponse;
use crate::extractors::{
    authenticated_account::AuthenticatedCoach, compare_api_version::CompareApiVersion,
};
use crate::params::discount::{CreateParams, UpdateParams};
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{discount as DiscountApi, Id};
use log::*;
use service::config::ApiVersion;
use validator::Validate;

/// POST create a discount code for the calling coach
#[utoipa::path(
    post,
    path = "/discounts",
    params(ApiVersion),
    request_body = CreateParams,
    responses(
        (status = 201, description = "Successfully created a new discount", body = domain::discounts::Model),
        (status = 400, description = "Bad Request"),
        (status = 403, description = "Caller is not a coach"),
        (status = 409, description = "The coach already has a discount with this code")
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
    debug!("POST create discount {} for coach {}", params.code, coach.id);
    params.validate()?;

    let discount = DiscountApi::create(app_state.db_conn_ref(), coach.id, params.into()).await?;

    Ok(Json(ApiResponse::new(StatusCode::CREATED.into(), discount)))
}

/// GET all discounts of the calling coach
#[utoipa::path(
    get,
    path = "/discounts",
    params(ApiVersion),
    responses(
        (status = 200, description = "Successfully retrieved discounts", body = [domain::discounts::Model]),
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
    let discounts = DiscountApi::find_by_coach(app_state.db_conn_ref(), coach.id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), discounts)))
}

/// PUT update a discount owned by the calling coach
#[utoipa::path(
    put,
    path = "/discounts/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Discount id to update")
    ),
    request_body = UpdateParams,
    responses(
        (status = 200, description = "Successfully updated the discount", body = domain::discounts::Model),
        (status = 400, description = "Bad Request"),
        (status = 403, description = "Discount belongs to another coach"),
        (status = 404, description = "Discount not found"),
        (status = 409, description = "The coach already has a discount with this code")
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
    debug!("PUT update discount {id} with {params:?}");
    params.validate()?;

    let discount =
        DiscountApi::update(app_state.db_conn_ref(), coach.id, id, params.into()).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), discount)))
}

/// DELETE deactivate a discount owned by the calling coach
#[utoipa::path(
    delete,
    path = "/discounts/{id}",
    params(
        ApiVersion,
        ("id" = Uuid, Path, description = "Discount id to deactivate")
    ),
    responses(
        (status = 200, description = "Successfully deactivated the discount", body = domain::discounts::Model),
        (status = 403, description = "Discount belongs to another coach"),
        (status = 404, description = "Discount not found")
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
    debug!("DELETE discount {id}");

    let discount = DiscountApi::deactivate(app_state.db_conn_ref(), coach.id, id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), discount)))
}
