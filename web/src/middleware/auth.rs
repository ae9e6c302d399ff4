use crate::extractors::bearer_token;
use crate::{AppState, Error};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use domain::auth;
use domain::error::Error as DomainError;

/// Authentication middleware that returns 401 Unauthorized for requests without a
/// valid access token. The resolved account is stored in the request extensions
/// for the handler's extractors.
pub async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let token = bearer_token(request.headers()).ok_or_else(DomainError::unauthenticated)?;
    let account =
        auth::authenticate_access_token(app_state.db_conn_ref(), &app_state.config, token).await?;

    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use clap::Parser;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use service::config::Config;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "authenticated"
    }

    fn app() -> Router {
        let config = Config::parse_from(["booking_platform_rs"])
            .set_jwt_secrets("access-secret".to_string(), "refresh-secret".to_string());
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let app_state = AppState::new(config, &db);

        Router::new()
            .route("/test", get(test_handler))
            .route_layer(from_fn_with_state(app_state.clone(), require_auth))
            .with_state(app_state)
    }

    #[tokio::test]
    async fn test_require_auth_returns_401_without_a_token() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_require_auth_returns_401_with_a_garbage_token() {
        let request = Request::builder()
            .uri("/test")
            .header("authorization", "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
