use crate::{
    controller::{health_check_controller, metrics_controller},
    middleware::{auth::require_auth, metrics::track_metrics},
    params, response, sse, AppState,
};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};

use crate::controller::{
    auth_controller, booking_type_controller, coach, coach_controller, custom_service_controller,
    discount_controller, message_controller, notification_controller, payment_controller,
    session_controller, time_slot_controller, user_controller,
};

use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Booking Platform API"
        ),
        paths(
            auth_controller::register_user,
            auth_controller::register_coach,
            auth_controller::login_user,
            auth_controller::login_coach,
            auth_controller::refresh,
            auth_controller::logout,
            auth_controller::logout_all,
            auth_controller::me,
            user_controller::read,
            user_controller::update,
            user_controller::update_password,
            user_controller::delete,
            coach_controller::index,
            coach_controller::read,
            coach_controller::read_me,
            coach_controller::update_me,
            coach_controller::update_password,
            coach_controller::delete_me,
            coach::booking_type_controller::index,
            coach::time_slot_controller::index,
            coach::custom_service_controller::index,
            coach::discount_controller::validate,
            booking_type_controller::create,
            booking_type_controller::index,
            booking_type_controller::update,
            booking_type_controller::delete,
            time_slot_controller::create,
            time_slot_controller::index,
            time_slot_controller::update,
            time_slot_controller::delete,
            discount_controller::create,
            discount_controller::index,
            discount_controller::update,
            discount_controller::delete,
            custom_service_controller::create,
            custom_service_controller::index,
            custom_service_controller::update,
            custom_service_controller::delete,
            session_controller::create,
            session_controller::index,
            session_controller::read,
            session_controller::update,
            session_controller::cancel,
            session_controller::reschedule,
            session_controller::delete,
            payment_controller::create_order,
            payment_controller::capture_order,
            message_controller::create,
            message_controller::index,
            message_controller::conversations,
            message_controller::mark_read,
            message_controller::mark_conversation_read,
            notification_controller::index,
            notification_controller::mark_read,
            notification_controller::mark_all_read,
            notification_controller::delete,
            health_check_controller::health_check,
            metrics_controller::render,
        ),
        components(
            schemas(
                domain::booking_types::Model,
                domain::coaches::Model,
                domain::custom_services::Model,
                domain::discounts::Model,
                domain::messages::Model,
                domain::notifications::Model,
                domain::sessions::Model,
                domain::time_slots::Model,
                domain::users::Model,
                domain::jwts::TokenPair,
                domain::discount_kind::DiscountKind,
                domain::notification_kind::NotificationKind,
                domain::payment_status::PaymentStatus,
                domain::session_status::SessionStatus,
                params::auth::RegisterUserParams,
                params::auth::RegisterCoachParams,
                params::auth::LoginParams,
                params::auth::RefreshTokenParams,
                params::password::UpdatePasswordParams,
                params::user::UpdateParams,
                params::coach::UpdateParams,
                params::booking_type::CreateParams,
                params::booking_type::UpdateParams,
                params::time_slot::CreateParams,
                params::discount::CreateParams,
                params::discount::UpdateParams,
                params::discount::ValidateParams,
                params::custom_service::CreateParams,
                params::custom_service::UpdateParams,
                params::session::CreateParams,
                params::session::UpdateParams,
                params::session::CancelParams,
                params::session::RescheduleParams,
                params::payment::CaptureParams,
                params::message::SendParams,
                response::account::AccountResponse,
                response::account::AuthenticatedResponse,
                response::discount::DiscountQuoteResponse,
                response::message::ConversationSummaryResponse,
                response::payment::PaymentOrderResponse,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "booking_platform", description = "Coach Booking Platform API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines the bearer access token requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(auth_routes(app_state.clone()))
        .merge(auth_protected_routes(app_state.clone()))
        .merge(user_routes(app_state.clone()))
        .merge(coach_directory_routes(app_state.clone()))
        .merge(coach_routes(app_state.clone()))
        .merge(coach_user_routes(app_state.clone()))
        .merge(booking_type_routes(app_state.clone()))
        .merge(time_slot_routes(app_state.clone()))
        .merge(discount_routes(app_state.clone()))
        .merge(custom_service_routes(app_state.clone()))
        .merge(session_routes(app_state.clone()))
        .merge(payment_routes(app_state.clone()))
        .merge(message_routes(app_state.clone()))
        .merge(notification_routes(app_state.clone()))
        .merge(sse_routes(app_state.clone()))
        .merge(health_routes())
        .merge(metrics_routes(app_state))
        .route_layer(from_fn(track_metrics))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn auth_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/auth/users/register",
            post(auth_controller::register_user),
        )
        .route(
            "/auth/coaches/register",
            post(auth_controller::register_coach),
        )
        .route("/auth/users/login", post(auth_controller::login_user))
        .route("/auth/coaches/login", post(auth_controller::login_coach))
        .route("/auth/refresh", post(auth_controller::refresh))
        .route("/auth/logout", post(auth_controller::logout))
        .with_state(app_state)
}

fn auth_protected_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/logout_all", post(auth_controller::logout_all))
        .route("/auth/me", get(auth_controller::me))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn user_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/users/me",
            get(user_controller::read)
                .put(user_controller::update)
                .delete(user_controller::delete),
        )
        .route("/users/me/password", put(user_controller::update_password))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

// Public browsing of coaches and what they offer
fn coach_directory_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/coaches", get(coach_controller::index))
        .route("/coaches/{id}", get(coach_controller::read))
        .route(
            "/coaches/{id}/booking_types",
            get(coach::booking_type_controller::index),
        )
        .route(
            "/coaches/{id}/time_slots",
            get(coach::time_slot_controller::index),
        )
        .with_state(app_state)
}

fn coach_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/coaches/me",
            get(coach_controller::read_me)
                .put(coach_controller::update_me)
                .delete(coach_controller::delete_me),
        )
        .route(
            "/coaches/me/password",
            put(coach_controller::update_password),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

// Coach-scoped routes only a signed-in user may call
fn coach_user_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/coaches/{id}/custom_services",
            get(coach::custom_service_controller::index),
        )
        .route(
            "/coaches/{id}/discounts/validate",
            post(coach::discount_controller::validate),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn booking_type_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/booking_types",
            post(booking_type_controller::create).get(booking_type_controller::index),
        )
        .route(
            "/booking_types/{id}",
            put(booking_type_controller::update).delete(booking_type_controller::delete),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn time_slot_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/time_slots",
            post(time_slot_controller::create).get(time_slot_controller::index),
        )
        .route(
            "/time_slots/{id}",
            put(time_slot_controller::update).delete(time_slot_controller::delete),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn discount_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/discounts",
            post(discount_controller::create).get(discount_controller::index),
        )
        .route(
            "/discounts/{id}",
            put(discount_controller::update).delete(discount_controller::delete),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn custom_service_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/custom_services",
            post(custom_service_controller::create).get(custom_service_controller::index),
        )
        .route(
            "/custom_services/{id}",
            put(custom_service_controller::update).delete(custom_service_controller::delete),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn session_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/sessions",
            post(session_controller::create).get(session_controller::index),
        )
        .route(
            "/sessions/{id}",
            get(session_controller::read)
                .put(session_controller::update)
                .delete(session_controller::delete),
        )
        .route("/sessions/{id}/cancel", put(session_controller::cancel))
        .route(
            "/sessions/{id}/reschedule",
            put(session_controller::reschedule),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn payment_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/sessions/{id}/payments/paypal",
            post(payment_controller::create_order),
        )
        .route(
            "/payments/paypal/capture",
            post(payment_controller::capture_order),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn message_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/messages",
            post(message_controller::create).get(message_controller::index),
        )
        .route(
            "/messages/conversations",
            get(message_controller::conversations),
        )
        .route(
            "/messages/conversations/{id}/read",
            put(message_controller::mark_conversation_read),
        )
        .route("/messages/{id}/read", put(message_controller::mark_read))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn notification_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/notifications", get(notification_controller::index))
        .route(
            "/notifications/read_all",
            put(notification_controller::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            put(notification_controller::mark_read),
        )
        .route(
            "/notifications/{id}",
            delete(notification_controller::delete),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/sse", get(sse::handler::sse_handler))
        .route_layer(from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn metrics_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_controller::render))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/auth/users/register",
            "/coaches/{id}/time_slots",
            "/sessions/{id}/reschedule",
            "/payments/paypal/capture",
            "/messages/conversations",
            "/notifications/read_all",
            "/health",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn openapi_declares_bearer_security() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");

        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod route_tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use clap::Parser;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use service::config::Config;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = Config::parse_from(["booking_platform_rs", "--metrics-enabled", "false"])
            .set_jwt_secrets("access-secret".to_string(), "refresh-secret".to_string());
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        define_routes(AppState::new(config, &db))
    }

    fn versioned(method: &str, uri: &str) -> axum::http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("x-version", "1.0.0-beta1")
    }

    #[tokio::test]
    async fn health_is_public() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"healthy");
    }

    #[tokio::test]
    async fn metrics_are_unavailable_when_disabled() {
        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn protected_routes_require_a_bearer_token() {
        for (method, uri) in [
            ("GET", "/sessions"),
            ("POST", "/booking_types"),
            ("GET", "/notifications"),
            ("GET", "/coaches/me"),
            ("GET", "/sse"),
        ] {
            let request = versioned(method, uri).body(Body::empty()).unwrap();
            let response = app().oneshot(request).await.unwrap();

            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{method} {uri}"
            );
        }
    }

    #[tokio::test]
    async fn versioned_routes_reject_a_missing_version_header() {
        let request = Request::builder()
            .uri("/coaches")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn registration_body_is_validated_before_touching_the_database() {
        let request = versioned("POST", "/auth/users/register")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"email":"nope","password":"short","first_name":"A","last_name":"B"}"#,
            ))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rapidoc_serves_the_openapi_document() {
        let request = Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
