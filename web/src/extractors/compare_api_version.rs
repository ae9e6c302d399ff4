use crate::extractors::RejectionType;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use log::*;
use service::{config::ApiVersion, AppState};

/// Rejects requests whose `x-version` header does not name the API version this
/// server exposes.
pub(crate) struct CompareApiVersion(pub ApiVersion);

impl<S> FromRequestParts<S> for CompareApiVersion
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let Some(header) = parts.headers.get(ApiVersion::field_name()) else {
            debug!("Request is missing the {} header", ApiVersion::field_name());
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Missing {} header", ApiVersion::field_name()),
            ));
        };

        let requested = header.to_str().unwrap_or_default();
        if requested != app_state.config.api_version() {
            warn!(
                "Requested API version {requested} does not match {}",
                app_state.config.api_version()
            );
            return Err((
                StatusCode::BAD_REQUEST,
                format!(
                    "Unsupported API version, expected {}",
                    app_state.config.api_version()
                ),
            ));
        }

        Ok(CompareApiVersion(ApiVersion::new(ApiVersion::default_version())))
    }
}
