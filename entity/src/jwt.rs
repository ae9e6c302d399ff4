use serde::Serialize;
use utoipa::ToSchema;

/// An access/refresh token pair handed to a client after login, registration
/// or refresh.
/// Note: This struct does not have a corresponding entity in the database.
///
/// - `access_token`: short-lived bearer token sent on every request.
/// - `refresh_token`: long-lived token exchanged at `/auth/refresh`; it is
///   single use and rotated on every exchange.
/// - `expires_in`: lifetime of the access token in seconds.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[schema(as = jwt::TokenPair)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenPair {
    pub fn bearer(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}
