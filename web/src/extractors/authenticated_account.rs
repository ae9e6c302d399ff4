use crate::extractors::bearer_token;
use crate::Error;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use domain::account::Account;
use domain::error::Error as DomainError;
use domain::{auth, coaches, users};
use log::*;
use service::AppState;

/// Any signed-in account. Reuses the account resolved by the `require_auth`
/// middleware when it ran, otherwise authenticates the bearer token itself.
pub(crate) struct AuthenticatedAccount(pub Account);

/// A signed-in user. Coaches are rejected with 403.
pub(crate) struct AuthenticatedUser(pub users::Model);

/// A signed-in coach. Users are rejected with 403.
pub(crate) struct AuthenticatedCoach(pub coaches::Model);

impl<S> FromRequestParts<S> for AuthenticatedAccount
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(account) = parts.extensions.get::<Account>() {
            return Ok(AuthenticatedAccount(account.clone()));
        }

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            trace!("No bearer token on request to {}", parts.uri.path());
            DomainError::unauthenticated()
        })?;

        let app_state = AppState::from_ref(state);
        let account =
            auth::authenticate_access_token(app_state.db_conn_ref(), &app_state.config, token)
                .await?;
        parts.extensions.insert(account.clone());

        Ok(AuthenticatedAccount(account))
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthenticatedAccount::from_request_parts(parts, state).await?.0 {
            Account::User(user) => Ok(AuthenticatedUser(user)),
            Account::Coach(coach) => {
                debug!("Coach {} called a user-only endpoint", coach.id);
                Err(DomainError::forbidden().into())
            }
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedCoach
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthenticatedAccount::from_request_parts(parts, state).await?.0 {
            Account::Coach(coach) => Ok(AuthenticatedCoach(coach)),
            Account::User(user) => {
                debug!("User {} called a coach-only endpoint", user.id);
                Err(DomainError::forbidden().into())
            }
        }
    }
}
