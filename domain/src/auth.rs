//! Registration, login and token lifecycle for users and coaches.

use crate::account::Account;
use crate::error::Error;
use crate::jwt::{self, Claims, TokenPair, TokenType};
use chrono::{DateTime, Utc};
use email_address::EmailAddress;
use entity::account_type::AccountType;
use entity::{coaches, users, Id};
use entity_api::{coach, refresh_token, user};
use log::*;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::Serialize;
use service::config::Config;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Sign-up details for a new user.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub timezone: Option<String>,
}

/// Sign-up details for a new coach.
#[derive(Debug, Clone, Default)]
pub struct NewCoach {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub headline: Option<String>,
    pub timezone: Option<String>,
    pub currency: Option<String>,
}

/// What a successful registration, login or refresh hands back.
#[derive(Debug, Clone, Serialize)]
pub struct Authenticated {
    #[serde(flatten)]
    pub account: Account,
    pub tokens: TokenPair,
}

pub async fn register_user(
    db: &DatabaseConnection,
    config: &Config,
    new_user: NewUser,
) -> Result<Authenticated, Error> {
    let email = normalize_email(&new_user.email)?;
    validate_password(&new_user.password)?;
    let timezone = validate_timezone(new_user.timezone.as_deref())?;

    if user::find_by_email(db, &email).await?.is_some() {
        info!("Registration rejected, user email already taken");
        return Err(Error::conflict());
    }

    let now = Utc::now().fixed_offset();
    let txn = db.begin().await?;
    let created = user::create(
        &txn,
        users::Model {
            id: Id::nil(),
            email,
            password: new_user.password,
            first_name: new_user.first_name.trim().to_string(),
            last_name: new_user.last_name.trim().to_string(),
            phone: new_user.phone,
            timezone,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;
    let tokens = issue_tokens(&txn, config, AccountType::User, created.id, &created.email).await?;
    txn.commit().await?;

    info!("Registered user {}", created.id);
    Ok(Authenticated {
        account: Account::User(created),
        tokens,
    })
}

pub async fn register_coach(
    db: &DatabaseConnection,
    config: &Config,
    new_coach: NewCoach,
) -> Result<Authenticated, Error> {
    let email = normalize_email(&new_coach.email)?;
    validate_password(&new_coach.password)?;
    let timezone = validate_timezone(new_coach.timezone.as_deref())?;
    let currency = validate_currency(new_coach.currency.as_deref())?;

    if coach::find_by_email(db, &email).await?.is_some() {
        info!("Registration rejected, coach email already taken");
        return Err(Error::conflict());
    }

    let now = Utc::now().fixed_offset();
    let txn = db.begin().await?;
    let created = coach::create(
        &txn,
        coaches::Model {
            id: Id::nil(),
            email,
            password: new_coach.password,
            first_name: new_coach.first_name.trim().to_string(),
            last_name: new_coach.last_name.trim().to_string(),
            bio: new_coach.bio,
            headline: new_coach.headline,
            timezone,
            currency,
            is_active: true,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;
    let tokens = issue_tokens(&txn, config, AccountType::Coach, created.id, &created.email).await?;
    txn.commit().await?;

    info!("Registered coach {}", created.id);
    Ok(Authenticated {
        account: Account::Coach(created),
        tokens,
    })
}

/// Unknown email, wrong password and inactive account are indistinguishable
/// to the caller.
pub async fn login(
    db: &DatabaseConnection,
    config: &Config,
    account_type: AccountType,
    email: &str,
    password: &str,
) -> Result<Authenticated, Error> {
    let email = email.trim().to_lowercase();
    let account = match account_type {
        AccountType::User => user::find_by_email(db, &email).await?.map(Account::User),
        AccountType::Coach => coach::find_by_email(db, &email).await?.map(Account::Coach),
    };

    let account = match account {
        Some(account) if account.is_active() => account,
        _ => {
            debug!("Login rejected for unknown or inactive {account_type}");
            return Err(Error::unauthenticated());
        }
    };

    user::verify_password(password, account.password_hash()).await?;

    let tokens = issue_tokens(db, config, account_type, account.id(), account.email()).await?;
    info!("{account_type} {} logged in", account.id());
    Ok(Authenticated { account, tokens })
}

/// Exchanges a refresh token for a new pair. The presented token is consumed,
/// so replaying it fails.
pub async fn refresh(
    db: &DatabaseConnection,
    config: &Config,
    presented_token: &str,
) -> Result<Authenticated, Error> {
    let claims = jwt::decode_token(config, presented_token, TokenType::Refresh)?;
    let jti = claims.token_id()?;
    let subject_id = claims.subject_id()?;

    let stored = refresh_token::find_by_id(db, jti)
        .await?
        .ok_or_else(|| {
            warn!("Refresh token {jti} is not on record, possibly replayed");
            Error::unauthenticated()
        })?;

    if stored.token_hash != jwt::hash_token(presented_token) {
        warn!("Refresh token {jti} does not match its stored hash");
        return Err(Error::unauthenticated());
    }
    let owner = refresh_token::owner(&stored).map_err(|_| Error::unauthenticated())?;
    if owner != (claims.account_type, subject_id) {
        warn!("Refresh token {jti} presented for the wrong account");
        return Err(Error::unauthenticated());
    }
    if stored.expires_at < Utc::now() {
        return Err(Error::unauthenticated());
    }

    let account = find_active_account(db, claims.account_type, subject_id).await?;

    let txn = db.begin().await?;
    if !refresh_token::delete_by_id(&txn, jti).await? {
        // Lost a race against a concurrent refresh of the same token.
        return Err(Error::unauthenticated());
    }
    let tokens = issue_tokens(
        &txn,
        config,
        account.account_type(),
        account.id(),
        account.email(),
    )
    .await?;
    txn.commit().await?;

    debug!("Rotated refresh token {jti}");
    Ok(Authenticated { account, tokens })
}

/// Revokes one refresh token. Revoking an already revoked token succeeds.
pub async fn logout(
    db: &DatabaseConnection,
    config: &Config,
    presented_token: &str,
) -> Result<(), Error> {
    let claims = jwt::decode_token(config, presented_token, TokenType::Refresh)?;
    let jti = claims.token_id()?;
    if !refresh_token::delete_by_id(db, jti).await? {
        debug!("Logout for refresh token {jti} that was already revoked");
    }
    Ok(())
}

/// Revokes every refresh token of the account. Returns how many were revoked.
pub async fn logout_all(db: &DatabaseConnection, account: &Account) -> Result<u64, Error> {
    Ok(refresh_token::delete_all_for_account(db, account.account_type(), account.id()).await?)
}

/// Resolves the account behind a bearer access token.
pub async fn authenticate_access_token(
    db: &DatabaseConnection,
    config: &Config,
    token: &str,
) -> Result<Account, Error> {
    let claims: Claims = jwt::decode_token(config, token, TokenType::Access)?;
    find_active_account(db, claims.account_type, claims.subject_id()?).await
}

async fn find_active_account(
    db: &impl ConnectionTrait,
    account_type: AccountType,
    id: Id,
) -> Result<Account, Error> {
    let account = match account_type {
        AccountType::User => user::find_by_id(db, id).await.map(Account::User),
        AccountType::Coach => coach::find_by_id(db, id).await.map(Account::Coach),
    }
    .map_err(|_| Error::unauthenticated())?;

    if !account.is_active() {
        debug!("Rejected token of inactive {account_type} {id}");
        return Err(Error::unauthenticated());
    }
    Ok(account)
}

/// Signs a new access/refresh pair and records the refresh token.
pub(crate) async fn issue_tokens(
    db: &impl ConnectionTrait,
    config: &Config,
    account_type: AccountType,
    account_id: Id,
    email: &str,
) -> Result<TokenPair, Error> {
    let access = jwt::encode_token(config, account_type, account_id, email, TokenType::Access)?;
    let refresh = jwt::encode_token(config, account_type, account_id, email, TokenType::Refresh)?;

    let expires_at = DateTime::<Utc>::from_timestamp(refresh.claims.exp as i64, 0)
        .ok_or_else(|| Error::validation("Refresh token expiry out of range"))?;
    refresh_token::create(
        db,
        refresh.claims.token_id()?,
        account_type,
        account_id,
        jwt::hash_token(&refresh.token),
        expires_at.fixed_offset(),
    )
    .await?;

    Ok(TokenPair::bearer(
        access.token,
        refresh.token,
        config.access_token_ttl_secs as i64,
    ))
}

pub(crate) fn normalize_email(email: &str) -> Result<String, Error> {
    let email = email.trim().to_lowercase();
    if !EmailAddress::is_valid(&email) {
        return Err(Error::validation("A valid email address is required"));
    }
    Ok(email)
}

pub(crate) fn validate_password(password: &str) -> Result<(), Error> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Accepts IANA zone names such as `Europe/Berlin`; defaults to UTC.
pub(crate) fn validate_timezone(timezone: Option<&str>) -> Result<String, Error> {
    match timezone.map(str::trim).filter(|tz| !tz.is_empty()) {
        None => Ok(DEFAULT_TIMEZONE.to_string()),
        Some(tz) => tz
            .parse::<chrono_tz::Tz>()
            .map(|tz| tz.name().to_string())
            .map_err(|_| Error::validation(format!("Unknown timezone: {tz}"))),
    }
}

/// Three letter ISO 4217 style code, upper-cased; defaults to USD.
pub(crate) fn validate_currency(currency: Option<&str>) -> Result<String, Error> {
    match currency.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(coach::DEFAULT_CURRENCY.to_string()),
        Some(c) if c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic()) => {
            Ok(c.to_uppercase())
        }
        Some(c) => Err(Error::validation(format!("Unsupported currency: {c}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lower_cased() -> Result<(), Error> {
        assert_eq!(normalize_email("  Ada@Example.COM ")?, "ada@example.com");
        assert!(normalize_email("not-an-email").is_err());
        Ok(())
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn timezones_must_be_iana_names() -> Result<(), Error> {
        assert_eq!(validate_timezone(None)?, "UTC");
        assert_eq!(validate_timezone(Some("Europe/Berlin"))?, "Europe/Berlin");
        assert!(validate_timezone(Some("Mars/Olympus")).is_err());
        Ok(())
    }

    #[test]
    fn currencies_are_upper_cased() -> Result<(), Error> {
        assert_eq!(validate_currency(Some("eur"))?, "EUR");
        assert_eq!(validate_currency(None)?, "USD");
        assert!(validate_currency(Some("euro")).is_err());
        Ok(())
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::account::test_support;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
    use clap::Parser;
    use entity::refresh_tokens;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn config() -> Config {
        Config::parse_from(["booking_platform_rs"])
            .set_jwt_secrets("access-secret".to_string(), "refresh-secret".to_string())
    }

    fn stored_token(token: &str, claims: &Claims, user_id: Id) -> refresh_tokens::Model {
        let now = Utc::now();
        refresh_tokens::Model {
            id: claims.token_id().unwrap(),
            user_id: Some(user_id),
            coach_id: None,
            token_hash: jwt::hash_token(token),
            expires_at: (now + chrono::Duration::days(7)).into(),
            created_at: now.into(),
        }
    }

    fn is_unauthenticated(err: &Error) -> bool {
        err.error_kind
            == DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Unauthenticated,
            ))
    }

    #[tokio::test]
    async fn login_issues_a_token_pair_for_valid_credentials() -> Result<(), Error> {
        let user = test_support::user();
        let config = config();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user.clone()]])
            .append_query_results(vec![vec![refresh_tokens::Model {
                id: Id::new_v4(),
                user_id: Some(user.id),
                coach_id: None,
                token_hash: "hash".to_string(),
                expires_at: Utc::now().into(),
                created_at: Utc::now().into(),
            }]])
            .into_connection();

        let authenticated =
            login(&db, &config, AccountType::User, "USER@example.com", "password123").await?;

        assert_eq!(authenticated.account.id(), user.id);
        let claims =
            jwt::decode_token(&config, &authenticated.tokens.access_token, TokenType::Access)?;
        assert_eq!(claims.subject_id()?, user.id);
        assert_eq!(claims.account_type, AccountType::User);
        Ok(())
    }

    #[tokio::test]
    async fn login_rejects_a_wrong_password() {
        let user = test_support::user();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user]])
            .into_connection();

        let err = login(&db, &config(), AccountType::User, "user@example.com", "wrong-pass")
            .await
            .unwrap_err();

        assert!(is_unauthenticated(&err));
    }

    #[tokio::test]
    async fn login_rejects_inactive_accounts() {
        let mut coach = test_support::coach();
        coach.is_active = false;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![coach]])
            .into_connection();

        let err = login(&db, &config(), AccountType::Coach, "coach@example.com", "password123")
            .await
            .unwrap_err();

        assert!(is_unauthenticated(&err));
    }

    #[tokio::test]
    async fn refresh_rejects_a_token_that_is_no_longer_stored() -> Result<(), Error> {
        let config = config();
        let issued = jwt::encode_token(
            &config,
            AccountType::User,
            Id::new_v4(),
            "user@example.com",
            TokenType::Refresh,
        )?;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results::<refresh_tokens::Model, Vec<refresh_tokens::Model>, _>(vec![
                vec![],
            ])
            .into_connection();

        let err = refresh(&db, &config, &issued.token).await.unwrap_err();

        assert!(is_unauthenticated(&err));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_rotates_the_presented_token() -> Result<(), Error> {
        let config = config();
        let user = test_support::user();
        let issued = jwt::encode_token(
            &config,
            AccountType::User,
            user.id,
            &user.email,
            TokenType::Refresh,
        )?;
        let stored = stored_token(&issued.token, &issued.claims, user.id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored.clone()]])
            .append_query_results(vec![vec![user.clone()]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results(vec![vec![stored]])
            .into_connection();

        let authenticated = refresh(&db, &config, &issued.token).await?;

        assert_eq!(authenticated.account.id(), user.id);
        assert_ne!(authenticated.tokens.refresh_token, issued.token);
        Ok(())
    }

    #[tokio::test]
    async fn refresh_rejects_a_token_whose_hash_does_not_match() -> Result<(), Error> {
        let config = config();
        let user = test_support::user();
        let issued = jwt::encode_token(
            &config,
            AccountType::User,
            user.id,
            &user.email,
            TokenType::Refresh,
        )?;
        let mut stored = stored_token(&issued.token, &issued.claims, user.id);
        stored.token_hash = jwt::hash_token("some other token");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored]])
            .into_connection();

        let err = refresh(&db, &config, &issued.token).await.unwrap_err();

        assert!(is_unauthenticated(&err));
        Ok(())
    }

    #[tokio::test]
    async fn logout_of_an_unknown_token_succeeds() -> Result<(), Error> {
        let config = config();
        let issued = jwt::encode_token(
            &config,
            AccountType::Coach,
            Id::new_v4(),
            "coach@example.com",
            TokenType::Refresh,
        )?;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        logout(&db, &config, &issued.token).await
    }
}
