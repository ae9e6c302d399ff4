//! Encoding and validation of the JSON Web Tokens handed to users and coaches.
//!
//! Access and refresh tokens are HS256 signed with different secrets, so a
//! leaked refresh secret does not allow minting access tokens and vice versa.
//! Refresh tokens are persisted only as a SHA-256 hash (see [`hash_token`]).

use crate::error::Error;
use chrono::Utc;
use entity::account_type::AccountType;
use entity::Id;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use service::config::Config;
use sha2::{Digest, Sha256};

pub use claims::{Claims, TokenType};
// re-export the TokenPair struct from the entity module
pub use entity::jwt::TokenPair;

mod claims;

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

pub fn encode_token(
    config: &Config,
    account_type: AccountType,
    account_id: Id,
    email: &str,
    token_type: TokenType,
) -> Result<IssuedToken, Error> {
    let now = Utc::now().timestamp().max(0) as u64;
    let ttl = match token_type {
        TokenType::Access => config.access_token_ttl_secs,
        TokenType::Refresh => config.refresh_token_ttl_secs,
    };

    let claims = Claims {
        sub: account_id.to_string(),
        account_type,
        email: email.to_string(),
        token_type,
        jti: Id::new_v4().to_string(),
        iat: now,
        exp: now + ttl,
        iss: config.jwt_issuer().to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret(config, token_type)?.as_bytes()),
    )?;

    Ok(IssuedToken { token, claims })
}

/// Verifies signature, expiry, issuer and token type. Every failure is reported
/// as unauthenticated.
pub fn decode_token(config: &Config, token: &str, expected: TokenType) -> Result<Claims, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[config.jwt_issuer()]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret(config, expected)?.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        debug!("Rejected {expected:?} token: {e}");
        Error {
            source: Some(Box::new(e)),
            ..Error::unauthenticated()
        }
    })?
    .claims;

    if claims.token_type != expected {
        debug!(
            "Rejected token: expected {expected:?}, got {:?}",
            claims.token_type
        );
        return Err(Error::unauthenticated());
    }

    Ok(claims)
}

impl Claims {
    pub fn subject_id(&self) -> Result<Id, Error> {
        Id::parse_str(&self.sub).map_err(|_| Error::unauthenticated())
    }

    pub fn token_id(&self) -> Result<Id, Error> {
        Id::parse_str(&self.jti).map_err(|_| Error::unauthenticated())
    }
}

/// Hex encoded SHA-256 of an encoded token, as stored in `refresh_tokens`.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn secret(config: &Config, token_type: TokenType) -> Result<String, Error> {
    let secret = match token_type {
        TokenType::Access => config.jwt_access_secret(),
        TokenType::Refresh => config.jwt_refresh_secret(),
    };
    secret.ok_or_else(|| {
        warn!("Failed to get the JWT {token_type:?} secret from config");
        Error::config()
    })
}
