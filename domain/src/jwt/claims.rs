//! Claims carried by the access and refresh tokens issued to accounts.

use entity::account_type::AccountType;
use serde::{Deserialize, Serialize};

/// Distinguishes the two tokens of a pair so one cannot stand in for the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Registered claims plus the account type and email of the subject.
/// `sub` is the account id and `jti` is unique per token; for refresh tokens
/// it is also the primary key of the stored `refresh_tokens` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub account_type: AccountType,
    pub email: String,
    pub token_type: TokenType,
    pub jti: String,
    pub iat: u64,
    pub exp: u64,
    pub iss: String,
}
