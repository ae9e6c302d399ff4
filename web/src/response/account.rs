use domain::account::Account;
use domain::auth::Authenticated;
use domain::jwt::TokenPair;
use domain::{coaches, users};
use serde::Serialize;
use utoipa::ToSchema;

/// Either side of the platform, tagged by `account_type`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "account_type", content = "account", rename_all = "snake_case")]
pub(crate) enum AccountResponse {
    User(users::Model),
    Coach(coaches::Model),
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        match account {
            Account::User(user) => AccountResponse::User(user),
            Account::Coach(coach) => AccountResponse::Coach(coach),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthenticatedResponse {
    #[serde(flatten)]
    pub(crate) account: AccountResponse,
    pub(crate) tokens: TokenPair,
}

impl From<Authenticated> for AuthenticatedResponse {
    fn from(authenticated: Authenticated) -> Self {
        Self {
            account: authenticated.account.into(),
            tokens: authenticated.tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::Id;

    fn user() -> users::Model {
        let now = Utc::now().fixed_offset();
        users::Model {
            id: Id::new_v4(),
            email: "ada@example.com".to_string(),
            password: "hash".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: None,
            timezone: "UTC".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn matches_the_domain_serialization() {
        let account = Account::User(user());
        let expected = serde_json::to_value(&account).unwrap();
        let actual = serde_json::to_value(AccountResponse::from(account)).unwrap();

        assert_eq!(actual, expected);
        assert_eq!(actual["account_type"], "user");
        assert!(actual["account"].get("password").is_none());
    }

    #[test]
    fn tokens_sit_beside_the_account() {
        let authenticated = Authenticated {
            account: Account::User(user()),
            tokens: TokenPair::bearer("access".to_string(), "refresh".to_string(), 900),
        };
        let value = serde_json::to_value(AuthenticatedResponse::from(authenticated)).unwrap();

        assert_eq!(value["account_type"], "user");
        assert_eq!(value["tokens"]["token_type"], "Bearer");
        assert_eq!(value["tokens"]["expires_in"], 900);
    }
}
