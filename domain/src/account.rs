//! An authenticated principal: either a user or a coach.

use entity::account_type::AccountType;
use entity::{coaches, users, Id};
use events::Recipient;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "account_type", content = "account", rename_all = "snake_case")]
pub enum Account {
    User(users::Model),
    Coach(coaches::Model),
}

impl Account {
    pub fn id(&self) -> Id {
        match self {
            Account::User(user) => user.id,
            Account::Coach(coach) => coach.id,
        }
    }

    pub fn account_type(&self) -> AccountType {
        match self {
            Account::User(_) => AccountType::User,
            Account::Coach(_) => AccountType::Coach,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Account::User(user) => &user.email,
            Account::Coach(coach) => &coach.email,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Account::User(user) => user.is_active,
            Account::Coach(coach) => coach.is_active,
        }
    }

    pub fn full_name(&self) -> String {
        match self {
            Account::User(user) => user.full_name(),
            Account::Coach(coach) => coach.full_name(),
        }
    }

    pub(crate) fn password_hash(&self) -> &str {
        match self {
            Account::User(user) => &user.password,
            Account::Coach(coach) => &coach.password,
        }
    }

    /// Realtime/notification address of this account.
    pub fn recipient(&self) -> Recipient {
        recipient(self.account_type(), self.id())
    }
}

pub fn recipient(account_type: AccountType, id: Id) -> Recipient {
    match account_type {
        AccountType::User => Recipient::user(id),
        AccountType::Coach => Recipient::coach(id),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::Utc;

    pub fn user() -> users::Model {
        let now = Utc::now();
        users::Model {
            id: Id::new_v4(),
            email: "user@example.com".to_string(),
            password: entity_api::user::generate_hash("password123".to_string()),
            first_name: "Uma".to_string(),
            last_name: "User".to_string(),
            phone: None,
            timezone: "UTC".to_string(),
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    pub fn coach() -> coaches::Model {
        let now = Utc::now();
        coaches::Model {
            id: Id::new_v4(),
            email: "coach@example.com".to_string(),
            password: entity_api::user::generate_hash("password123".to_string()),
            first_name: "Casey".to_string(),
            last_name: "Coach".to_string(),
            bio: None,
            headline: None,
            timezone: "UTC".to_string(),
            currency: "USD".to_string(),
            is_active: true,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }
}
