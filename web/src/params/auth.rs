use domain::auth::{NewCoach, NewUser};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub(crate) struct RegisterUserParams {
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) password: String,
    #[validate(length(min = 1, max = 100))]
    pub(crate) first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub(crate) last_name: String,
    #[validate(length(max = 32))]
    pub(crate) phone: Option<String>,
    pub(crate) timezone: Option<String>,
}

impl From<RegisterUserParams> for NewUser {
    fn from(params: RegisterUserParams) -> Self {
        NewUser {
            email: params.email,
            password: params.password,
            first_name: params.first_name,
            last_name: params.last_name,
            phone: params.phone,
            timezone: params.timezone,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub(crate) struct RegisterCoachParams {
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) password: String,
    #[validate(length(min = 1, max = 100))]
    pub(crate) first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub(crate) last_name: String,
    #[validate(length(max = 5000))]
    pub(crate) bio: Option<String>,
    #[validate(length(max = 200))]
    pub(crate) headline: Option<String>,
    pub(crate) timezone: Option<String>,
    #[validate(length(equal = 3))]
    pub(crate) currency: Option<String>,
}

impl From<RegisterCoachParams> for NewCoach {
    fn from(params: RegisterCoachParams) -> Self {
        NewCoach {
            email: params.email,
            password: params.password,
            first_name: params.first_name,
            last_name: params.last_name,
            bio: params.bio,
            headline: params.headline,
            timezone: params.timezone,
            currency: params.currency,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub(crate) struct LoginParams {
    #[validate(length(min = 1))]
    pub(crate) email: String,
    #[validate(length(min = 1))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub(crate) struct RefreshTokenParams {
    #[validate(length(min = 1))]
    pub(crate) refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registration_rejects_bad_email_and_short_password() {
        let params: RegisterUserParams = serde_json::from_value(json!({
            "email": "not-an-email",
            "password": "short",
            "first_name": "Uma",
            "last_name": "User"
        }))
        .unwrap();

        let errors = params.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn coach_currency_must_be_three_letters() {
        let params: RegisterCoachParams = serde_json::from_value(json!({
            "email": "coach@example.com",
            "password": "password123",
            "first_name": "Casey",
            "last_name": "Coach",
            "currency": "EURO"
        }))
        .unwrap();

        assert!(params.validate().is_err());
    }
}
