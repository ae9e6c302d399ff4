//! This module holds typed parameters for various endpoint inputs.
//!
//! The purpose of this module is to define and manage the parameters that are used as inputs
//! for different endpoints in the web application. By using typed parameters, we can ensure
//! that the inputs are validated (by type and by `validator` rules) and correctly formatted
//! before they are processed by the application logic.
//!
//! Each parameter type converts into the matching `domain` input struct, so the domain layer
//! never sees HTTP-specific shapes.

pub(crate) mod auth;
pub(crate) mod booking_type;
pub(crate) mod coach;
pub(crate) mod custom_service;
pub(crate) mod discount;
pub(crate) mod message;
pub(crate) mod notification;
pub(crate) mod password;
pub(crate) mod payment;
pub(crate) mod session;
pub(crate) mod time_slot;
pub(crate) mod user;

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
/// so nullable columns can be cleared.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        bio: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_present_are_distinct() {
        let absent: Patch = serde_json::from_value(json!({})).unwrap();
        let null: Patch = serde_json::from_value(json!({"bio": null})).unwrap();
        let present: Patch = serde_json::from_value(json!({"bio": "Hi"})).unwrap();

        assert_eq!(absent.bio, None);
        assert_eq!(null.bio, Some(None));
        assert_eq!(present.bio, Some(Some("Hi".to_string())));
    }
}
