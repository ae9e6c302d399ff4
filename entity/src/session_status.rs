use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Eq, PartialEq, EnumIter, Deserialize, Serialize, DeriveActiveEnum, ToSchema, Default,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "session_status")]
pub enum SessionStatus {
    #[sea_orm(string_value = "scheduled")]
    #[default]
    Scheduled,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl SessionStatus {
    /// Whether a coach may move a session from `self` to `next` through an update.
    /// Cancellation has its own operation and is not a valid update target.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        matches!(
            (self, next),
            (SessionStatus::Scheduled, SessionStatus::Confirmed)
                | (SessionStatus::Scheduled, SessionStatus::Completed)
                | (SessionStatus::Confirmed, SessionStatus::Completed)
        ) || *self == next
    }

    /// Cancelled and completed sessions can no longer change.
    pub fn is_final(&self) -> bool {
        matches!(self, SessionStatus::Cancelled | SessionStatus::Completed)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Scheduled => write!(fmt, "scheduled"),
            SessionStatus::Confirmed => write!(fmt, "confirmed"),
            SessionStatus::Completed => write!(fmt, "completed"),
            SessionStatus::Cancelled => write!(fmt, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduled_sessions_can_be_confirmed_or_completed() {
        assert!(SessionStatus::Scheduled.can_transition_to(SessionStatus::Confirmed));
        assert!(SessionStatus::Scheduled.can_transition_to(SessionStatus::Completed));
        assert!(SessionStatus::Confirmed.can_transition_to(SessionStatus::Completed));
    }

    #[test]
    fn cancellation_and_reopening_are_not_update_transitions() {
        assert!(!SessionStatus::Scheduled.can_transition_to(SessionStatus::Cancelled));
        assert!(!SessionStatus::Completed.can_transition_to(SessionStatus::Scheduled));
        assert!(!SessionStatus::Confirmed.can_transition_to(SessionStatus::Scheduled));
    }

    #[test]
    fn final_states() {
        assert!(SessionStatus::Cancelled.is_final());
        assert!(SessionStatus::Completed.is_final());
        assert!(!SessionStatus::Confirmed.is_final());
    }
}
