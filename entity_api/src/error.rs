//! Errors raised by the booking data layer.
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use sea_orm::error::{DbErr, RuntimeErr, SqlErr};

/// Postgres `exclusion_violation`, raised by the time slot overlap constraint.
const EXCLUSION_VIOLATION: &str = "23P01";

/// A failed read or write against the booking tables.
///
/// `error_kind` says whether the data itself was the problem (a missing row, a
/// duplicate email, an overlapping slot) or the database could not be reached.
#[derive(Debug, PartialEq)]
pub struct Error {
    pub source: Option<DbErr>,
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    /// An ID or filter value could not be parsed
    InvalidQueryTerm,
    /// No row matched, or an update touched no rows
    RecordNotFound,
    /// Credentials did not match the stored hash
    RecordUnauthenticated,
    /// A unique or foreign key constraint rejected the write
    RecordConflict,
    /// A stored row breaks a table rule, e.g. a refresh token with two owners
    ValidationError,
    /// Connection, pool or driver failure
    SystemError,
}

impl Error {
    fn kind(error_kind: EntityApiErrorKind) -> Self {
        Error {
            source: None,
            error_kind,
        }
    }

    pub(crate) fn not_found() -> Self {
        Self::kind(EntityApiErrorKind::RecordNotFound)
    }

    pub(crate) fn unauthenticated() -> Self {
        Self::kind(EntityApiErrorKind::RecordUnauthenticated)
    }

    pub(crate) fn invalid_query_term() -> Self {
        Self::kind(EntityApiErrorKind::InvalidQueryTerm)
    }

    pub(crate) fn invalid_record() -> Self {
        Self::kind(EntityApiErrorKind::ValidationError)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{:?}: {source}", self.error_kind),
            None => write!(f, "{:?}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        let error_kind = match (err.sql_err(), &err) {
            (Some(SqlErr::UniqueConstraintViolation(_)), _)
            | (Some(SqlErr::ForeignKeyConstraintViolation(_)), _) => {
                EntityApiErrorKind::RecordConflict
            }
            _ if is_exclusion_violation(&err) => EntityApiErrorKind::RecordConflict,
            (_, DbErr::RecordNotFound(_)) | (_, DbErr::RecordNotUpdated) => {
                EntityApiErrorKind::RecordNotFound
            }
            _ => EntityApiErrorKind::SystemError,
        };

        Error {
            source: Some(err),
            error_kind,
        }
    }
}

fn is_exclusion_violation(err: &DbErr) -> bool {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => e
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .is_some_and(|code| code == EXCLUSION_VIOLATION),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_map_to_record_not_found() {
        let error: Error = DbErr::RecordNotFound("users".to_string()).into();
        assert_eq!(error.error_kind, EntityApiErrorKind::RecordNotFound);

        let error: Error = DbErr::RecordNotUpdated.into();
        assert_eq!(error.error_kind, EntityApiErrorKind::RecordNotFound);
    }

    #[test]
    fn driver_errors_are_system_errors() {
        let error: Error = DbErr::Custom("boom".to_string()).into();
        assert_eq!(error.error_kind, EntityApiErrorKind::SystemError);
        assert!(error.to_string().starts_with("SystemError"));
    }

    #[test]
    fn only_database_errors_can_be_exclusion_violations() {
        let err = DbErr::Exec(RuntimeErr::Internal("23P01".to_string()));
        assert!(!is_exclusion_violation(&err));

        let error: Error = err.into();
        assert_eq!(error.error_kind, EntityApiErrorKind::SystemError);
    }

    #[test]
    fn constructed_errors_carry_no_source() {
        let error = Error::unauthenticated();
        assert!(error.source.is_none());
        assert_eq!(error.to_string(), "RecordUnauthenticated");
    }
}
