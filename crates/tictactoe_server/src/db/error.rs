//! Database error types.

use derive_more::{Display, Error};
use diesel::result::DatabaseErrorKind;
use tracing::instrument;

/// Broad classification of a database failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// A write lost against a concurrent writer: a uniqueness constraint
    /// fired or the game's version moved on.
    #[display("conflict")]
    Conflict,
    /// Stored data could not be mapped back to domain types.
    #[display("invalid data")]
    InvalidData,
    /// Anything else reported by SQLite or diesel.
    #[display("other")]
    Other,
}

/// Database error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Database error ({}): {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failure class.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a new database error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Other, message)
    }

    /// Creates a conflict error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Conflict, message)
    }

    /// Creates an error for stored values that do not parse.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::InvalidData, message)
    }

    #[track_caller]
    fn with_kind(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Whether the error means a concurrent writer won.
    pub fn is_conflict(&self) -> bool {
        self.kind == DbErrorKind::Conflict
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::conflict(format!("Unique constraint violated: {}", info.message()))
            }
            other => Self::new(format!("Diesel error: {}", other)),
        }
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(format!("Connection error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_not_a_conflict() {
        let err = DbError::from(diesel::result::Error::NotFound);
        assert_eq!(err.kind, DbErrorKind::Other);
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_location_is_recorded() {
        let err = DbError::conflict("stale version");
        assert!(err.is_conflict());
        assert!(err.file.ends_with("error.rs"));
        assert!(err.to_string().contains("conflict"));
    }
}
