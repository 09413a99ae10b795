//! Repository error taxonomy and SQLite failure classification.

use crate::db::DbError;
use rusqlite::ffi;
use rusqlite::ErrorCode;
use std::fmt::Display;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by every repository operation.
///
/// Store failures are surfaced as-is and never retried here.
#[derive(Debug, Error)]
pub enum RepoError {
    /// No live row matched. Also returned for rows hidden by visibility.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
    /// A uniqueness invariant (title, slug) would be violated.
    #[error("{entity} conflicts with an existing row: {detail}")]
    Conflict { entity: &'static str, detail: String },
    #[error(transparent)]
    Store(#[from] DbError),
    #[error("invalid persisted {entity} data: {message}")]
    InvalidData {
        entity: &'static str,
        message: String,
    },
    /// Connection schema is not at the version this binary expects.
    #[error("connection schema version {actual_version} does not match expected {expected_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl RepoError {
    pub fn not_found(entity: &'static str, key: impl Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn invalid_data(entity: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidData {
            entity,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(DbError::Sqlite(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintKind {
    Unique,
    ForeignKey,
    Other,
}

/// Returns the violated constraint kind, if `err` is a constraint violation.
pub(crate) fn constraint_kind(err: &rusqlite::Error) -> Option<ConstraintKind> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            Some(match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    ConstraintKind::Unique
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
                _ => ConstraintKind::Other,
            })
        }
        _ => None,
    }
}

/// Maps uniqueness violations on a write to `Conflict`; everything else is a
/// store failure.
pub(crate) fn classify_write(err: rusqlite::Error, entity: &'static str) -> RepoError {
    if constraint_kind(&err) == Some(ConstraintKind::Unique) {
        let detail = match &err {
            rusqlite::Error::SqliteFailure(_, Some(message)) => message.clone(),
            other => other.to_string(),
        };
        return RepoError::Conflict { entity, detail };
    }
    err.into()
}
