//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define content and taxonomy data-access contracts.
//! - Isolate SQL details, pagination and visibility from callers.
//!
//! # Invariants
//! - Repositories borrow one store handle constructed by the caller.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to store failures.

pub mod association;
pub mod content_repo;
pub mod error;
pub mod pagination;
pub(crate) mod query;
pub mod taxonomy_repo;
pub mod visibility;

use crate::db::migrations::{latest_version, schema_version};
use error::{RepoError, RepoResult};
use rusqlite::Connection;

/// Rejects connections that have not been migrated to the latest schema.
pub(crate) fn ensure_schema_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
