//! Plain data records for content and taxonomy.
//!
//! # Responsibility
//! - Define the record shapes handed to and returned by repositories.
//! - Describe per-kind storage layout through `ContentKind` / `TaxonomyKind`.
//!
//! # Invariants
//! - Records carry no persistence behavior; repositories own all SQL.
//! - Deletion of content is a tombstone (`deleted_at`), never a hard delete.

pub mod content;
pub mod taxonomy;
mod time;

pub use time::{from_millis, to_millis};
