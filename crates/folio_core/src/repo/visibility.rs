//! Publish-time visibility rule.
//!
//! # Invariants
//! - `PublishedOnly` admits a row iff `published_at` is set and `<= now`.
//! - `All` admits drafts and scheduled rows.
//! - The rule is applied as a query predicate, before counting and paging.

use crate::model::to_millis;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;

/// Read mode for content queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Public reads.
    PublishedOnly,
    /// Administrative reads.
    All,
}

impl From<bool> for Visibility {
    /// Maps an `only_published` flag.
    fn from(only_published: bool) -> Self {
        if only_published {
            Self::PublishedOnly
        } else {
            Self::All
        }
    }
}

impl Visibility {
    pub fn admits(self, published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::PublishedOnly => published_at.is_some_and(|published| published <= now),
        }
    }

    /// SQL form of [`Visibility::admits`] for `column`, with its bind value.
    ///
    /// Returns `None` when no restriction applies.
    pub fn sql_predicate(self, column: &str, now: DateTime<Utc>) -> Option<(String, Value)> {
        match self {
            Self::All => None,
            Self::PublishedOnly => Some((
                format!("{column} IS NOT NULL AND {column} <= ?"),
                Value::Integer(to_millis(now)),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Visibility;
    use chrono::{Duration, Utc};
    use rusqlite::types::Value;

    #[test]
    fn published_only_excludes_drafts_and_scheduled_items() {
        let now = Utc::now();
        let mode = Visibility::from(true);
        assert!(!mode.admits(None, now));
        assert!(!mode.admits(Some(now + Duration::minutes(1)), now));
        assert!(mode.admits(Some(now), now));
        assert!(mode.admits(Some(now - Duration::hours(1)), now));
    }

    #[test]
    fn all_admits_everything() {
        let now = Utc::now();
        let mode = Visibility::from(false);
        assert!(mode.admits(None, now));
        assert!(mode.admits(Some(now + Duration::days(3)), now));
        assert!(mode.sql_predicate("c.published_at", now).is_none());
    }

    #[test]
    fn predicate_binds_now_in_millis() {
        let now = Utc::now();
        let (sql, bind) = Visibility::PublishedOnly
            .sql_predicate("c.published_at", now)
            .unwrap();
        assert_eq!(sql, "c.published_at IS NOT NULL AND c.published_at <= ?");
        assert_eq!(bind, Value::Integer(now.timestamp_millis()));
    }
}
