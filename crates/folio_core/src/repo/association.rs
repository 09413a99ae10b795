//! Many-to-many link management between content and taxonomy terms.
//!
//! # Responsibility
//! - Replace the full link set of one kind for one content row atomically.
//! - Load linked terms for a batch of content rows in a single query.
//!
//! # Invariants
//! - Links are only ever written through [`write_links`]: delete all, then
//!   insert the new set. No incremental add/remove.
//! - A failed replace leaves the previous link set untouched.
//! - Only live (non-tombstoned) owners can have their links replaced.

use crate::model::content::ContentId;
use crate::model::from_millis;
use crate::model::taxonomy::{Term, TermId};
use crate::repo::error::{constraint_kind, ConstraintKind, RepoError, RepoResult};
use crate::repo::taxonomy_repo::TaxonomyStorage;
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::collections::{BTreeSet, HashMap};

/// Which relation a link table represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Tag,
    Category,
}

/// Layout of one join table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTable {
    pub table: &'static str,
    pub owner_table: &'static str,
    pub owner_column: &'static str,
    pub owner_entity: &'static str,
    pub term_column: &'static str,
    pub term_entity: &'static str,
}

/// Replaces link sets inside one IMMEDIATE transaction per call.
#[derive(Debug, Clone, Copy)]
pub struct AssociationReplacer<'conn> {
    conn: &'conn Connection,
}

impl<'conn> AssociationReplacer<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Removes every existing link in `links` for `owner_id` and inserts
    /// exactly `term_ids`. An empty slice clears the set.
    ///
    /// # Errors
    /// - `NotFound` for a missing/tombstoned owner or a missing term id.
    /// - `Store` for any other failure. Nothing is written in either case.
    pub fn replace(
        &self,
        links: LinkTable,
        owner_id: ContentId,
        term_ids: &[TermId],
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !owner_is_live(&tx, links, owner_id)? {
            return Err(RepoError::not_found(links.owner_entity, owner_id));
        }

        let written = match write_links(&tx, links, owner_id, term_ids) {
            Ok(written) => written,
            Err(err) => {
                warn!(
                    "event=association_replace module=repo status=error table={} owner_id={} error={}",
                    links.table, owner_id, err
                );
                return Err(err);
            }
        };
        tx.commit()?;

        debug!(
            "event=association_replace module=repo status=ok table={} owner_id={} links={}",
            links.table, owner_id, written
        );
        Ok(())
    }
}

/// Delete-then-insert step shared by `replace` and content creation.
///
/// Must run inside a transaction owned by the caller. Returns the number of
/// links written after deduplication.
pub(crate) fn write_links(
    conn: &Connection,
    links: LinkTable,
    owner_id: ContentId,
    term_ids: &[TermId],
) -> RepoResult<usize> {
    conn.execute(
        &format!(
            "DELETE FROM {} WHERE {} = ?1;",
            links.table, links.owner_column
        ),
        [owner_id],
    )?;

    let unique: BTreeSet<TermId> = term_ids.iter().copied().collect();
    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {} ({}, {}) VALUES (?1, ?2);",
        links.table, links.owner_column, links.term_column
    ))?;
    for term_id in &unique {
        stmt.execute(params![owner_id, term_id])
            .map_err(|err| match constraint_kind(&err) {
                Some(ConstraintKind::ForeignKey) => {
                    RepoError::not_found(links.term_entity, term_id)
                }
                _ => err.into(),
            })?;
    }

    Ok(unique.len())
}

/// Loads terms linked to each of `owner_ids`, ordered by title.
///
/// Owners without links are absent from the map.
pub(crate) fn load_terms<T: TaxonomyStorage>(
    conn: &Connection,
    links: LinkTable,
    owner_ids: &[ContentId],
) -> RepoResult<HashMap<ContentId, Vec<Term<T>>>> {
    let mut grouped: HashMap<ContentId, Vec<Term<T>>> = HashMap::new();
    if owner_ids.is_empty() {
        return Ok(grouped);
    }

    let placeholders = vec!["?"; owner_ids.len()].join(", ");
    let sql = format!(
        "SELECT
            l.{owner} AS owner_id,
            t.id AS id,
            t.title AS title,
            t.created_at AS created_at,
            t.updated_at AS updated_at
         FROM {links} l
         INNER JOIN {terms} t ON t.id = l.{term}
         WHERE l.{owner} IN ({placeholders})
         ORDER BY t.title ASC, t.id ASC;",
        owner = links.owner_column,
        links = links.table,
        terms = T::TABLE,
        term = links.term_column,
    );

    let mut stmt = conn.prepare(&sql)?;
    let binds = owner_ids.iter().map(|id| Value::Integer(*id));
    let mut rows = stmt.query(params_from_iter(binds))?;
    while let Some(row) = rows.next()? {
        let owner_id: ContentId = row.get("owner_id")?;
        grouped
            .entry(owner_id)
            .or_default()
            .push(read_term_row(row)?);
    }

    Ok(grouped)
}

/// Decodes `id, title, created_at, updated_at` into a term.
pub(crate) fn read_term_row<T: TaxonomyStorage>(row: &Row<'_>) -> RepoResult<Term<T>> {
    let created_at: i64 = row.get("created_at")?;
    let updated_at: i64 = row.get("updated_at")?;
    let decode = |value: i64, column: &str| {
        from_millis(value).ok_or_else(|| {
            RepoError::invalid_data(T::ENTITY, format!("{column} out of range: {value}"))
        })
    };

    Ok(Term::from_parts(
        row.get("id")?,
        row.get::<_, String>("title")?,
        decode(created_at, "created_at")?,
        decode(updated_at, "updated_at")?,
    ))
}

fn owner_is_live(conn: &Connection, links: LinkTable, owner_id: ContentId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!(
            "SELECT EXISTS(
                SELECT 1
                FROM {}
                WHERE id = ?1
                  AND deleted_at IS NULL
            );",
            links.owner_table
        ),
        [owner_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
