//! Tag/category repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Titles are unique per taxonomy kind; collisions surface as `Conflict`.
//! - Listing is ordered by `title ASC, id ASC`.
//! - Terms are never deleted here; only created and renamed.

use crate::model::taxonomy::{CategoryKind, TagKind, TaxonomyKind, Term, TermId};
use crate::model::to_millis;
use crate::repo::association::read_term_row;
use crate::repo::error::{classify_write, RepoError, RepoResult};
use crate::repo::ensure_schema_ready;
use crate::repo::pagination::{Page, PageWindow};
use chrono::Utc;
use log::info;
use rusqlite::{params, Connection};
use std::marker::PhantomData;

/// Storage layout for one taxonomy kind.
pub trait TaxonomyStorage: TaxonomyKind {
    const TABLE: &'static str;
}

impl TaxonomyStorage for TagKind {
    const TABLE: &'static str = "tags";
}

impl TaxonomyStorage for CategoryKind {
    const TABLE: &'static str = "categories";
}

/// Repository interface for taxonomy terms.
pub trait TaxonomyRepository<K: TaxonomyKind> {
    /// Lists one page of terms ordered alphabetically.
    fn list_all(&self, page: i64, page_size: i64) -> RepoResult<Page<Term<K>>>;
    /// Gets one term by id.
    fn get_by_id(&self, id: TermId) -> RepoResult<Term<K>>;
    /// Inserts a term and returns the stored record.
    fn create(&self, term: &Term<K>) -> RepoResult<Term<K>>;
    /// Changes the title of an existing term.
    fn rename(&self, id: TermId, new_title: &str) -> RepoResult<()>;
}

/// SQLite-backed taxonomy repository.
#[derive(Debug)]
pub struct SqliteTaxonomyRepository<'conn, K> {
    conn: &'conn Connection,
    kind: PhantomData<K>,
}

pub type SqliteTagRepository<'conn> = SqliteTaxonomyRepository<'conn, TagKind>;
pub type SqliteCategoryRepository<'conn> = SqliteTaxonomyRepository<'conn, CategoryKind>;

impl<'conn, K: TaxonomyStorage> SqliteTaxonomyRepository<'conn, K> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self {
            conn,
            kind: PhantomData,
        })
    }
}

impl<K: TaxonomyStorage> TaxonomyRepository<K> for SqliteTaxonomyRepository<'_, K> {
    fn list_all(&self, page: i64, page_size: i64) -> RepoResult<Page<Term<K>>> {
        let window = PageWindow::resolve(page, page_size);
        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", K::TABLE),
            [],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, title, created_at, updated_at
             FROM {}
             ORDER BY title ASC, id ASC
             LIMIT ?1 OFFSET ?2;",
            K::TABLE
        ))?;
        let mut rows = stmt.query(params![window.limit(), window.offset()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(read_term_row(row)?);
        }

        Ok(Page {
            items,
            total,
            window,
        })
    }

    fn get_by_id(&self, id: TermId) -> RepoResult<Term<K>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, title, created_at, updated_at FROM {} WHERE id = ?1;",
            K::TABLE
        ))?;
        let mut rows = stmt.query([id])?;
        let Some(row) = rows.next()? else {
            return Err(RepoError::not_found(K::ENTITY, id));
        };
        read_term_row(row)
    }

    fn create(&self, term: &Term<K>) -> RepoResult<Term<K>> {
        let now = to_millis(Utc::now());
        self.conn
            .execute(
                &format!(
                    "INSERT INTO {} (title, created_at, updated_at) VALUES (?1, ?2, ?2);",
                    K::TABLE
                ),
                params![term.title.as_str(), now],
            )
            .map_err(|err| classify_write(err, K::ENTITY))?;

        let id = self.conn.last_insert_rowid();
        info!(
            "event=taxonomy_create module=repo status=ok kind={} id={}",
            K::ENTITY,
            id
        );
        self.get_by_id(id)
    }

    fn rename(&self, id: TermId, new_title: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE {} SET title = ?1, updated_at = ?2 WHERE id = ?3;",
                    K::TABLE
                ),
                params![new_title, to_millis(Utc::now()), id],
            )
            .map_err(|err| classify_write(err, K::ENTITY))?;

        if changed == 0 {
            return Err(RepoError::not_found(K::ENTITY, id));
        }
        Ok(())
    }
}
