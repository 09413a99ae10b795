//! Content repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, publish scheduling, tombstoning and listing for one
//!   content kind (articles or portfolio items).
//! - Eagerly load tag/category associations for every returned record.
//!
//! # Invariants
//! - Every default read applies `deleted_at IS NULL`; only
//!   `get_by_id_unscoped` sees tombstoned rows.
//! - `get_by_slug` reports hidden and absent rows identically (`NotFound`).
//! - `update` never touches links or `published_at`.
//! - `create` writes the row and its links in one transaction.

use crate::model::content::{
    ArticleKind, Content, ContentId, ContentKind, NoExtras, PortfolioKind, PortfolioLinks,
};
use crate::model::taxonomy::{Category, CategoryKind, Tag, TagKind};
use crate::model::{from_millis, to_millis};
use crate::repo::association::{load_terms, write_links, AssociationReplacer, LinkKind, LinkTable};
use crate::repo::ensure_schema_ready;
use crate::repo::error::{classify_write, RepoError, RepoResult};
use crate::repo::pagination::{Page, PageWindow};
use crate::repo::query::{numbered_placeholders, ContentFilter};
use crate::repo::visibility::Visibility;
use crate::search::filter::{search_content, SearchQuery};
use chrono::{DateTime, Utc};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::marker::PhantomData;

const SHARED_COLUMNS: &[&str] = &["title", "slug", "short_description", "body"];
const TIMESTAMP_COLUMNS: &[&str] = &["created_at", "updated_at", "published_at", "deleted_at"];

/// Storage layout and row codec for one content kind.
pub trait ContentStorage: ContentKind {
    const TABLE: &'static str;
    /// Owner column name in this kind's link tables.
    const OWNER_COLUMN: &'static str;
    const TAG_LINKS: &'static str;
    const CATEGORY_LINKS: &'static str;
    /// `ORDER BY` body for `list_all`, over alias `c`.
    const LIST_ORDER: &'static str;
    const EXTRA_COLUMNS: &'static [&'static str];

    /// Bind values for [`ContentStorage::EXTRA_COLUMNS`], in order.
    fn extra_values(extra: &Self::Extra) -> Vec<Value>;

    fn read_extra(row: &Row<'_>) -> rusqlite::Result<Self::Extra>;

    fn link_table(kind: LinkKind) -> LinkTable {
        match kind {
            LinkKind::Tag => LinkTable {
                table: Self::TAG_LINKS,
                owner_table: Self::TABLE,
                owner_column: Self::OWNER_COLUMN,
                owner_entity: Self::ENTITY,
                term_column: "tag_id",
                term_entity: "tag",
            },
            LinkKind::Category => LinkTable {
                table: Self::CATEGORY_LINKS,
                owner_table: Self::TABLE,
                owner_column: Self::OWNER_COLUMN,
                owner_entity: Self::ENTITY,
                term_column: "category_id",
                term_entity: "category",
            },
        }
    }
}

impl ContentStorage for ArticleKind {
    const TABLE: &'static str = "articles";
    const OWNER_COLUMN: &'static str = "article_id";
    const TAG_LINKS: &'static str = "article_tags";
    const CATEGORY_LINKS: &'static str = "article_categories";
    const LIST_ORDER: &'static str = "c.published_at DESC, c.id ASC";
    const EXTRA_COLUMNS: &'static [&'static str] = &[];

    fn extra_values(_extra: &Self::Extra) -> Vec<Value> {
        Vec::new()
    }

    fn read_extra(_row: &Row<'_>) -> rusqlite::Result<Self::Extra> {
        Ok(NoExtras::default())
    }
}

impl ContentStorage for PortfolioKind {
    const TABLE: &'static str = "portfolio_items";
    const OWNER_COLUMN: &'static str = "portfolio_item_id";
    const TAG_LINKS: &'static str = "portfolio_item_tags";
    const CATEGORY_LINKS: &'static str = "portfolio_item_categories";
    const LIST_ORDER: &'static str = "c.created_at DESC, c.id DESC";
    const EXTRA_COLUMNS: &'static [&'static str] = &["demo_url", "repo_url"];

    fn extra_values(extra: &Self::Extra) -> Vec<Value> {
        vec![
            Value::Text(extra.demo_url.clone()),
            Value::Text(extra.repo_url.clone()),
        ]
    }

    fn read_extra(row: &Row<'_>) -> rusqlite::Result<Self::Extra> {
        Ok(PortfolioLinks {
            demo_url: row.get("demo_url")?,
            repo_url: row.get("repo_url")?,
        })
    }
}

/// Repository interface for one content kind.
pub trait ContentRepository<K: ContentKind> {
    /// Lists one page under `visibility`, with the total matching count.
    fn list_all(
        &self,
        page: i64,
        page_size: i64,
        visibility: Visibility,
    ) -> RepoResult<Page<Content<K>>>;
    /// Gets one live row by slug, subject to `visibility`.
    fn get_by_slug(&self, slug: &str, visibility: Visibility) -> RepoResult<Content<K>>;
    /// Gets one live row by id regardless of publish state.
    fn get_by_id(&self, id: ContentId) -> RepoResult<Content<K>>;
    /// Gets one row by id including tombstoned rows.
    fn get_by_id_unscoped(&self, id: ContentId) -> RepoResult<Content<K>>;
    /// Inserts the row and its pre-attached tags/categories.
    fn create(&self, item: &Content<K>) -> RepoResult<Content<K>>;
    /// Replaces title, slug, description, body and kind fields.
    fn update(&self, item: &Content<K>) -> RepoResult<Content<K>>;
    /// Tombstones one live row.
    fn delete(&self, id: ContentId) -> RepoResult<()>;
    /// Clears the tombstone of one deleted row.
    fn restore(&self, id: ContentId) -> RepoResult<Content<K>>;
    /// Sets or clears only the publish timestamp.
    fn set_published_at(
        &self,
        id: ContentId,
        published_at: Option<DateTime<Utc>>,
    ) -> RepoResult<()>;
    /// Replaces the full tag set of `item`.
    fn replace_tags(&self, item: &Content<K>, tags: &[Tag]) -> RepoResult<()>;
    /// Replaces the full category set of `item`.
    fn replace_categories(&self, item: &Content<K>, categories: &[Category]) -> RepoResult<()>;
    /// Filtered listing by category, tag and text.
    fn search(&self, query: &SearchQuery) -> RepoResult<Page<Content<K>>>;
    /// Counts live rows under `visibility`.
    fn count(&self, visibility: Visibility) -> RepoResult<i64>;
}

/// SQLite-backed content repository.
#[derive(Debug)]
pub struct SqliteContentRepository<'conn, K> {
    conn: &'conn Connection,
    kind: PhantomData<K>,
}

pub type SqliteArticleRepository<'conn> = SqliteContentRepository<'conn, ArticleKind>;
pub type SqlitePortfolioRepository<'conn> = SqliteContentRepository<'conn, PortfolioKind>;

impl<'conn, K: ContentStorage> SqliteContentRepository<'conn, K> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self {
            conn,
            kind: PhantomData,
        })
    }

    fn find_one(&self, filter: &ContentFilter) -> RepoResult<Option<Content<K>>> {
        let sql = format!(
            "SELECT {}{} LIMIT 1;",
            select_columns::<K>(),
            filter.from_clause(K::TABLE)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(filter.binds()))?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let mut items = vec![read_content_row::<K>(row)?];
        attach_associations(self.conn, &mut items)?;
        Ok(items.pop())
    }

    fn by_id(&self, id: ContentId, include_deleted: bool) -> RepoResult<Content<K>> {
        let mut filter = if include_deleted {
            ContentFilter::default()
        } else {
            ContentFilter::live()
        };
        filter.condition("c.id = ?", [Value::Integer(id)]);
        self.find_one(&filter)?
            .ok_or_else(|| RepoError::not_found(K::ENTITY, id))
    }

    fn visible_filter(visibility: Visibility) -> ContentFilter {
        let mut filter = ContentFilter::live();
        if let Some((predicate, bind)) = visibility.sql_predicate("c.published_at", Utc::now()) {
            filter.condition(predicate, [bind]);
        }
        filter
    }
}

impl<K: ContentStorage> ContentRepository<K> for SqliteContentRepository<'_, K> {
    fn list_all(
        &self,
        page: i64,
        page_size: i64,
        visibility: Visibility,
    ) -> RepoResult<Page<Content<K>>> {
        let filter = Self::visible_filter(visibility);
        fetch_page(
            self.conn,
            &filter,
            K::LIST_ORDER,
            PageWindow::resolve(page, page_size),
        )
    }

    fn get_by_slug(&self, slug: &str, visibility: Visibility) -> RepoResult<Content<K>> {
        let mut filter = Self::visible_filter(visibility);
        filter.condition("c.slug = ?", [Value::Text(slug.to_string())]);
        self.find_one(&filter)?
            .ok_or_else(|| RepoError::not_found(K::ENTITY, slug))
    }

    fn get_by_id(&self, id: ContentId) -> RepoResult<Content<K>> {
        self.by_id(id, false)
    }

    fn get_by_id_unscoped(&self, id: ContentId) -> RepoResult<Content<K>> {
        self.by_id(id, true)
    }

    fn create(&self, item: &Content<K>) -> RepoResult<Content<K>> {
        let now = to_millis(Utc::now());
        let columns: Vec<&str> = SHARED_COLUMNS
            .iter()
            .chain(K::EXTRA_COLUMNS)
            .chain(&["created_at", "updated_at", "published_at"])
            .copied()
            .collect();

        let mut values = shared_values(item);
        values.extend(K::extra_values(&item.extra));
        values.push(Value::Integer(now));
        values.push(Value::Integer(now));
        values.push(optional_millis(item.published_at));

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({});",
                K::TABLE,
                columns.join(", "),
                numbered_placeholders(columns.len())
            ),
            params_from_iter(values),
        )
        .map_err(|err| classify_write(err, K::ENTITY))?;

        let id = tx.last_insert_rowid();
        let tags = write_links(&tx, K::link_table(LinkKind::Tag), id, &item.tag_ids())?;
        let categories = write_links(
            &tx,
            K::link_table(LinkKind::Category),
            id,
            &item.category_ids(),
        )?;
        tx.commit()?;

        info!(
            "event=content_create module=repo status=ok kind={} id={} tags={} categories={}",
            K::ENTITY,
            id,
            tags,
            categories
        );
        self.get_by_id(id)
    }

    fn update(&self, item: &Content<K>) -> RepoResult<Content<K>> {
        let assignments: Vec<String> = SHARED_COLUMNS
            .iter()
            .chain(K::EXTRA_COLUMNS)
            .chain(&["updated_at"])
            .enumerate()
            .map(|(index, column)| format!("{column} = ?{}", index + 1))
            .collect();

        let mut values = shared_values(item);
        values.extend(K::extra_values(&item.extra));
        values.push(Value::Integer(to_millis(Utc::now())));
        values.push(Value::Integer(item.id));

        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE {} SET {} WHERE id = ?{} AND deleted_at IS NULL;",
                    K::TABLE,
                    assignments.join(", "),
                    assignments.len() + 1
                ),
                params_from_iter(values),
            )
            .map_err(|err| classify_write(err, K::ENTITY))?;

        if changed == 0 {
            return Err(RepoError::not_found(K::ENTITY, item.id));
        }
        self.get_by_id(item.id)
    }

    fn delete(&self, id: ContentId) -> RepoResult<()> {
        let now = to_millis(Utc::now());
        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET deleted_at = ?1, updated_at = ?1
                 WHERE id = ?2
                   AND deleted_at IS NULL;",
                K::TABLE
            ),
            params![now, id],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found(K::ENTITY, id));
        }

        info!(
            "event=content_delete module=repo status=ok kind={} id={}",
            K::ENTITY,
            id
        );
        Ok(())
    }

    fn restore(&self, id: ContentId) -> RepoResult<Content<K>> {
        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE {}
                     SET deleted_at = NULL, updated_at = ?1
                     WHERE id = ?2
                       AND deleted_at IS NOT NULL;",
                    K::TABLE
                ),
                params![to_millis(Utc::now()), id],
            )
            .map_err(|err| classify_write(err, K::ENTITY))?;

        if changed == 0 {
            return Err(RepoError::not_found(K::ENTITY, id));
        }

        info!(
            "event=content_restore module=repo status=ok kind={} id={}",
            K::ENTITY,
            id
        );
        self.get_by_id(id)
    }

    fn set_published_at(
        &self,
        id: ContentId,
        published_at: Option<DateTime<Utc>>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET published_at = ?1
                 WHERE id = ?2
                   AND deleted_at IS NULL;",
                K::TABLE
            ),
            params![published_at.map(to_millis), id],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found(K::ENTITY, id));
        }
        Ok(())
    }

    fn replace_tags(&self, item: &Content<K>, tags: &[Tag]) -> RepoResult<()> {
        let ids: Vec<_> = tags.iter().map(|tag| tag.id).collect();
        AssociationReplacer::new(self.conn).replace(K::link_table(LinkKind::Tag), item.id, &ids)
    }

    fn replace_categories(&self, item: &Content<K>, categories: &[Category]) -> RepoResult<()> {
        let ids: Vec<_> = categories.iter().map(|category| category.id).collect();
        AssociationReplacer::new(self.conn).replace(
            K::link_table(LinkKind::Category),
            item.id,
            &ids,
        )
    }

    fn search(&self, query: &SearchQuery) -> RepoResult<Page<Content<K>>> {
        search_content(self.conn, query, Utc::now())
    }

    fn count(&self, visibility: Visibility) -> RepoResult<i64> {
        count_distinct::<K>(self.conn, &Self::visible_filter(visibility))
    }
}

/// Counts distinct content ids matching `filter`.
pub(crate) fn count_distinct<K: ContentStorage>(
    conn: &Connection,
    filter: &ContentFilter,
) -> RepoResult<i64> {
    let sql = format!(
        "SELECT COUNT(DISTINCT c.id){};",
        filter.from_clause(K::TABLE)
    );
    let total = conn.query_row(&sql, params_from_iter(filter.binds()), |row| row.get(0))?;
    Ok(total)
}

/// Runs the count and the paginated select for `filter`, then loads
/// associations for the returned page.
///
/// Rows are selected `DISTINCT`, so joins used only for filtering cannot
/// duplicate content.
pub(crate) fn fetch_page<K: ContentStorage>(
    conn: &Connection,
    filter: &ContentFilter,
    order: &str,
    window: PageWindow,
) -> RepoResult<Page<Content<K>>> {
    let total = count_distinct::<K>(conn, filter)?;

    let sql = format!(
        "SELECT DISTINCT {}{} ORDER BY {order} LIMIT ? OFFSET ?;",
        select_columns::<K>(),
        filter.from_clause(K::TABLE)
    );
    let binds = filter
        .binds()
        .iter()
        .cloned()
        .chain([Value::Integer(window.limit()), Value::Integer(window.offset())]);

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(binds))?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(read_content_row::<K>(row)?);
    }
    attach_associations(conn, &mut items)?;

    Ok(Page {
        items,
        total,
        window,
    })
}

fn select_columns<K: ContentStorage>() -> String {
    std::iter::once("id")
        .chain(SHARED_COLUMNS.iter().copied())
        .chain(K::EXTRA_COLUMNS.iter().copied())
        .chain(TIMESTAMP_COLUMNS.iter().copied())
        .map(|column| format!("c.{column} AS {column}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn read_content_row<K: ContentStorage>(row: &Row<'_>) -> RepoResult<Content<K>> {
    let timestamp = |column: &str| -> RepoResult<Option<DateTime<Utc>>> {
        match row.get::<_, Option<i64>>(column)? {
            Some(value) => from_millis(value).map(Some).ok_or_else(|| {
                RepoError::invalid_data(K::ENTITY, format!("{column} out of range: {value}"))
            }),
            None => Ok(None),
        }
    };
    let required = |column: &str| -> RepoResult<DateTime<Utc>> {
        timestamp(column)?
            .ok_or_else(|| RepoError::invalid_data(K::ENTITY, format!("{column} is NULL")))
    };

    Ok(Content {
        id: row.get("id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        short_description: row.get("short_description")?,
        body: row.get("body")?,
        extra: K::read_extra(row)?,
        created_at: required("created_at")?,
        updated_at: required("updated_at")?,
        published_at: timestamp("published_at")?,
        deleted_at: timestamp("deleted_at")?,
        tags: Vec::new(),
        categories: Vec::new(),
    })
}

/// Second pass: fills `tags`/`categories` keyed by content id.
fn attach_associations<K: ContentStorage>(
    conn: &Connection,
    items: &mut [Content<K>],
) -> RepoResult<()> {
    let ids: Vec<ContentId> = items.iter().map(|item| item.id).collect();
    let mut tags = load_terms::<TagKind>(conn, K::link_table(LinkKind::Tag), &ids)?;
    let mut categories =
        load_terms::<CategoryKind>(conn, K::link_table(LinkKind::Category), &ids)?;

    for item in items.iter_mut() {
        item.tags = tags.remove(&item.id).unwrap_or_default();
        item.categories = categories.remove(&item.id).unwrap_or_default();
    }
    Ok(())
}

fn shared_values<K: ContentKind>(item: &Content<K>) -> Vec<Value> {
    vec![
        Value::Text(item.title.clone()),
        Value::Text(item.slug.clone()),
        Value::Text(item.short_description.clone()),
        Value::Text(item.body.clone()),
    ]
}

fn optional_millis(value: Option<DateTime<Utc>>) -> Value {
    value.map_or(Value::Null, |timestamp| Value::Integer(to_millis(timestamp)))
}
