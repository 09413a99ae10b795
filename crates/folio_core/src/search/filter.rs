//! Join-based search over one content kind.
//!
//! # Invariants
//! - Link tables are joined only for filters that are present.
//! - Counting uses `COUNT(DISTINCT c.id)` and rows are selected `DISTINCT`.
//! - Ordering is `published_at DESC, id ASC`; drafts (NULL) sort last.
//! - Text matching is a case-insensitive substring test on title or short
//!   description. Both sides are folded with `fold_case` (Unicode
//!   lowercase) since SQLite `LIKE` folds ASCII letters only.
//! - Non-positive ids never restrict, however the query was built.

use crate::db::FOLD_CASE_FUNCTION;
use crate::model::content::Content;
use crate::model::taxonomy::TermId;
use crate::repo::association::LinkKind;
use crate::repo::content_repo::{fetch_page, ContentStorage};
use crate::repo::error::RepoResult;
use crate::repo::pagination::{Page, PageWindow};
use crate::repo::query::{escape_like, ContentFilter};
use crate::repo::visibility::Visibility;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Connection;

const SEARCH_ORDER: &str = "c.published_at DESC, c.id ASC";

/// Search parameters.
///
/// Id filters use `0` (or any non-positive id) as "no restriction"; the
/// builder methods normalize that sentinel to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub page: i64,
    pub page_size: i64,
    pub category_id: Option<TermId>,
    pub tag_id: Option<TermId>,
    pub text: String,
    pub visibility: Visibility,
}

impl SearchQuery {
    /// Unfiltered public search over one page.
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page,
            page_size,
            category_id: None,
            tag_id: None,
            text: String::new(),
            visibility: Visibility::PublishedOnly,
        }
    }

    /// Positional form matching the service layer's parameters.
    pub fn from_params(
        page: i64,
        page_size: i64,
        category_id: TermId,
        tag_id: TermId,
        text: impl Into<String>,
        only_published: bool,
    ) -> Self {
        Self::new(page, page_size)
            .with_category(category_id)
            .with_tag(tag_id)
            .with_text(text)
            .with_visibility(Visibility::from(only_published))
    }

    pub fn with_category(mut self, category_id: TermId) -> Self {
        self.category_id = id_filter(category_id);
        self
    }

    pub fn with_tag(mut self, tag_id: TermId) -> Self {
        self.tag_id = id_filter(tag_id);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    fn filter<K: ContentStorage>(&self, now: DateTime<Utc>) -> ContentFilter {
        let mut filter = ContentFilter::live();

        if let Some(category_id) = self.category_id.and_then(id_filter) {
            let links = K::link_table(LinkKind::Category);
            filter.join(format!(
                "INNER JOIN {} cl ON cl.{} = c.id",
                links.table, links.owner_column
            ));
            filter.condition(
                format!("cl.{} = ?", links.term_column),
                [Value::Integer(category_id)],
            );
        }

        if let Some(tag_id) = self.tag_id.and_then(id_filter) {
            let links = K::link_table(LinkKind::Tag);
            filter.join(format!(
                "INNER JOIN {} tl ON tl.{} = c.id",
                links.table, links.owner_column
            ));
            filter.condition(
                format!("tl.{} = ?", links.term_column),
                [Value::Integer(tag_id)],
            );
        }

        let text = self.text.trim();
        if !text.is_empty() {
            let pattern = format!("%{}%", escape_like(&text.to_lowercase()));
            filter.condition(
                format!(
                    "({fold}(c.title) LIKE ? ESCAPE '\\' \
                     OR {fold}(c.short_description) LIKE ? ESCAPE '\\')",
                    fold = FOLD_CASE_FUNCTION
                ),
                [Value::Text(pattern.clone()), Value::Text(pattern)],
            );
        }

        if let Some((predicate, bind)) = self.visibility.sql_predicate("c.published_at", now) {
            filter.condition(predicate, [bind]);
        }

        filter
    }
}

fn id_filter(id: TermId) -> Option<TermId> {
    (id > 0).then_some(id)
}

/// Runs `query` against content kind `K` as of `now`.
pub fn search_content<K: ContentStorage>(
    conn: &Connection,
    query: &SearchQuery,
    now: DateTime<Utc>,
) -> RepoResult<Page<Content<K>>> {
    let filter = query.filter::<K>(now);
    fetch_page(
        conn,
        &filter,
        SEARCH_ORDER,
        PageWindow::resolve(query.page, query.page_size),
    )
}
