//! Publishable content records (articles and portfolio items).
//!
//! # Invariants
//! - `title` and `slug` are unique per kind among rows with `deleted_at = None`.
//! - `id` is assigned by the store on creation and never changes.
//! - `published_at = None` means draft; a future value means scheduled.

use crate::model::taxonomy::{Category, Tag, TermId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Debug;

/// Numeric identifier assigned by the store. `0` means "not persisted yet".
pub type ContentId = i64;

/// Distinguishes content kinds and declares their kind-specific fields.
pub trait ContentKind: Debug + Clone + Copy + PartialEq + Eq + Default + 'static {
    /// Fields only this kind carries.
    type Extra: Debug + Clone + PartialEq + Eq + Default + Serialize;
    /// Singular entity name used in errors and log events.
    const ENTITY: &'static str;
}

/// Articles carry no fields beyond the shared shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NoExtras {}

/// External links shown for portfolio items.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PortfolioLinks {
    pub demo_url: String,
    pub repo_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArticleKind;

impl ContentKind for ArticleKind {
    type Extra = NoExtras;
    const ENTITY: &'static str = "article";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortfolioKind;

impl ContentKind for PortfolioKind {
    type Extra = PortfolioLinks;
    const ENTITY: &'static str = "portfolio_item";
}

/// Content record shared by every kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(bound = "")]
pub struct Content<K: ContentKind> {
    pub id: ContentId,
    pub title: String,
    /// Derived from the title by the caller; stored verbatim.
    pub slug: String,
    pub short_description: String,
    /// Already sanitized by the caller.
    pub body: String,
    #[serde(flatten)]
    pub extra: K::Extra,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    /// Tombstone.
    pub deleted_at: Option<DateTime<Utc>>,
    pub tags: Vec<Tag>,
    pub categories: Vec<Category>,
}

pub type Article = Content<ArticleKind>;
pub type PortfolioItem = Content<PortfolioKind>;

impl<K: ContentKind> Content<K> {
    /// Creates an unsaved draft with no associations.
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title: title.into(),
            slug: slug.into(),
            short_description: String::new(),
            body: String::new(),
            extra: K::Extra::default(),
            created_at: now,
            updated_at: now,
            published_at: None,
            deleted_at: None,
            tags: Vec::new(),
            categories: Vec::new(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether the item is publicly visible at `now`.
    pub fn is_published_at(&self, now: DateTime<Utc>) -> bool {
        self.published_at.is_some_and(|published| published <= now)
    }

    pub fn tag_ids(&self) -> Vec<TermId> {
        self.tags.iter().map(|tag| tag.id).collect()
    }

    pub fn category_ids(&self) -> Vec<TermId> {
        self.categories.iter().map(|category| category.id).collect()
    }
}
