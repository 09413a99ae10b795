//! Tag and category records.
//!
//! Both kinds share one shape; `TaxonomyKind` only names the entity so the
//! two cannot be mixed up at compile time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Debug;
use std::marker::PhantomData;

/// Numeric identifier assigned by the store. `0` means "not persisted yet".
pub type TermId = i64;

/// Marker trait distinguishing tags from categories.
pub trait TaxonomyKind: Debug + Clone + Copy + PartialEq + Eq + Default + 'static {
    /// Singular entity name used in errors and log events.
    const ENTITY: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TagKind;

impl TaxonomyKind for TagKind {
    const ENTITY: &'static str = "tag";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryKind;

impl TaxonomyKind for CategoryKind {
    const ENTITY: &'static str = "category";
}

/// A taxonomy term with a unique title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(bound = "")]
pub struct Term<K: TaxonomyKind> {
    pub id: TermId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    kind: PhantomData<K>,
}

pub type Tag = Term<TagKind>;
pub type Category = Term<CategoryKind>;

impl<K: TaxonomyKind> Term<K> {
    /// Creates an unsaved term.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self::from_parts(0, title, now, now)
    }

    /// Builds a term from stored parts.
    pub fn from_parts(
        id: TermId,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            created_at,
            updated_at,
            kind: PhantomData,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }
}
