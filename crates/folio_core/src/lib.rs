//! Content repository core for Folio.
//! Articles and portfolio items with tags, categories, publish scheduling
//! and tombstones, over SQLite.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;

pub use config::{ConfigError, Environment, FolioConfig, StoreLocation};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::content::{
    Article, ArticleKind, Content, ContentId, ContentKind, NoExtras, PortfolioItem,
    PortfolioKind, PortfolioLinks,
};
pub use model::taxonomy::{Category, CategoryKind, Tag, TagKind, TaxonomyKind, Term, TermId};
pub use repo::association::{AssociationReplacer, LinkKind, LinkTable};
pub use repo::content_repo::{
    ContentRepository, ContentStorage, SqliteArticleRepository, SqliteContentRepository,
    SqlitePortfolioRepository,
};
pub use repo::error::{RepoError, RepoResult};
pub use repo::pagination::{Page, PageWindow, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use repo::taxonomy_repo::{
    SqliteCategoryRepository, SqliteTagRepository, SqliteTaxonomyRepository, TaxonomyRepository,
    TaxonomyStorage,
};
pub use repo::visibility::Visibility;
pub use search::filter::{search_content, SearchQuery};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
