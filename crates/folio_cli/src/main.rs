//! CLI entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging, open the store and wire the
//!   repositories over one connection.
//! - Print a deterministic status summary for local sanity checks.

use folio_core::db::open_store;
use folio_core::{
    init_logging, ContentRepository, FolioConfig, SqliteArticleRepository,
    SqliteCategoryRepository, SqlitePortfolioRepository, SqliteTagRepository,
    TaxonomyRepository, Visibility,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("folio error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = FolioConfig::from_env()?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_store(&config.store)?;
    let articles = SqliteArticleRepository::try_new(&conn)?;
    let portfolio = SqlitePortfolioRepository::try_new(&conn)?;
    let tags = SqliteTagRepository::try_new(&conn)?;
    let categories = SqliteCategoryRepository::try_new(&conn)?;

    let article_total = articles.count(Visibility::All)?;
    let article_public = articles.count(Visibility::PublishedOnly)?;
    let portfolio_total = portfolio.count(Visibility::All)?;
    let portfolio_public = portfolio.count(Visibility::PublishedOnly)?;
    let tag_total = tags.list_all(1, 1)?.total;
    let category_total = categories.list_all(1, 1)?.total;

    info!(
        "event=cli_status module=cli status=ok env={:?} articles={} portfolio_items={}",
        config.environment, article_total, portfolio_total
    );

    println!("folio_core version={}", folio_core::core_version());
    println!("environment={:?}", config.environment);
    println!("articles total={article_total} published={article_public}");
    println!("portfolio_items total={portfolio_total} published={portfolio_public}");
    println!("tags total={tag_total}");
    println!("categories total={category_total}");
    Ok(())
}
