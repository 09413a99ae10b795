use chrono::Utc;
use folio_core::db::open_db_in_memory;
use folio_core::{
    Article, Category, ContentRepository, PortfolioItem, RepoError, SqliteArticleRepository,
    SqliteCategoryRepository, SqlitePortfolioRepository, SqliteTagRepository, Tag,
    TaxonomyRepository,
};
use rusqlite::Connection;

fn seed_tags(conn: &Connection, titles: &[&str]) -> Vec<Tag> {
    let repo = SqliteTagRepository::try_new(conn).unwrap();
    titles
        .iter()
        .map(|title| repo.create(&Tag::new(*title)).unwrap())
        .collect()
}

fn tag_titles(item: &Article) -> Vec<&str> {
    item.tags.iter().map(|tag| tag.title.as_str()).collect()
}

#[test]
fn replace_tags_swaps_full_set() {
    let conn = open_db_in_memory().unwrap();
    let tags = seed_tags(&conn, &["rust", "go", "sql"]);
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let mut article = Article::new("Polyglot", "polyglot");
    article.tags = vec![tags[0].clone(), tags[1].clone()];
    let stored = repo.create(&article).unwrap();
    assert_eq!(tag_titles(&stored), vec!["go", "rust"]);

    repo.replace_tags(&stored, &[tags[2].clone()]).unwrap();
    let reloaded = repo.get_by_id(stored.id).unwrap();
    assert_eq!(tag_titles(&reloaded), vec!["sql"]);
}

#[test]
fn replace_with_empty_slice_clears_links() {
    let conn = open_db_in_memory().unwrap();
    let tags = seed_tags(&conn, &["rust"]);
    let categories = SqliteCategoryRepository::try_new(&conn).unwrap();
    let backend = categories.create(&Category::new("Backend")).unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let mut article = Article::new("Cleared", "cleared");
    article.tags = tags;
    article.categories = vec![backend];
    let stored = repo.create(&article).unwrap();

    repo.replace_tags(&stored, &[]).unwrap();
    repo.replace_categories(&stored, &[]).unwrap();

    let reloaded = repo.get_by_id(stored.id).unwrap();
    assert!(reloaded.tags.is_empty());
    assert!(reloaded.categories.is_empty());
}

#[test]
fn duplicate_terms_in_input_are_linked_once() {
    let conn = open_db_in_memory().unwrap();
    let tags = seed_tags(&conn, &["rust"]);
    let repo = SqlitePortfolioRepository::try_new(&conn).unwrap();
    let stored = repo.create(&PortfolioItem::new("Twice", "twice")).unwrap();

    repo.replace_tags(&stored, &[tags[0].clone(), tags[0].clone()])
        .unwrap();
    assert_eq!(repo.get_by_id(stored.id).unwrap().tags.len(), 1);
}

#[test]
fn failed_replace_keeps_previous_set() {
    let conn = open_db_in_memory().unwrap();
    let tags = seed_tags(&conn, &["rust", "go"]);
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let mut article = Article::new("Stable", "stable");
    article.tags = vec![tags[0].clone()];
    let stored = repo.create(&article).unwrap();

    let ghost = Tag::from_parts(404, "ghost", Utc::now(), Utc::now());
    let err = repo
        .replace_tags(&stored, &[tags[1].clone(), ghost])
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "tag", .. }));

    let reloaded = repo.get_by_id(stored.id).unwrap();
    assert_eq!(tag_titles(&reloaded), vec!["rust"]);
}

#[test]
fn replace_on_tombstoned_owner_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let tags = seed_tags(&conn, &["rust"]);
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();
    let stored = repo.create(&Article::new("Gone", "gone")).unwrap();
    repo.delete(stored.id).unwrap();

    let err = repo.replace_tags(&stored, &tags).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "article", .. }));
}

#[test]
fn terms_shared_across_kinds_stay_independent() {
    let conn = open_db_in_memory().unwrap();
    let tags = seed_tags(&conn, &["rust"]);
    let articles = SqliteArticleRepository::try_new(&conn).unwrap();
    let portfolio = SqlitePortfolioRepository::try_new(&conn).unwrap();

    let mut article = Article::new("Shared", "shared");
    article.tags = tags.clone();
    let article = articles.create(&article).unwrap();

    let mut item = PortfolioItem::new("Shared", "shared");
    item.tags = tags;
    let item = portfolio.create(&item).unwrap();

    articles.replace_tags(&article, &[]).unwrap();
    assert_eq!(portfolio.get_by_id(item.id).unwrap().tags.len(), 1);
}
