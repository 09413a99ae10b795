use folio_core::db::open_db_in_memory;
use folio_core::{
    Category, RepoError, SqliteCategoryRepository, SqliteTagRepository, Tag, TaxonomyRepository,
};

#[test]
fn list_all_is_alphabetical_and_reports_total() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();
    for title in ["zig", "go", "rust", "c", "elixir"] {
        repo.create(&Tag::new(title)).unwrap();
    }

    let first = repo.list_all(1, 2).unwrap();
    assert_eq!(first.total, 5);
    let titles: Vec<_> = first.items.iter().map(|tag| tag.title.as_str()).collect();
    assert_eq!(titles, vec!["c", "elixir"]);

    let last = repo.list_all(3, 2).unwrap();
    let titles: Vec<_> = last.items.iter().map(|tag| tag.title.as_str()).collect();
    assert_eq!(titles, vec!["zig"]);
}

#[test]
fn create_returns_persisted_term() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();

    let created = repo.create(&Category::new("Backend")).unwrap();
    assert!(created.is_persisted());
    assert_eq!(created.title, "Backend");
    assert_eq!(repo.get_by_id(created.id).unwrap(), created);
}

#[test]
fn duplicate_title_conflicts_per_kind() {
    let conn = open_db_in_memory().unwrap();
    let tags = SqliteTagRepository::try_new(&conn).unwrap();
    let categories = SqliteCategoryRepository::try_new(&conn).unwrap();

    tags.create(&Tag::new("rust")).unwrap();
    let err = tags.create(&Tag::new("rust")).unwrap_err();
    assert!(matches!(err, RepoError::Conflict { entity: "tag", .. }));

    categories.create(&Category::new("rust")).unwrap();
}

#[test]
fn rename_updates_title_and_reports_missing_or_conflicting() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTagRepository::try_new(&conn).unwrap();
    let rust = repo.create(&Tag::new("rust")).unwrap();
    repo.create(&Tag::new("go")).unwrap();

    repo.rename(rust.id, "rustlang").unwrap();
    assert_eq!(repo.get_by_id(rust.id).unwrap().title, "rustlang");

    assert!(repo.rename(rust.id, "go").unwrap_err().is_conflict());
    assert!(repo.rename(777, "anything").unwrap_err().is_not_found());
    assert!(repo.get_by_id(777).unwrap_err().is_not_found());
}
