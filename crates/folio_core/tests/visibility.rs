use chrono::{Duration, Utc};
use folio_core::db::open_db_in_memory;
use folio_core::{
    Article, ContentRepository, PortfolioItem, SearchQuery, SqliteArticleRepository,
    SqlitePortfolioRepository, Visibility,
};

fn seed_mixed(repo: &SqliteArticleRepository<'_>) {
    let now = Utc::now();

    let mut live = Article::new("Published post", "published-post");
    live.published_at = Some(now - Duration::hours(1));
    repo.create(&live).unwrap();

    repo.create(&Article::new("Draft post", "draft-post")).unwrap();

    let mut scheduled = Article::new("Scheduled post", "scheduled-post");
    scheduled.published_at = Some(now + Duration::days(1));
    repo.create(&scheduled).unwrap();
}

#[test]
fn published_only_hides_drafts_and_scheduled_rows_from_listings() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();
    seed_mixed(&repo);

    let public = repo.list_all(1, 10, Visibility::PublishedOnly).unwrap();
    assert_eq!(public.total, 1);
    assert_eq!(public.items.len(), 1);
    assert_eq!(public.items[0].slug, "published-post");
    assert_eq!(repo.count(Visibility::PublishedOnly).unwrap(), 1);

    let everything = repo.list_all(1, 10, Visibility::All).unwrap();
    assert_eq!(everything.total, 3);
    assert_eq!(repo.count(Visibility::All).unwrap(), 3);
}

#[test]
fn get_by_slug_treats_hidden_rows_as_absent() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();
    seed_mixed(&repo);

    let draft = repo
        .get_by_slug("draft-post", Visibility::PublishedOnly)
        .unwrap_err();
    let missing = repo
        .get_by_slug("never-written", Visibility::PublishedOnly)
        .unwrap_err();
    assert!(draft.is_not_found());
    assert!(missing.is_not_found());
    assert!(repo
        .get_by_slug("scheduled-post", Visibility::PublishedOnly)
        .unwrap_err()
        .is_not_found());

    let admin = repo.get_by_slug("draft-post", Visibility::All).unwrap();
    assert!(admin.published_at.is_none());
    assert_eq!(
        repo.get_by_slug("published-post", Visibility::PublishedOnly)
            .unwrap()
            .title,
        "Published post"
    );
}

#[test]
fn text_search_respects_visibility() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteArticleRepository::try_new(&conn).unwrap();

    let mut published = Article::new("Release notes", "release-notes");
    published.short_description = "Not a draft anymore".to_string();
    published.published_at = Some(Utc::now() - Duration::minutes(5));
    repo.create(&published).unwrap();

    repo.create(&Article::new("Draft", "draft")).unwrap();

    let public = repo
        .search(&SearchQuery::new(1, 10).with_text("draft"))
        .unwrap();
    assert_eq!(public.total, 1);
    assert_eq!(public.items[0].slug, "release-notes");

    let admin = repo
        .search(
            &SearchQuery::new(1, 10)
                .with_text("draft")
                .with_visibility(Visibility::All),
        )
        .unwrap();
    assert_eq!(admin.total, 2);
}

#[test]
fn scheduled_row_becomes_visible_once_its_time_passes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePortfolioRepository::try_new(&conn).unwrap();
    let stored = repo
        .create(&PortfolioItem::new("Launch", "launch"))
        .unwrap();

    repo.set_published_at(stored.id, Some(Utc::now() + Duration::hours(2)))
        .unwrap();
    assert_eq!(repo.count(Visibility::PublishedOnly).unwrap(), 0);

    repo.set_published_at(stored.id, Some(Utc::now() - Duration::seconds(1)))
        .unwrap();
    assert_eq!(repo.count(Visibility::PublishedOnly).unwrap(), 1);
    assert!(repo.get_by_slug("launch", Visibility::PublishedOnly).is_ok());
}
