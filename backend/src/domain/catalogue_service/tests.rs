//! Regression coverage for the catalogue service.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{FixtureCatalogueRepository, FixtureReviewRepository};
use crate::domain::review::{Review, Score};
use crate::domain::user::{Account, EmailAddress, Role, Username};

const FIXTURE_YEAR: i32 = 2026;

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: Utc
            .with_ymd_and_hms(FIXTURE_YEAR, 3, 1, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp"),
    })
}

struct Harness {
    reviews: Arc<FixtureReviewRepository>,
    service: CatalogueService,
}

fn harness() -> Harness {
    let catalogue = Arc::new(FixtureCatalogueRepository::new());
    let reviews = Arc::new(FixtureReviewRepository::new());
    let service = CatalogueService::new(catalogue, reviews.clone(), fixture_clock());
    Harness { reviews, service }
}

fn admin() -> Actor {
    let mut account = Account::new(
        Username::new("root").expect("valid username"),
        EmailAddress::new("root@example.org").expect("valid email"),
        Utc::now(),
    );
    account.role = Role::Admin;
    Actor::Authenticated(account)
}

fn plain_user() -> Actor {
    Actor::Authenticated(Account::new(
        Username::new("reader").expect("valid username"),
        EmailAddress::new("reader@example.org").expect("valid email"),
        Utc::now(),
    ))
}

fn slug(value: &str) -> Slug {
    Slug::new(value).expect("valid slug")
}

fn title_input(name: &str, year: i32) -> TitleInput {
    TitleInput {
        name: name.to_owned(),
        year,
        description: None,
        category: None,
        genre: vec![],
    }
}

#[tokio::test]
async fn anonymous_actors_can_list_but_not_create() {
    let h = harness();
    assert!(h.service.list_titles(&Actor::Anonymous).await.is_ok());
    assert!(h.service.list_categories(&Actor::Anonymous).await.is_ok());
    assert!(h.service.list_genres(&Actor::Anonymous).await.is_ok());

    let err = h
        .service
        .create_title(&Actor::Anonymous, title_input("Solaris", 1972))
        .await
        .expect_err("anonymous create should be denied");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn plain_users_cannot_write_the_catalogue() {
    let h = harness();
    let err = h
        .service
        .create_category(&plain_user(), "Films".to_owned(), slug("films"))
        .await
        .expect_err("plain user create should be denied");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case(FIXTURE_YEAR, true)]
#[case(FIXTURE_YEAR - 30, true)]
#[case(FIXTURE_YEAR + 1, false)]
#[tokio::test]
async fn title_creation_enforces_the_dynamic_year_bound(
    #[case] year: i32,
    #[case] should_succeed: bool,
) {
    let h = harness();
    let result = h.service.create_title(&admin(), title_input("Entry", year)).await;
    match (should_succeed, result) {
        (true, Ok(title)) => assert_eq!(title.year, year),
        (false, Err(err)) => assert_eq!(err.code(), ErrorCode::InvalidRequest),
        (true, Err(err)) => panic!("expected success, got {err:?}"),
        (false, Ok(title)) => panic!("expected failure, created {title:?}"),
    }
}

#[tokio::test]
async fn titles_resolve_category_and_genre_slugs() {
    let h = harness();
    let actor = admin();
    h.service
        .create_category(&actor, "Films".to_owned(), slug("films"))
        .await
        .expect("category should be created");
    h.service
        .create_genre(&actor, "Science fiction".to_owned(), slug("sci-fi"))
        .await
        .expect("genre should be created");

    let title = h
        .service
        .create_title(
            &actor,
            TitleInput {
                name: "Solaris".to_owned(),
                year: 1972,
                description: None,
                category: Some(slug("films")),
                genre: vec![slug("sci-fi")],
            },
        )
        .await
        .expect("title should be created");
    assert_eq!(
        title.category.as_ref().map(|c| c.slug.as_ref()),
        Some("films")
    );
    assert_eq!(title.genre.len(), 1);
}

#[tokio::test]
async fn unknown_reference_slugs_fail_validation() {
    let h = harness();
    let err = h
        .service
        .create_title(
            &admin(),
            TitleInput {
                name: "Solaris".to_owned(),
                year: 1972,
                description: None,
                category: Some(slug("nope")),
                genre: vec![],
            },
        )
        .await
        .expect_err("unknown category should fail");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn duplicate_slugs_are_rejected() {
    let h = harness();
    let actor = admin();
    h.service
        .create_category(&actor, "Films".to_owned(), slug("films"))
        .await
        .expect("category should be created");
    let err = h
        .service
        .create_category(&actor, "Movies".to_owned(), slug("films"))
        .await
        .expect_err("duplicate slug should fail");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn ratings_average_review_scores() {
    let h = harness();
    let actor = admin();
    let title = h
        .service
        .create_title(&actor, title_input("Solaris", 1972))
        .await
        .expect("title should be created");

    for score in [4, 7] {
        let review = Review {
            id: uuid::Uuid::new_v4(),
            title_id: title.id,
            author_id: uuid::Uuid::new_v4(),
            text: "notes".to_owned(),
            score: Score::new(score).expect("valid score"),
            pub_date: Utc::now(),
        };
        h.reviews.insert(&review).await.expect("review should insert");
    }

    let fetched = h
        .service
        .get_title(&Actor::Anonymous, title.id)
        .await
        .expect("title should be readable");
    assert_eq!(fetched.rating, Some(5.5));

    let listed = h
        .service
        .list_titles(&Actor::Anonymous)
        .await
        .expect("titles should list");
    assert_eq!(listed[0].rating, Some(5.5));
}

#[tokio::test]
async fn unreviewed_titles_have_no_rating() {
    let h = harness();
    let title = h
        .service
        .create_title(&admin(), title_input("Stalker", 1979))
        .await
        .expect("title should be created");
    let fetched = h
        .service
        .get_title(&Actor::Anonymous, title.id)
        .await
        .expect("title should be readable");
    assert_eq!(fetched.rating, None);
}

#[tokio::test]
async fn deletes_report_not_found_for_missing_rows() {
    let h = harness();
    let actor = admin();
    assert_eq!(
        h.service
            .delete_category(&actor, &slug("ghost"))
            .await
            .expect_err("missing category should 404")
            .code(),
        ErrorCode::NotFound
    );
    assert_eq!(
        h.service
            .delete_title(&actor, uuid::Uuid::new_v4())
            .await
            .expect_err("missing title should 404")
            .code(),
        ErrorCode::NotFound
    );
}

#[tokio::test]
async fn title_patch_respects_the_year_bound() {
    let h = harness();
    let actor = admin();
    let title = h
        .service
        .create_title(&actor, title_input("Solaris", 1972))
        .await
        .expect("title should be created");

    let patch = TitlePatch {
        year: Some(FIXTURE_YEAR + 2),
        ..TitlePatch::default()
    };
    let err = h
        .service
        .update_title(&actor, title.id, patch)
        .await
        .expect_err("future year should fail");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);

    let patch = TitlePatch {
        name: Some("Solyaris".to_owned()),
        ..TitlePatch::default()
    };
    let updated = h
        .service
        .update_title(&actor, title.id, patch)
        .await
        .expect("rename should succeed");
    assert_eq!(updated.name, "Solyaris");
}
