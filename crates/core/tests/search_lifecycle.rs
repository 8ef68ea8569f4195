//! Search lifecycle integration tests.
//!
//! These run the orchestrator end to end against mock providers and an
//! in-memory library: fan-out, failure isolation, dedup, ranking and the
//! last-searched write.

mod common;

use std::time::Duration;

use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

use common::SearchHarness;
use quarry_core::library::LibraryItemKey;
use quarry_core::testing::{fixtures, MockProvider};
use quarry_core::{SearchCriteria, SearchError, SearchSettings};

#[tokio::test]
async fn test_failing_and_slow_providers_do_not_abort_search() {
    let harness = SearchHarness::with_settings(
        vec![
            MockProvider::new("healthy"),
            MockProvider::new("broken"),
            MockProvider::new("slow"),
        ],
        SearchSettings {
            provider_timeout: Duration::from_millis(100),
            max_concurrent_providers: 4,
        },
    );
    harness
        .provider(0)
        .set_releases(vec![fixtures::release(
            "g1",
            "Show.S01E01.720p.HDTV.x264-GRP",
            500,
        )])
        .await;
    harness.provider(1).set_failure(Some("connection refused")).await;
    harness
        .provider(2)
        .set_releases(vec![fixtures::release("g2", "Show.S01E01.1080p.WEB-DL-GRP", 900)])
        .await;
    harness.provider(2).set_delay(Some(Duration::from_secs(5))).await;

    let result = harness
        .orchestrator
        .search(&fixtures::episode_criteria())
        .await
        .unwrap();

    assert_eq!(result.providers_queried.len(), 3);
    assert_eq!(result.decisions.len(), 1);
    assert!(result.decisions[0].is_accepted());
    assert_eq!(result.decisions[0].candidate.release.provider, "healthy");

    assert_eq!(result.provider_errors.len(), 2);
    assert!(result.provider_errors.contains_key("broken"));
    assert!(result.provider_errors.contains_key("slow"));

    let marks = harness.recorder.marks();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0].items, vec![LibraryItemKey::Episode(10)]);
}

#[tokio::test]
async fn test_all_providers_failing_still_marks_searched() {
    let harness = SearchHarness::new(vec![MockProvider::new("a"), MockProvider::new("b")]);
    harness.provider(0).set_failure(Some("down")).await;
    harness.provider(1).set_failure(Some("down")).await;

    let result = harness
        .orchestrator
        .search(&fixtures::episode_criteria())
        .await
        .unwrap();

    assert!(result.decisions.is_empty());
    assert_eq!(result.provider_errors.len(), 2);
    assert!(result.all_providers_failed());
    assert_eq!(harness.recorder.mark_count(), 1);
}

#[tokio::test]
async fn test_one_failing_provider_keeps_results_of_the_others() {
    let harness = SearchHarness::new(vec![
        MockProvider::new("first"),
        MockProvider::new("down"),
        MockProvider::new("second"),
    ]);
    harness
        .provider(0)
        .set_releases(vec![fixtures::release(
            "hdtv",
            "Show.S01E01.720p.HDTV.x264-GRP",
            500,
        )])
        .await;
    harness.provider(1).set_failure(Some("503 service unavailable")).await;
    harness
        .provider(2)
        .set_releases(vec![fixtures::release(
            "webdl",
            "Show.S01E01.1080p.WEB-DL.x264-GRP",
            1200,
        )])
        .await;

    let result = harness
        .orchestrator
        .search(&fixtures::episode_criteria())
        .await
        .unwrap();

    let mut guids: Vec<&str> = result.decisions.iter().map(|d| d.guid()).collect();
    guids.sort();
    assert_eq!(guids, vec!["hdtv", "webdl"]);
    let mut providers: Vec<&str> = result
        .decisions
        .iter()
        .map(|d| d.candidate.release.provider.as_str())
        .collect();
    providers.sort();
    assert_eq!(providers, vec!["first", "second"]);
    assert!(result.decisions.iter().all(|d| d.is_accepted()));

    assert_eq!(result.providers_failed, 1);
    assert!(result.provider_errors.contains_key("down"));
    assert!(!result.all_providers_failed());
    assert_eq!(harness.recorder.mark_count(), 1);
}

#[tokio::test]
async fn test_providers_sharing_a_name_are_counted_separately() {
    let harness = SearchHarness::new(vec![
        MockProvider::new("mirror"),
        MockProvider::new("mirror"),
    ]);
    harness.provider(0).set_failure(Some("connection reset")).await;
    harness
        .provider(1)
        .set_releases(vec![fixtures::release(
            "g1",
            "Show.S01E01.720p.HDTV.x264-GRP",
            500,
        )])
        .await;

    let result = harness
        .orchestrator
        .search(&fixtures::episode_criteria())
        .await
        .unwrap();

    assert_eq!(result.providers_queried.len(), 2);
    assert_eq!(result.providers_failed, 1);
    assert_eq!(result.provider_errors.len(), 1);
    assert!(!result.all_providers_failed());
    assert_eq!(result.decisions.len(), 1);

    harness.provider(1).set_failure(Some("timeout upstream")).await;
    let result = harness
        .orchestrator
        .search(&fixtures::episode_criteria())
        .await
        .unwrap();

    assert_eq!(result.providers_failed, 2);
    assert!(result.all_providers_failed());
    let message = &result.provider_errors["mirror"];
    assert!(message.contains("connection reset"));
    assert!(message.contains("timeout upstream"));
}

#[tokio::test]
async fn test_duplicate_guid_keeps_preferred_provider() {
    let harness = SearchHarness::new(vec![
        MockProvider::new("secondary").with_priority(40),
        MockProvider::new("primary").with_priority(10),
    ]);
    let shared = fixtures::release("shared", "Show.S01E01.720p.HDTV.x264-GRP", 500);
    harness.provider(0).set_releases(vec![shared.clone()]).await;
    harness.provider(1).set_releases(vec![shared]).await;

    let result = harness
        .orchestrator
        .search(&fixtures::episode_criteria())
        .await
        .unwrap();

    assert_eq!(result.decisions.len(), 1);
    let kept = &result.decisions[0].candidate.release;
    assert_eq!(kept.provider, "primary");
    assert_eq!(kept.provider_priority, Some(10));
}

#[tokio::test]
async fn test_accepted_release_beats_rejected_duplicate() {
    let harness = SearchHarness::new(vec![
        MockProvider::new("preferred").with_priority(1),
        MockProvider::new("fallback").with_priority(50),
    ]);
    // Same guid, but the preferred provider reports an implausible size.
    harness
        .provider(0)
        .set_releases(vec![fixtures::release("dup", "Show.S01E01.720p.HDTV.x264-GRP", 10)])
        .await;
    harness
        .provider(1)
        .set_releases(vec![fixtures::release("dup", "Show.S01E01.720p.HDTV.x264-GRP", 500)])
        .await;

    let result = harness
        .orchestrator
        .search(&fixtures::episode_criteria())
        .await
        .unwrap();

    assert_eq!(result.decisions.len(), 1);
    assert!(result.decisions[0].is_accepted());
    assert_eq!(result.decisions[0].candidate.release.provider, "fallback");
}

#[tokio::test]
async fn test_result_order_does_not_depend_on_provider_order() {
    let releases_a = vec![
        fixtures::release("a1", "Show.S01E01.720p.HDTV.x264-GRP", 500),
        fixtures::release("a2", "Show.S01E01.1080p.WEB-DL.x264-GRP", 1200),
    ];
    let releases_b = vec![
        fixtures::release("b1", "Show.S01E01.480p.WEB-DL.x264-GRP", 200),
        fixtures::release("a1", "Show.S01E01.720p.HDTV.x264-GRP", 500),
        fixtures::release("b2", "Other.Show.S01E01.720p.HDTV.x264-GRP", 500),
    ];

    let mut orders = Vec::new();
    for flipped in [false, true] {
        let harness = SearchHarness::new(vec![MockProvider::new("a"), MockProvider::new("b")]);
        let (first, second) = if flipped {
            (releases_b.clone(), releases_a.clone())
        } else {
            (releases_a.clone(), releases_b.clone())
        };
        harness.provider(0).set_releases(first).await;
        harness.provider(1).set_releases(second).await;

        let result = harness
            .orchestrator
            .search(&fixtures::episode_criteria())
            .await
            .unwrap();
        orders.push(
            result
                .decisions
                .iter()
                .map(|d| d.guid().to_string())
                .collect::<Vec<_>>(),
        );
    }

    assert_eq!(orders[0], orders[1]);
    assert_eq!(orders[0].len(), 4);
    // Accepted releases first, highest quality leading; the wrong title last.
    assert_eq!(orders[0][0], "a2");
    assert_eq!(orders[0][3], "b2");
}

#[tokio::test]
async fn test_cancelled_search_marks_nothing() {
    let harness = SearchHarness::new(vec![MockProvider::new("stalled")]);
    harness.provider(0).set_delay(Some(Duration::from_secs(10))).await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = harness
        .orchestrator
        .search_with_cancel(&fixtures::episode_criteria(), cancel)
        .await;

    assert!(matches!(result, Err(SearchError::Cancelled)));
    assert_eq!(harness.recorder.mark_count(), 0);
    assert_eq!(harness.provider(0).fetch_count().await, 1);
}

#[tokio::test]
async fn test_no_providers_returns_empty_result() {
    let harness = SearchHarness::new(Vec::new());

    let result = assert_ok!(harness.orchestrator.search(&fixtures::episode_criteria()).await);

    assert!(result.decisions.is_empty());
    assert!(result.providers_queried.is_empty());
    assert_eq!(harness.recorder.mark_count(), 0);
}

#[tokio::test]
async fn test_interactive_search_skips_automatic_only_provider() {
    let harness = SearchHarness::new(vec![
        MockProvider::new("automatic-only").with_search_modes(false, true),
        MockProvider::new("both"),
    ]);
    let criteria = fixtures::episode_criteria().interactive(true).user_invoked(true);

    let result = harness.orchestrator.search(&criteria).await.unwrap();

    assert_eq!(result.providers_queried, vec!["both".to_string()]);
    assert_eq!(harness.provider(0).fetch_count().await, 0);
    assert_eq!(harness.provider(1).fetch_count().await, 1);
}

#[tokio::test]
async fn test_season_search_resolves_full_season_pack() {
    let harness = SearchHarness::new(vec![MockProvider::new("indexer")]);
    harness
        .provider(0)
        .set_releases(vec![
            fixtures::release("pack", "Show.S01.720p.HDTV.x264-GRP", 2000),
            fixtures::release("wrong-season", "Show.S02.720p.HDTV.x264-GRP", 2000),
        ])
        .await;

    let criteria = SearchCriteria::season(
        fixtures::series(1, "Show"),
        vec![fixtures::episode(10, 1, 1, 1), fixtures::episode(11, 1, 1, 2)],
        1,
    )
    .unwrap();
    let result = harness.orchestrator.search(&criteria).await.unwrap();

    assert_eq!(result.decisions.len(), 2);
    let pack = &result.decisions[0];
    assert_eq!(pack.guid(), "pack");
    assert!(pack.is_accepted());
    let covered: Vec<i64> = pack.candidate.episodes().iter().map(|e| e.id).collect();
    assert_eq!(covered, vec![10, 11]);
    assert!(!result.decisions[1].is_accepted());

    let marks = harness.recorder.marks();
    assert_eq!(
        marks[0].items,
        vec![LibraryItemKey::Episode(10), LibraryItemKey::Episode(11)]
    );
}

#[tokio::test]
async fn test_movie_search_rejects_episode_releases() {
    let harness = SearchHarness::new(vec![MockProvider::new("indexer")]);
    harness
        .provider(0)
        .set_releases(vec![
            fixtures::release("movie", "Heat.1995.1080p.BluRay.x264-GRP", 8000),
            fixtures::release("episode", "Heat.S01E01.720p.HDTV.x264-GRP", 500),
        ])
        .await;

    let criteria = SearchCriteria::movie(fixtures::movie(5, "Heat", 1995));
    let result = harness.orchestrator.search(&criteria).await.unwrap();

    let accepted: Vec<&str> = result.accepted().map(|d| d.guid()).collect();
    assert_eq!(accepted, vec!["movie"]);
    assert_eq!(result.decisions.len(), 2);
    assert_eq!(harness.recorder.marks()[0].items, vec![LibraryItemKey::Movie(5)]);
}

#[tokio::test]
async fn test_movie_search_accepts_numeric_titles() {
    let harness = SearchHarness::new(vec![MockProvider::new("indexer")]);
    harness.library.add_movie(fixtures::movie(6, "1917", 2019));
    harness.library.add_movie(fixtures::movie(7, "Room 237", 2012));
    harness
        .provider(0)
        .set_releases(vec![
            fixtures::release("war", "1917.2019.1080p.BluRay.x264-GRP", 8000),
            fixtures::release("room", "Room.237.1080p.BluRay", 6000),
        ])
        .await;

    let criteria = SearchCriteria::movie(fixtures::movie(6, "1917", 2019));
    let result = harness.orchestrator.search(&criteria).await.unwrap();
    let accepted: Vec<&str> = result.accepted().map(|d| d.guid()).collect();
    assert_eq!(accepted, vec!["war"]);

    let criteria = SearchCriteria::movie(fixtures::movie(7, "Room 237", 2012));
    let result = harness.orchestrator.search(&criteria).await.unwrap();
    let accepted: Vec<&str> = result.accepted().map(|d| d.guid()).collect();
    assert_eq!(accepted, vec!["room"]);
}

#[test]
fn test_mismatched_episode_is_invalid_criteria() {
    let harness = SearchHarness::new(vec![MockProvider::new("indexer")]);
    let criteria = SearchCriteria::single_item(
        fixtures::series(1, "Show"),
        fixtures::episode(99, 2, 1, 1),
        Default::default(),
    );

    let result = tokio_test::block_on(harness.orchestrator.search(&criteria));

    let err = assert_err!(result);
    assert!(matches!(err, SearchError::InvalidCriteria(_)));
    assert_eq!(harness.recorder.mark_count(), 0);
}
