mod common;

use std::time::Duration;

use common::FakeCatalog;
use nutriscout_api::search_path;
use nutriscout_core::{recommend, CompletionOrdering, SearchSession, SearchSettings, SearchStore};
use serde_json::json;
use tokio::time::sleep;

fn store(catalog: &std::sync::Arc<FakeCatalog>, ordering: CompletionOrdering) -> SearchStore {
    SearchStore::new(
        catalog.repository(),
        SearchSession::new(),
        SearchSettings {
            ordering,
            ..SearchSettings::default()
        },
    )
}

fn codes(session_slot: Vec<nutriscout_core::Product>) -> Vec<String> {
    session_slot.into_iter().map(|p| p.code).collect()
}

#[tokio::test(start_paused = true)]
async fn test_short_query_clears_without_network() {
    let catalog = FakeCatalog::new();
    let store = store(&catalog, CompletionOrdering::Sequenced);

    store.set_query("");
    store.set_query("y");
    sleep(Duration::from_secs(1)).await;

    assert!(catalog.calls().is_empty());
    assert!(store.session().current().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_short_query_keeps_last_successful() {
    let catalog = FakeCatalog::new();
    catalog.search("yaourt", Duration::ZERO, json!([{ "code": "1" }, { "code": "2" }]));
    let store = store(&catalog, CompletionOrdering::Sequenced);

    store.set_query("yaourt");
    sleep(Duration::from_millis(400)).await;
    assert_eq!(codes(store.session().current()), vec!["1", "2"]);

    store.set_query("y");
    assert!(store.session().current().is_empty());
    assert_eq!(codes(store.session().last_successful()), vec!["1", "2"]);
}

#[tokio::test(start_paused = true)]
async fn test_typing_burst_sends_one_search() {
    let catalog = FakeCatalog::new();
    catalog.search("bana", Duration::ZERO, json!([{ "code": "42" }]));
    let store = store(&catalog, CompletionOrdering::Sequenced);

    store.set_query("ba");
    sleep(Duration::from_millis(50)).await;
    store.set_query("ban");
    sleep(Duration::from_millis(50)).await;
    store.set_query("bana");

    sleep(Duration::from_millis(299)).await;
    assert!(catalog.calls().is_empty());

    sleep(Duration::from_millis(10)).await;
    assert_eq!(catalog.calls(), vec![search_path("bana")]);
    assert_eq!(codes(store.session().current()), vec!["42"]);
}

#[tokio::test(start_paused = true)]
async fn test_backspace_below_minimum_cancels_pending_search() {
    let catalog = FakeCatalog::new();
    let store = store(&catalog, CompletionOrdering::Sequenced);

    store.set_query("ba");
    sleep(Duration::from_millis(100)).await;
    store.set_query("b");
    sleep(Duration::from_secs(1)).await;

    assert!(catalog.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_empty_and_failed_searches_keep_last_successful() {
    let catalog = FakeCatalog::new();
    catalog.search("lait", Duration::ZERO, json!([{ "code": "7" }]));
    catalog.search("zzzz", Duration::ZERO, json!([]));
    catalog.search("oops", Duration::ZERO, json!({ "error": "not an array" }));
    catalog.failing(search_path("down"), 503);
    let store = store(&catalog, CompletionOrdering::Sequenced);

    store.set_query("lait");
    sleep(Duration::from_millis(400)).await;

    for query in ["zzzz", "oops", "down"] {
        store.set_query(query);
        sleep(Duration::from_millis(400)).await;

        assert!(store.session().current().is_empty(), "query {}", query);
        assert_eq!(codes(store.session().last_successful()), vec!["7"]);
    }
}

/// "slow" is issued first and answers last
async fn race(ordering: CompletionOrdering) -> SearchSession {
    let catalog = FakeCatalog::new();
    catalog.search("slow", Duration::from_millis(500), json!([{ "code": "old" }]));
    catalog.search("fast", Duration::from_millis(10), json!([{ "code": "new" }]));
    let store = store(&catalog, ordering);

    store.set_query("slow"); // fires at 300, answers at 800
    sleep(Duration::from_millis(350)).await;
    store.set_query("fast"); // fires at 650, answers at 660
    sleep(Duration::from_secs(1)).await;

    assert_eq!(catalog.calls().len(), 2);
    store.session()
}

#[tokio::test(start_paused = true)]
async fn test_stale_completion_is_dropped_when_sequenced() {
    let session = race(CompletionOrdering::Sequenced).await;

    assert_eq!(codes(session.current()), vec!["new"]);
    assert_eq!(codes(session.last_successful()), vec!["new"]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_completion_wins_when_unfenced() {
    let session = race(CompletionOrdering::Unfenced).await;

    assert_eq!(codes(session.current()), vec!["old"]);
    assert_eq!(codes(session.last_successful()), vec!["old"]);
}

#[tokio::test(start_paused = true)]
async fn test_clear_invalidates_search_in_flight() {
    let catalog = FakeCatalog::new();
    catalog.search("slow", Duration::from_millis(500), json!([{ "code": "old" }]));
    let store = store(&catalog, CompletionOrdering::Sequenced);

    store.set_query("slow");
    sleep(Duration::from_millis(400)).await;
    store.set_query("");
    sleep(Duration::from_secs(1)).await;

    assert!(store.session().current().is_empty());
    assert!(store.session().last_successful().is_empty());
}

#[tokio::test]
async fn test_search_now_skips_the_window() {
    let catalog = FakeCatalog::new();
    catalog.search("skyr", Duration::ZERO, json!([{ "code": "9" }]));
    let store = store(&catalog, CompletionOrdering::Sequenced);

    let results = store.search_now("skyr").await;
    assert_eq!(results.len(), 1);
    assert_eq!(codes(store.session().current()), vec!["9"]);

    assert!(store.search_now("s").await.is_empty());
    assert!(store.session().current().is_empty());
    assert_eq!(catalog.calls().len(), 1);
}

#[tokio::test]
async fn test_recommendations_read_last_successful_slot() {
    let catalog = FakeCatalog::new();
    catalog.search(
        "yaourt",
        Duration::ZERO,
        json!([
            { "code": "A", "calories": 200, "proteins": 10 },
            { "code": "B", "calories": "100", "proteins": "8" },
            { "code": "C", "calories": 200, "proteins": 5 },
            { "code": "D", "calories": 0, "proteins": 5 }
        ]),
    );
    let store = store(&catalog, CompletionOrdering::Sequenced);
    // Another screen holds its own handle on the same session
    let details_screen = store.session();

    let results = store.search_now("yaourt").await;
    store.set_query("");

    let reference = &results[0];
    let picks = recommend(reference, &details_screen.last_successful());
    let picked: Vec<_> = picks.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(picked, vec!["D", "B"]);
}
