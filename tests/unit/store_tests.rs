use uuid::Uuid;

use resurrect::persistence::{db, HistoryRepo};
use resurrect::session::RecordStore;

async fn store() -> RecordStore {
    let pool = db::connect_memory().await.expect("db connect");
    RecordStore::new(HistoryRepo::new(pool))
}

#[tokio::test]
async fn empty_paths_are_never_stored() {
    let store = store().await;
    assert!(!store.track_process("   "));
    assert!(store.session_snapshot().is_empty());
}

#[tokio::test]
async fn tracked_paths_are_normalized_and_deduplicated() {
    let store = store().await;
    assert!(store.track_process("C:\\Apps\\Server.EXE"));
    assert!(store.track_process("  c:\\apps\\server.exe "));

    let session = store.session_snapshot();
    assert_eq!(session.len(), 1);
    assert!(session.contains_key("c:\\apps\\server.exe"));
}

#[tokio::test]
async fn engine_for_untracked_process_is_dropped() {
    let store = store().await;
    store.track_engine("c:\\apps\\rogue.exe", Uuid::from_u128(1));
    assert!(store.session_snapshot().is_empty());
}

#[tokio::test]
async fn engine_attribution_reaches_the_tracked_record() {
    let store = store().await;
    store.track_process("c:\\apps\\server.exe");
    store.track_engine("C:\\Apps\\SERVER.exe", Uuid::from_u128(1));
    store.track_engine("c:\\apps\\server.exe", Uuid::from_u128(1));

    let session = store.session_snapshot();
    assert_eq!(session["c:\\apps\\server.exe"].engines.len(), 1);
}

#[tokio::test]
async fn persist_promotes_session_to_historic_and_clears_it() {
    let store = store().await;
    store.open_workspace("app.sln").await;
    store.track_process("c:\\apps\\server.exe");
    store.track_engine("c:\\apps\\server.exe", Uuid::from_u128(1));

    store.persist().await.expect("persist");

    assert!(store.session_snapshot().is_empty());
    let historic = store.historic_snapshot();
    assert_eq!(historic.len(), 1);
    assert!(historic.contains_key("c:\\apps\\server.exe"));
}

#[tokio::test]
async fn persist_of_empty_session_keeps_prior_historic() {
    let store = store().await;
    store.open_workspace("app.sln").await;
    store.track_process("c:\\apps\\server.exe");
    store.persist().await.expect("first persist");

    store.persist().await.expect("empty persist is a no-op");
    assert!(store.has_historic());
}

#[tokio::test]
async fn failed_persist_retains_session_records_for_retry() {
    let pool = db::connect_memory().await.expect("db connect");
    let store = RecordStore::new(HistoryRepo::new(pool.clone()));
    store.open_workspace("app.sln").await;
    store.track_process("c:\\apps\\server.exe");

    pool.close().await;
    assert!(store.persist().await.is_err());

    // The session set is intact, so the next design-mode transition can retry.
    assert_eq!(store.session_snapshot().len(), 1);
}

#[tokio::test]
async fn close_workspace_clears_historic_records() {
    let store = store().await;
    store.open_workspace("app.sln").await;
    store.track_process("c:\\apps\\server.exe");
    store.persist().await.expect("persist");

    store.close_workspace();
    assert!(!store.has_historic());
}

#[tokio::test]
async fn freeze_flag_toggles() {
    let store = store().await;
    assert!(!store.is_frozen());
    store.freeze();
    assert!(store.is_frozen());
    store.unfreeze();
    assert!(!store.is_frozen());
}

#[tokio::test]
async fn short_name_matching_is_case_insensitive() {
    let store = store().await;
    store.open_workspace("app.sln").await;
    store.track_process("c:\\apps\\server.exe");
    store.persist().await.expect("persist");

    assert!(store.historic_matches_short_name("D:\\elsewhere\\SERVER.EXE"));
    assert!(store.historic_matches_short_name("/opt/bin/Server.exe"));
    assert!(!store.historic_matches_short_name("c:\\apps\\other.exe"));
}

#[tokio::test]
async fn reopening_a_workspace_reloads_persisted_records() {
    let pool = db::connect_memory().await.expect("db connect");
    let store = RecordStore::new(HistoryRepo::new(pool.clone()));
    store.open_workspace("app.sln").await;
    store.track_process("c:\\apps\\server.exe");
    store.persist().await.expect("persist");
    store.close_workspace();

    let fresh = RecordStore::new(HistoryRepo::new(pool));
    fresh.open_workspace("app.sln").await;
    assert!(fresh.has_historic());
}
