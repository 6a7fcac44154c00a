use std::collections::BTreeSet;

use uuid::Uuid;

use resurrect::models::{AttachRecord, RecordSet};
use resurrect::persistence::{db, HistoryRepo};

fn record(path: &str, engines: &[Uuid]) -> (String, AttachRecord) {
    (
        path.to_owned(),
        AttachRecord {
            path: path.into(),
            engines: engines.iter().copied().collect(),
        },
    )
}

#[tokio::test]
async fn load_of_unknown_workspace_is_empty_not_an_error() {
    let pool = db::connect_memory().await.expect("db connect");
    let repo = HistoryRepo::new(pool);

    assert!(repo.load("never-saved.sln").await.is_empty());
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let pool = db::connect_memory().await.expect("db connect");
    let repo = HistoryRepo::new(pool);

    let records: RecordSet = [
        record("c:\\apps\\server.exe", &[Uuid::from_u128(1)]),
        record("c:\\apps\\worker.exe", &[Uuid::from_u128(2), Uuid::from_u128(3)]),
    ]
    .into_iter()
    .collect();

    repo.save("app.sln", &records).await.expect("save");
    assert_eq!(repo.load("app.sln").await, records);
}

#[tokio::test]
async fn saving_an_empty_set_leaves_prior_data_untouched() {
    let pool = db::connect_memory().await.expect("db connect");
    let repo = HistoryRepo::new(pool);

    let records: RecordSet = [record("a.exe", &[Uuid::from_u128(1)])].into_iter().collect();
    repo.save("app.sln", &records).await.expect("save");

    repo.save("app.sln", &RecordSet::new()).await.expect("empty save is a no-op");
    assert_eq!(repo.load("app.sln").await, records);
}

#[tokio::test]
async fn workspaces_do_not_collide() {
    let pool = db::connect_memory().await.expect("db connect");
    let repo = HistoryRepo::new(pool);

    let first: RecordSet = [record("a.exe", &[Uuid::from_u128(1)])].into_iter().collect();
    let second: RecordSet = [record("b.exe", &[Uuid::from_u128(2)])].into_iter().collect();
    repo.save("first.sln", &first).await.expect("save first");
    repo.save("second.sln", &second).await.expect("save second");

    assert_eq!(repo.load("first.sln").await, first);
    assert_eq!(repo.load("second.sln").await, second);
}

#[tokio::test]
async fn malformed_blob_loads_as_empty() {
    let pool = db::connect_memory().await.expect("db connect");
    sqlx::query(
        "INSERT INTO attach_history (workspace_key, records, updated_at) VALUES (?1, ?2, ?3)",
    )
    .bind("app.sln")
    .bind("no separator here")
    .bind("2020-01-01T00:00:00Z")
    .execute(&pool)
    .await
    .expect("seed row");

    let repo = HistoryRepo::new(pool);
    assert!(repo.load("app.sln").await.is_empty());
}

#[tokio::test]
async fn legacy_blob_attributes_engines_to_every_path() {
    let engine = Uuid::from_u128(0xE1);
    let pool = db::connect_memory().await.expect("db connect");
    sqlx::query(
        "INSERT INTO attach_history (workspace_key, records, updated_at) VALUES (?1, ?2, ?3)",
    )
    .bind("app.sln")
    .bind(format!("c:\\a.exe,c:\\b.exe|{engine}"))
    .bind("2020-01-01T00:00:00Z")
    .execute(&pool)
    .await
    .expect("seed row");

    let repo = HistoryRepo::new(pool);
    let records = repo.load("app.sln").await;
    assert_eq!(records.len(), 2);
    assert_eq!(records["c:\\a.exe"].engines, BTreeSet::from([engine]));
    assert_eq!(records["c:\\b.exe"].engines, BTreeSet::from([engine]));
}

#[tokio::test]
async fn save_on_a_closed_pool_is_a_persistence_error() {
    let pool = db::connect_memory().await.expect("db connect");
    let repo = HistoryRepo::new(pool.clone());
    pool.close().await;

    let records: RecordSet = [record("a.exe", &[Uuid::from_u128(1)])].into_iter().collect();
    let err = repo.save("app.sln", &records).await.expect_err("closed pool must fail");
    assert!(err.to_string().starts_with("persistence:"));
}

#[tokio::test]
async fn on_disk_store_survives_reconnect() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("history.db");

    let records: RecordSet = [record("a.exe", &[Uuid::from_u128(1)])].into_iter().collect();
    {
        let pool = db::connect(&path).await.expect("first connect");
        HistoryRepo::new(pool.clone()).save("app.sln", &records).await.expect("save");
        pool.close().await;
    }

    let pool = db::connect(&path).await.expect("reconnect");
    assert_eq!(HistoryRepo::new(pool).load("app.sln").await, records);
}
