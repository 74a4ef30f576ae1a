mod common;

use std::time::Duration;

use chrono::{TimeZone, Utc};
use common::sample_record;
use finreport::error::ReportError;
use finreport::report::ReportId;
use finreport::store::ReportStore;
use finreport::store::sqlite::SqliteStore;

#[tokio::test]
async fn save_and_get_round_trip() {
    let store = SqliteStore::in_memory().unwrap();
    let record = sample_record("Acme Corp");

    let id = store.save(&record).await.unwrap();
    assert_eq!(id, record.id);

    let loaded = store.get_by_id(&id).await.unwrap();
    assert_eq!(loaded, record);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let store = SqliteStore::in_memory().unwrap();
    store.save(&sample_record("Acme Corp")).await.unwrap();

    let missing = ReportId::new();
    let err = store.get_by_id(&missing).await.unwrap_err();
    assert_eq!(err, ReportError::NotFound(missing.to_string()));
}

#[tokio::test]
async fn duplicate_id_is_a_storage_error() {
    let store = SqliteStore::in_memory().unwrap();
    let record = sample_record("Acme Corp");
    store.save(&record).await.unwrap();

    let err = store.save(&record).await.unwrap_err();
    assert!(matches!(err, ReportError::Storage(_)));
    assert_eq!(store.list(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_is_newest_first_and_limited() {
    let store = SqliteStore::in_memory().unwrap();

    let mut oldest = sample_record("Old Co");
    oldest.created_at = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let mut middle = sample_record("Mid Co");
    middle.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut newest = sample_record("New Co");
    newest.created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    // Insert out of order.
    store.save(&middle).await.unwrap();
    store.save(&newest).await.unwrap();
    store.save(&oldest).await.unwrap();

    let all = store.list(10).await.unwrap();
    let companies: Vec<_> = all.iter().map(|r| r.company.as_str()).collect();
    assert_eq!(companies, vec!["New Co", "Mid Co", "Old Co"]);

    let limited = store.list(2).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].company, "New Co");
}

#[tokio::test]
async fn list_empty_store() {
    let store = SqliteStore::in_memory().unwrap();
    assert!(store.list(50).await.unwrap().is_empty());
}

#[tokio::test]
async fn sub_second_timestamps_survive() {
    let store = SqliteStore::in_memory().unwrap();
    let mut record = sample_record("Acme Corp");
    record.created_at = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap()
        + chrono::Duration::from_std(Duration::from_nanos(123_456_789)).unwrap();

    store.save(&record).await.unwrap();
    let loaded = store.get_by_id(&record.id).await.unwrap();
    assert_eq!(loaded.created_at, record.created_at);
}

#[tokio::test]
async fn persists_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports-test.db");
    let path_str = path.to_str().unwrap();
    let record = sample_record("Acme Corp");

    {
        let store = SqliteStore::new(path_str).unwrap();
        store.save(&record).await.unwrap();
    }

    {
        let store = SqliteStore::new(path_str).unwrap();
        assert_eq!(store.get_by_id(&record.id).await.unwrap(), record);
    }
}
