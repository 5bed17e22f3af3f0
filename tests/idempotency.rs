//! Idempotency Integration Tests
//!
//! Running discovery and registration twice over an unchanged folder set
//! and catalog must produce zero new rows the second time.

use std::path::Path;

use tempfile::TempDir;

use feedsync::register::register_all;
use feedsync::{discover, BasePath, SourceFormat};

mod common;
use common::MemoryCatalog;

async fn make_folder(base: &Path, name: &str, files: &[&str]) {
    let folder = base.join(name);
    tokio::fs::create_dir_all(&folder).await.unwrap();
    for file in files {
        tokio::fs::write(folder.join(file), b"x").await.unwrap();
    }
}

#[tokio::test]
async fn test_second_run_is_a_noop() {
    let temp = TempDir::new().unwrap();
    let catalog = MemoryCatalog::new();
    let base = BasePath::parse("http://192.168.1.37:8080/").unwrap();

    make_folder(temp.path(), "misp-feed", &["manifest.json", "events.csv"]).await;
    make_folder(temp.path(), "csv-feed", &["indicators.csv"]).await;
    make_folder(temp.path(), "text-feed", &["iplist.txt"]).await;

    // First run registers everything.
    let candidates = discover::scan(temp.path(), &catalog, SourceFormat::Text)
        .await
        .unwrap();
    assert_eq!(candidates.len(), 3);

    let report = register_all(&catalog, &base, &candidates).await;
    assert_eq!(report.registered, 3);
    assert_eq!(catalog.len(), 3);

    // Second run finds nothing new and writes nothing.
    let rescan = discover::scan(temp.path(), &catalog, SourceFormat::Text)
        .await
        .unwrap();
    assert!(rescan.is_empty());

    let rerun = register_all(&catalog, &base, &rescan).await;
    assert_eq!(rerun.registered, 0);
    assert_eq!(rerun.total_processed(), 0);
    assert_eq!(catalog.len(), 3);
}

#[tokio::test]
async fn test_failed_feed_is_retried_on_next_run() {
    let temp = TempDir::new().unwrap();
    let catalog = MemoryCatalog::new();
    let base = BasePath::parse("http://192.168.1.37:8080/").unwrap();

    make_folder(temp.path(), "alpha", &["data.csv"]).await;
    make_folder(temp.path(), "beta", &["data.csv"]).await;

    // One insert fails on the first run.
    let candidates = discover::scan(temp.path(), &catalog, SourceFormat::Text)
        .await
        .unwrap();
    catalog.fail_next_insert();
    let report = register_all(&catalog, &base, &candidates).await;
    assert_eq!(report.errors, 1);
    assert_eq!(report.registered, 1);

    // The failed feed is still undiscovered on rescan and registers cleanly;
    // the one that succeeded stays suppressed.
    let rescan = discover::scan(temp.path(), &catalog, SourceFormat::Text)
        .await
        .unwrap();
    assert_eq!(rescan.len(), 1);

    let rerun = register_all(&catalog, &base, &rescan).await;
    assert_eq!(rerun.registered, 1);
    assert_eq!(rerun.already_present, 0);
    assert_eq!(catalog.len(), 2);
}

#[tokio::test]
async fn test_registrar_guard_closes_scan_write_race() {
    let temp = TempDir::new().unwrap();
    let catalog = MemoryCatalog::new();
    let base = BasePath::parse("http://192.168.1.37:8080/").unwrap();

    make_folder(temp.path(), "alpha", &["data.csv"]).await;

    let candidates = discover::scan(temp.path(), &catalog, SourceFormat::Text)
        .await
        .unwrap();
    assert_eq!(candidates.len(), 1);

    // Another actor registers the same feed between scan and write.
    catalog.seed("alpha", "http://192.168.1.37:8080/alpha/data.csv", "csv");

    let report = register_all(&catalog, &base, &candidates).await;
    assert_eq!(report.registered, 0);
    assert_eq!(report.already_present, 1);
    assert_eq!(catalog.len(), 1);
}
