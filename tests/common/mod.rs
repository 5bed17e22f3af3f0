//! Shared test support: an in-memory stand-in for the MySQL catalog.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use feedsync::{Catalog, CatalogError, FeedId, NewFeed};

/// One registered row, as the fake store keeps it
#[derive(Debug, Clone)]
pub struct StoredFeed {
    pub id: FeedId,
    pub name: String,
    pub provider: String,
    pub url: String,
    pub source_format: String,
}

/// In-memory catalog enforcing the same name/url uniqueness the real
/// `feeds` table does
#[derive(Default)]
pub struct MemoryCatalog {
    rows: Mutex<Vec<StoredFeed>>,
    fail_lookups: AtomicBool,
    fail_next_insert: AtomicBool,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pre-registered feed row
    pub fn with_feed(self, name: &str, url: &str) -> Self {
        self.seed(name, url, "text");
        self
    }

    pub fn seed(&self, name: &str, url: &str, source_format: &str) {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as FeedId + 1;
        rows.push(StoredFeed {
            id,
            name: name.to_string(),
            provider: name.to_string(),
            url: url.to_string(),
            source_format: source_format.to_string(),
        });
    }

    pub fn rows(&self) -> Vec<StoredFeed> {
        self.rows.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Make every lookup fail until cleared
    pub fn fail_lookups(&self) {
        self.fail_lookups.store(true, Ordering::SeqCst);
    }

    /// Make the next insert fail
    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    fn injected_error() -> CatalogError {
        CatalogError::Query(sqlx::Error::Protocol("injected test failure".into()))
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn probe(&self) -> Result<(), CatalogError> {
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<FeedId>, CatalogError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(Self::injected_error());
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.id))
    }

    async fn find_by_name_or_url(
        &self,
        name: &str,
        url: &str,
    ) -> Result<Option<FeedId>, CatalogError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(Self::injected_error());
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.name == name || row.url == url)
            .map(|row| row.id))
    }

    async fn insert_feed(&self, feed: &NewFeed) -> Result<(), CatalogError> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(Self::injected_error());
        }

        let mut rows = self.rows.lock().unwrap();
        // Unique constraints on name and url, as in the real table
        if rows.iter().any(|row| row.name == feed.name || row.url == feed.url) {
            return Err(CatalogError::Query(sqlx::Error::Protocol(
                "duplicate entry violates unique constraint".into(),
            )));
        }

        let id = rows.len() as FeedId + 1;
        rows.push(StoredFeed {
            id,
            name: feed.name.clone(),
            provider: feed.provider.clone(),
            url: feed.url.clone(),
            source_format: feed.source_format.as_str().to_string(),
        });
        Ok(())
    }
}
