//! Catalog access over a MySQL/MariaDB `feeds` table.
//!
//! Every operation opens a fresh short-lived connection and closes it before
//! returning, so no connection is ever held across user-interaction waits.
//! The catalog is the sole source of truth for duplicate detection; nothing
//! is cached between calls.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};
use thiserror::Error;
use tokio::time::timeout;

use crate::config::CatalogConfig;

use super::feed::NewFeed;

/// Row id in the `feeds` table
pub type FeedId = i64;

/// Errors from the catalog store
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("catalog did not respond within {0} seconds; check credentials and network connectivity")]
    Timeout(u64),

    #[error("catalog query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Query and insert capability against the `feeds` table.
///
/// The discoverer and registrar depend only on this seam, which keeps their
/// logic testable against an in-memory implementation.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Round-trip connectivity check
    async fn probe(&self) -> Result<(), CatalogError>;

    /// Exact-match lookup by feed name
    async fn find_by_name(&self, name: &str) -> Result<Option<FeedId>, CatalogError>;

    /// Exact-match lookup by feed name or url
    async fn find_by_name_or_url(&self, name: &str, url: &str)
        -> Result<Option<FeedId>, CatalogError>;

    /// Insert a new feed row
    async fn insert_feed(&self, feed: &NewFeed) -> Result<(), CatalogError>;
}

// `default` is backticked since it is a reserved word. Everything besides
// name, provider, url and source_format is the fixed operational flag bundle
// the catalog system expects on a network feed row.
const INSERT_FEED_SQL: &str = "\
INSERT INTO feeds (name, provider, url, rules, enabled, distribution, sharing_group_id, tag_id, \
                   `default`, source_format, fixed_event, delta_merge, event_id, publish, override_ids, \
                   settings, input_source, delete_local_file, lookup_visible, headers, caching_enabled, \
                   force_to_ids, orgc_id, tag_collection_id) \
VALUES (?, ?, ?, NULL, 1, 0, 0, 0, 0, ?, 0, 0, 0, 1, 0, 0, 'network', 0, 1, NULL, 1, 0, 1, 0)";

/// Catalog backed by a MariaDB/MySQL database
pub struct MySqlCatalog {
    options: MySqlConnectOptions,
    connect_timeout_secs: u64,
}

impl MySqlCatalog {
    /// Build a catalog handle from resolved connection settings
    pub fn new(config: &CatalogConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        Self {
            options,
            connect_timeout_secs: config.connect_timeout_secs,
        }
    }

    /// Open a connection for a single operation, bounded by the configured
    /// timeout so bad credentials or an unreachable host fail fast.
    async fn connect(&self) -> Result<MySqlConnection, CatalogError> {
        let bound = Duration::from_secs(self.connect_timeout_secs);
        match timeout(bound, self.options.connect()).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(CatalogError::Connect(e)),
            Err(_) => Err(CatalogError::Timeout(self.connect_timeout_secs)),
        }
    }
}

#[async_trait]
impl Catalog for MySqlCatalog {
    async fn probe(&self) -> Result<(), CatalogError> {
        let mut conn = self.connect().await?;
        let result: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&mut conn).await?;
        let _ = conn.close().await;

        if result != 1 {
            return Err(CatalogError::Connect(sqlx::Error::Protocol(
                "probe query returned an unexpected result".into(),
            )));
        }
        Ok(())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<FeedId>, CatalogError> {
        let mut conn = self.connect().await?;
        let id = sqlx::query_scalar::<_, FeedId>("SELECT id FROM feeds WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut conn)
            .await?;
        let _ = conn.close().await;
        Ok(id)
    }

    async fn find_by_name_or_url(
        &self,
        name: &str,
        url: &str,
    ) -> Result<Option<FeedId>, CatalogError> {
        let mut conn = self.connect().await?;
        let id = sqlx::query_scalar::<_, FeedId>("SELECT id FROM feeds WHERE name = ? OR url = ?")
            .bind(name)
            .bind(url)
            .fetch_optional(&mut conn)
            .await?;
        let _ = conn.close().await;
        Ok(id)
    }

    async fn insert_feed(&self, feed: &NewFeed) -> Result<(), CatalogError> {
        let mut conn = self.connect().await?;
        sqlx::query(INSERT_FEED_SQL)
            .bind(&feed.name)
            .bind(&feed.provider)
            .bind(&feed.url)
            .bind(feed.source_format.as_str())
            .execute(&mut conn)
            .await?;
        let _ = conn.close().await;
        Ok(())
    }
}
