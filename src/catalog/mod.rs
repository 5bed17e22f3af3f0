//! Catalog store boundary.
//!
//! This module contains:
//! - feed: row types for the `feeds` table
//! - store: the `Catalog` seam and its MySQL/MariaDB implementation

pub mod feed;
pub mod store;

// Re-export commonly used types
pub use feed::{NewFeed, SourceFormat};
pub use store::{Catalog, CatalogError, FeedId, MySqlCatalog};
