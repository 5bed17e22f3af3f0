//! feedsync - idempotent feed folder registration for a MISP catalog
//!
//! A one-shot synchronization tool bridging an offline data drop to a
//! catalog database: it scans a base directory for newly-arrived feed
//! folders, classifies each by data format, and registers unregistered ones
//! in the relational `feeds` table, composing each feed's retrieval URL from
//! a user-supplied base network path.
//!
//! # Architecture
//!
//! Running the same sync twice over an unchanged folder set is a no-op:
//! - discovery filters out folders whose name is already cataloged
//! - registration re-checks by name or URL before every insert
//!
//! The catalog database is the sole source of truth for duplicate
//! detection; nothing is cached between runs.
//!
//! # Modules
//!
//! - `catalog`: the `feeds` table boundary (row types, `Catalog` seam,
//!   MySQL/MariaDB implementation)
//! - `discover`: folder scanning and format classification
//! - `netpath`: base network path validation and URL composition
//! - `register`: the idempotent insertion protocol
//! - `config`: layered runtime configuration
//! - `cli`: interactive command-line surface
//!
//! # Usage
//!
//! ```bash
//! # Full interactive flow
//! feedsync sync
//!
//! # List what would be registered, writing nothing
//! feedsync scan
//!
//! # Connectivity check only
//! feedsync probe
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod discover;
pub mod netpath;
pub mod register;

// Re-export main types at crate root for convenience
pub use catalog::{Catalog, CatalogError, FeedId, MySqlCatalog, NewFeed, SourceFormat};
pub use config::{CatalogConfig, Config};
pub use discover::{FeedCandidate, MANIFEST_FILE};
pub use netpath::{BasePath, NetworkPathError};
pub use register::{RegistrationOutcome, SyncReport};
