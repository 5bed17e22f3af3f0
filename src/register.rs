//! Idempotent feed registration.
//!
//! Registration re-checks for duplicates by name or url before every insert.
//! Discovery already filtered by name; the second check closes the race
//! window between scan and write and catches two folders composing to the
//! same URL. Per-feed failures never abort the rest of the run.

use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogError, NewFeed, SourceFormat};
use crate::discover::FeedCandidate;
use crate::netpath::BasePath;

/// Outcome of a single registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A new row was inserted and committed
    Registered,

    /// A row with the same name or url already exists; nothing was written
    AlreadyPresent,
}

/// Register one feed, inserting only if no row matches its name or url
pub async fn register_feed(
    catalog: &dyn Catalog,
    name: &str,
    url: &str,
    format: SourceFormat,
) -> Result<RegistrationOutcome, CatalogError> {
    if catalog.find_by_name_or_url(name, url).await?.is_some() {
        info!("feed '{}' already exists, skipping", name);
        return Ok(RegistrationOutcome::AlreadyPresent);
    }

    let feed = NewFeed::new(name, url, format);
    catalog.insert_feed(&feed).await?;

    info!(
        "feed '{}' ({} format) added to the catalog with URL: {}",
        name, format, url
    );
    Ok(RegistrationOutcome::Registered)
}

/// Counters for one sync run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// New rows inserted
    pub registered: usize,

    /// Candidates skipped because a matching row already existed
    pub already_present: usize,

    /// Candidates with no data file to reference
    pub skipped_no_data: usize,

    /// Candidates whose registration failed
    pub errors: usize,
}

impl SyncReport {
    pub fn total_processed(&self) -> usize {
        self.registered + self.already_present + self.skipped_no_data + self.errors
    }
}

/// Register every candidate under the given base network path.
///
/// Strictly sequential. A failed insert is logged and counted; the run
/// continues with the next candidate.
pub async fn register_all(
    catalog: &dyn Catalog,
    base: &BasePath,
    candidates: &[FeedCandidate],
) -> SyncReport {
    let mut report = SyncReport::default();

    for candidate in candidates {
        let data_file = match candidate.primary_data_file() {
            Some(file) => file,
            None => {
                warn!("no data file in '{}', skipping", candidate.name);
                report.skipped_no_data += 1;
                continue;
            }
        };

        let url = match base.feed_url(&candidate.name, data_file) {
            Ok(url) => url,
            Err(e) => {
                warn!("failed to compose a URL for '{}': {}", candidate.name, e);
                report.errors += 1;
                continue;
            }
        };

        match register_feed(catalog, &candidate.name, url.as_str(), candidate.format).await {
            Ok(RegistrationOutcome::Registered) => report.registered += 1,
            Ok(RegistrationOutcome::AlreadyPresent) => report.already_present += 1,
            Err(e) => {
                warn!("failed to add feed '{}' to the catalog: {}", candidate.name, e);
                report.errors += 1;
            }
        }
    }

    report
}
