//! Feed folder discovery.
//!
//! Walks the immediate subdirectories of the feeds base directory, classifies
//! each folder's data format from its listing, and filters out folders that
//! are already registered in the catalog. File contents are never opened.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{Catalog, SourceFormat};

/// Fixed-name metadata file whose presence marks a MISP-native feed folder
pub const MANIFEST_FILE: &str = "manifest.json";

/// A feed folder not yet present in the catalog.
///
/// Built during a single scan pass and discarded after the registration
/// attempt; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct FeedCandidate {
    /// Feed name, the folder's base name. Unique within the catalog.
    pub name: String,

    /// Folder location on the scanned filesystem
    pub source_path: PathBuf,

    /// Filenames in the folder excluding the manifest, in directory listing
    /// order. Holds the manifest itself when it is the only file present.
    pub data_files: Vec<String>,

    /// Classified data format
    pub format: SourceFormat,
}

impl FeedCandidate {
    /// The file the feed URL will point at
    pub fn primary_data_file(&self) -> Option<&str> {
        self.data_files.first().map(String::as_str)
    }
}

/// Classify a folder from its listing.
///
/// Precedence: a manifest wins over `.csv` files, `.csv` files win over the
/// configured fallback.
pub fn classify(has_manifest: bool, has_csv: bool, default_format: SourceFormat) -> SourceFormat {
    if has_manifest {
        SourceFormat::Misp
    } else if has_csv {
        SourceFormat::Csv
    } else {
        default_format
    }
}

/// Scan `base_dir` for feed folders that are not yet in the catalog.
///
/// Candidates come back in directory listing order (platform-dependent).
/// A catalog lookup failure aborts the scan entirely; a partially-checked
/// candidate list is never returned.
pub async fn scan(
    base_dir: &Path,
    catalog: &dyn Catalog,
    default_format: SourceFormat,
) -> Result<Vec<FeedCandidate>> {
    if !base_dir.is_dir() {
        anyhow::bail!("base feed directory '{}' not found", base_dir.display());
    }

    let mut candidates = Vec::new();

    let mut entries = tokio::fs::read_dir(base_dir)
        .await
        .with_context(|| format!("failed to read base feed directory: {}", base_dir.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }

        let folder_path = entry.path();
        let name = match entry.file_name().to_str() {
            Some(name) => name.to_string(),
            None => {
                warn!("skipping folder with non-UTF-8 name: {}", folder_path.display());
                continue;
            }
        };

        let listing = list_files(&folder_path).await?;
        let has_manifest = listing.iter().any(|f| f == MANIFEST_FILE);
        let has_csv = listing.iter().any(|f| is_csv(f));
        let mut data_files: Vec<String> = listing
            .into_iter()
            .filter(|f| f != MANIFEST_FILE)
            .collect();

        match catalog.find_by_name(&name).await {
            Ok(Some(id)) => {
                info!(
                    "feed folder '{}' already exists in the catalog (id {}), skipping",
                    name, id
                );
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                return Err(e).context("checking for existing feeds in the catalog");
            }
        }

        let format = classify(has_manifest, has_csv, default_format);

        // An empty folder has nothing for a feed URL to reference.
        if data_files.is_empty() && !has_manifest {
            continue;
        }
        if data_files.is_empty() {
            data_files.push(MANIFEST_FILE.to_string());
        }

        candidates.push(FeedCandidate {
            name,
            source_path: folder_path,
            data_files,
            format,
        });
    }

    Ok(candidates)
}

/// List the regular files directly inside a folder, in listing order
async fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("failed to read feed folder: {}", dir.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            files.push(name.to_string());
        }
    }

    Ok(files)
}

/// Suffix match, case-insensitive, the way the catalog system itself
/// recognizes CSV feeds
fn is_csv(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_manifest_wins_over_csv() {
        let format = classify(true, true, SourceFormat::Text);
        assert_eq!(format, SourceFormat::Misp);
    }

    #[test]
    fn test_classify_csv_without_manifest() {
        assert_eq!(classify(false, true, SourceFormat::Text), SourceFormat::Csv);
    }

    #[test]
    fn test_classify_falls_back_to_default() {
        assert_eq!(classify(false, false, SourceFormat::Text), SourceFormat::Text);
        assert_eq!(classify(false, false, SourceFormat::Csv), SourceFormat::Csv);
    }

    #[test]
    fn test_is_csv_case_insensitive() {
        assert!(is_csv("indicators.csv"));
        assert!(is_csv("INDICATORS.CSV"));
        assert!(is_csv(".csv"));
        assert!(!is_csv("indicators.csv.gz"));
        assert!(!is_csv("notes.txt"));
    }
}
