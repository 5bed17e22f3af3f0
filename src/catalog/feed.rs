//! Row types for the catalog `feeds` table.

use serde::{Deserialize, Serialize};

/// Data format of a feed, as stored in `feeds.source_format`.
///
/// Derived from the folder listing alone; file contents are never opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// MISP-native feed (the folder carries a manifest file)
    Misp,

    /// CSV feed (at least one `.csv` file, no manifest)
    Csv,

    /// Plain freetext feed (the fallback)
    Text,
}

impl SourceFormat {
    /// Column value stored in the catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Misp => "misp",
            SourceFormat::Csv => "csv",
            SourceFormat::Text => "text",
        }
    }

    /// Parse a column value or user-supplied format name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "misp" => Some(SourceFormat::Misp),
            "csv" => Some(SourceFormat::Csv),
            "text" => Some(SourceFormat::Text),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insert payload for one new `feeds` row.
///
/// The catalog models no separate provider concept, so `provider` always
/// mirrors the feed name. The remaining columns of a row are a fixed bundle
/// of operational flags carried by the insert statement itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeed {
    /// Feed name, unique within the catalog
    pub name: String,

    /// Provider label, equal to `name`
    pub provider: String,

    /// Retrieval URL for the primary data file, unique within the catalog
    pub url: String,

    /// Classified data format
    pub source_format: SourceFormat,
}

impl NewFeed {
    /// Create an insert payload for a feed
    pub fn new(name: impl Into<String>, url: impl Into<String>, source_format: SourceFormat) -> Self {
        let name = name.into();
        Self {
            provider: name.clone(),
            name,
            url: url.into(),
            source_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_format_column_values() {
        assert_eq!(SourceFormat::Misp.as_str(), "misp");
        assert_eq!(SourceFormat::Csv.as_str(), "csv");
        assert_eq!(SourceFormat::Text.as_str(), "text");
    }

    #[test]
    fn test_source_format_parse() {
        assert_eq!(SourceFormat::parse("misp"), Some(SourceFormat::Misp));
        assert_eq!(SourceFormat::parse("CSV"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::parse("Text"), Some(SourceFormat::Text));
        assert_eq!(SourceFormat::parse("xml"), None);
    }

    #[test]
    fn test_source_format_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SourceFormat::Misp).unwrap(),
            "\"misp\""
        );
    }

    #[test]
    fn test_new_feed_provider_mirrors_name() {
        let feed = NewFeed::new("osint-alpha", "http://10.0.0.2/osint-alpha/data.csv", SourceFormat::Csv);
        assert_eq!(feed.provider, feed.name);
        assert_eq!(feed.source_format, SourceFormat::Csv);
    }
}
