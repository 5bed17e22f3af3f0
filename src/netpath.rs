//! Base network path validation and feed URL composition.
//!
//! Composition uses relative-URL joining, not string concatenation: the feed
//! URL is `base.join(folder + "/").join(file)`. A rooted segment replaces
//! everything before it, and a base whose path does not end in a separator
//! loses its last segment on join. Catalog rows written by earlier runs
//! depend on these exact semantics, so they must not change.

use thiserror::Error;
use url::Url;

/// Errors from network path handling
#[derive(Debug, Error)]
pub enum NetworkPathError {
    #[error("invalid network path '{0}': must start with http:// or https://")]
    MissingScheme(String),

    #[error("invalid network path '{0}': {1}")]
    Malformed(String, #[source] url::ParseError),

    #[error("cannot compose a feed URL from '{0}': {1}")]
    Join(String, #[source] url::ParseError),
}

/// Validated base network path under which all feed folders are served
#[derive(Debug, Clone)]
pub struct BasePath {
    url: Url,
}

impl BasePath {
    /// Validate and parse user input.
    ///
    /// Rejects anything that does not carry an explicit `http://` or
    /// `https://` scheme before any composition happens.
    pub fn parse(input: &str) -> Result<Self, NetworkPathError> {
        let trimmed = input.trim();

        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(NetworkPathError::MissingScheme(trimmed.to_string()));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| NetworkPathError::Malformed(trimmed.to_string(), e))?;

        Ok(Self { url })
    }

    /// Compose the absolute URL for a feed's primary data file.
    ///
    /// Two nested joins: the folder segment (normalized to exactly one
    /// trailing separator so the file joins into the folder rather than
    /// replacing it), then the data file name.
    pub fn feed_url(&self, folder_name: &str, data_file: &str) -> Result<Url, NetworkPathError> {
        let folder_segment = format!("{}/", folder_name.trim_end_matches('/'));

        let folder_url = self
            .url
            .join(&folder_segment)
            .map_err(|e| NetworkPathError::Join(folder_name.to_string(), e))?;

        folder_url
            .join(data_file)
            .map_err(|e| NetworkPathError::Join(data_file.to_string(), e))
    }

    /// The validated base as entered (no separator appended)
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}
