//! Runtime configuration for feedsync.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (FEEDSYNC_*)
//! 2. Config file (.feedsync/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .feedsync/config.yaml,
//!   then ~/.feedsync/config.yaml
//! - A relative feeds directory in the config file is resolved against the
//!   config file's project root (the parent of .feedsync/)
//!
//! The resolved configuration is an explicit struct handed to the probe,
//! discoverer, and registrar; there is no process-wide mutable state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::catalog::SourceFormat;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub catalog: CatalogFileConfig,

    /// Base directory where feed folders are dropped
    pub feeds_dir: Option<String>,

    /// Fallback feed format when neither a manifest nor .csv files are found
    pub default_format: Option<SourceFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub connect_timeout_secs: Option<u64>,
}

/// Resolved catalog connection settings
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,

    /// Bound on connection establishment, so bad credentials or an
    /// unreachable host fail fast instead of hanging
    pub connect_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "misp".to_string(),
            password: String::new(),
            database: "misp".to_string(),
            connect_timeout_secs: 5,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Catalog database connection settings
    pub catalog: CatalogConfig,

    /// Base directory where feed folders are dropped
    pub feeds_dir: PathBuf,

    /// Fallback format for folders with neither a manifest nor .csv files
    pub default_format: SourceFormat,

    /// Path to the config file, if one was found
    pub config_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources
    pub fn load() -> Result<Config> {
        let config_path = find_config_file();

        let file = match &config_path {
            Some(path) => Some(load_config_file(path)?),
            None => None,
        };

        let mut config = Config::resolve(file.as_ref(), config_path.as_deref());
        config.config_file = config_path;
        apply_env(&mut config)?;

        Ok(config)
    }

    /// Apply file values over the defaults
    fn resolve(file: Option<&ConfigFile>, config_path: Option<&Path>) -> Config {
        let mut catalog = CatalogConfig::default();
        let mut feeds_dir = PathBuf::from("AirgapIntel_Feeds");
        let mut default_format = SourceFormat::Text;

        if let Some(file) = file {
            if let Some(host) = &file.catalog.host {
                catalog.host = host.clone();
            }
            if let Some(port) = file.catalog.port {
                catalog.port = port;
            }
            if let Some(user) = &file.catalog.user {
                catalog.user = user.clone();
            }
            if let Some(password) = &file.catalog.password {
                catalog.password = password.clone();
            }
            if let Some(database) = &file.catalog.database {
                catalog.database = database.clone();
            }
            if let Some(secs) = file.catalog.connect_timeout_secs {
                catalog.connect_timeout_secs = secs;
            }
            if let Some(dir) = &file.feeds_dir {
                // Relative to the project root: the parent of .feedsync/
                let base = config_path
                    .and_then(|p| p.parent())
                    .and_then(|p| p.parent())
                    .unwrap_or(Path::new("."));
                feeds_dir = resolve_path(base, dir);
            }
            if let Some(format) = file.default_format {
                default_format = format;
            }
        }

        Config {
            catalog,
            feeds_dir,
            default_format,
            config_file: None,
        }
    }
}

/// Find config file by searching current directory and parents, then home
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let candidate = current.join(".feedsync").join("config.yaml");
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                break;
            }
        }
    }

    dirs::home_dir()
        .map(|home| home.join(".feedsync").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse a config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the given base
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Apply FEEDSYNC_* environment overrides
fn apply_env(config: &mut Config) -> Result<()> {
    if let Ok(host) = std::env::var("FEEDSYNC_DB_HOST") {
        config.catalog.host = host;
    }
    if let Ok(port) = std::env::var("FEEDSYNC_DB_PORT") {
        config.catalog.port = port
            .parse()
            .with_context(|| format!("invalid FEEDSYNC_DB_PORT: {}", port))?;
    }
    if let Ok(user) = std::env::var("FEEDSYNC_DB_USER") {
        config.catalog.user = user;
    }
    if let Ok(password) = std::env::var("FEEDSYNC_DB_PASSWORD") {
        config.catalog.password = password;
    }
    if let Ok(database) = std::env::var("FEEDSYNC_DB_NAME") {
        config.catalog.database = database;
    }
    if let Ok(secs) = std::env::var("FEEDSYNC_DB_TIMEOUT_SECS") {
        config.catalog.connect_timeout_secs = secs
            .parse()
            .with_context(|| format!("invalid FEEDSYNC_DB_TIMEOUT_SECS: {}", secs))?;
    }
    if let Ok(dir) = std::env::var("FEEDSYNC_FEEDS_DIR") {
        config.feeds_dir = PathBuf::from(dir);
    }
    if let Ok(format) = std::env::var("FEEDSYNC_DEFAULT_FORMAT") {
        config.default_format = SourceFormat::parse(&format)
            .with_context(|| format!("invalid FEEDSYNC_DEFAULT_FORMAT: {}", format))?;
    }
    Ok(())
}
