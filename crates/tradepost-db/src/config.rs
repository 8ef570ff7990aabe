//! # Storefront Configuration
//!
//! Settings for the database pool and the catalog services.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TRADEPOST_DATABASE_PATH=/srv/tradepost.db                          │
//! │     TRADEPOST_SUPPLIER_COUNTS=grouped                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tradepost/storefront.toml (Linux)                        │
//! │     ~/Library/Application Support/com.tradepost.storefront/ (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     page_size = 12, trending window = 30 days                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [database]
//! path = "/srv/tradepost/tradepost.db"
//! max_connections = 5
//! min_connections = 1
//! connect_timeout_secs = 30
//! read_only = false
//!
//! [catalog]
//! page_size = 12
//! trending_window_days = 30
//! trending_limit = 10
//! category_aggregation = "in_process"  # in_process | database
//! supplier_counts = "per_supplier"     # per_supplier | grouped
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use tradepost_core::{CoreError, TrendingWindow, MAX_PAGE_SIZE};

use crate::pool::DbConfig;

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No config path available")]
    NoPath,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Strategies
// =============================================================================

/// Where category grouping happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryAggregation {
    /// Fetch category columns and group in Rust.
    #[default]
    InProcess,
    /// `GROUP BY` in SQL.
    Database,
}

impl std::fmt::Display for CategoryAggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryAggregation::InProcess => write!(f, "in_process"),
            CategoryAggregation::Database => write!(f, "database"),
        }
    }
}

impl std::str::FromStr for CategoryAggregation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in_process" | "client" => Ok(CategoryAggregation::InProcess),
            "database" | "sql" => Ok(CategoryAggregation::Database),
            other => Err(CoreError::UnknownStrategy {
                setting: "category_aggregation".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// How supplier product counts are computed for a directory page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierCountStrategy {
    /// One count query per supplier, issued concurrently.
    #[default]
    PerSupplier,
    /// One `GROUP BY supplier_id` query for the page.
    Grouped,
}

impl std::fmt::Display for SupplierCountStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupplierCountStrategy::PerSupplier => write!(f, "per_supplier"),
            SupplierCountStrategy::Grouped => write!(f, "grouped"),
        }
    }
}

impl std::str::FromStr for SupplierCountStrategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per_supplier" => Ok(SupplierCountStrategy::PerSupplier),
            "grouped" | "group_by" => Ok(SupplierCountStrategy::Grouped),
            other => Err(CoreError::UnknownStrategy {
                setting: "supplier_counts".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Database Settings
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Created on first connect.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Pool acquire timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Serve an existing catalog file without writing to it.
    #[serde(default)]
    pub read_only: bool,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "tradepost", "storefront")
        .map(|dirs| dirs.data_dir().join("tradepost.db"))
        .unwrap_or_else(|| PathBuf::from("tradepost.db"))
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            read_only: false,
        }
    }
}

impl DatabaseSettings {
    /// Pool configuration for these settings.
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig::new(self.path.clone())
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .read_only(self.read_only)
    }
}

// =============================================================================
// Catalog Settings
// =============================================================================

/// `[catalog]` section, handed to the services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Default page size for product and supplier listings.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Trailing window for trending categories and active suppliers.
    #[serde(default = "default_trending_window_days")]
    pub trending_window_days: i64,

    /// Number of trending categories returned when the caller does not say.
    #[serde(default = "default_trending_limit")]
    pub trending_limit: usize,

    #[serde(default)]
    pub category_aggregation: CategoryAggregation,

    #[serde(default)]
    pub supplier_counts: SupplierCountStrategy,
}

fn default_page_size() -> u32 {
    tradepost_core::DEFAULT_PAGE_SIZE
}

fn default_trending_window_days() -> i64 {
    tradepost_core::DEFAULT_TRENDING_WINDOW_DAYS
}

fn default_trending_limit() -> usize {
    tradepost_core::DEFAULT_TRENDING_LIMIT
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            page_size: default_page_size(),
            trending_window_days: default_trending_window_days(),
            trending_limit: default_trending_limit(),
            category_aggregation: CategoryAggregation::default(),
            supplier_counts: SupplierCountStrategy::default(),
        }
    }
}

impl CatalogSettings {
    pub fn trending_window(&self) -> TrendingWindow {
        TrendingWindow::new(self.trending_window_days)
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,
}

impl StorefrontConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml), if it exists
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses a TOML file without applying overrides.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, toml::to_string_pretty(self)?)?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(format!(
                "database.min_connections ({}) exceeds max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.catalog.page_size) {
            return Err(ConfigError::Invalid(format!(
                "catalog.page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.catalog.page_size
            )));
        }

        if self.catalog.trending_window_days < 0 {
            return Err(ConfigError::Invalid(
                "catalog.trending_window_days must not be negative".into(),
            ));
        }

        Ok(())
    }

    /// Applies `TRADEPOST_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TRADEPOST_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("TRADEPOST_MAX_CONNECTIONS") {
            match max.parse() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid TRADEPOST_MAX_CONNECTIONS"),
            }
        }

        if let Some(size) = lookup("TRADEPOST_PAGE_SIZE") {
            match size.parse() {
                Ok(n) => self.catalog.page_size = n,
                Err(_) => warn!(value = %size, "Ignoring invalid TRADEPOST_PAGE_SIZE"),
            }
        }

        if let Some(days) = lookup("TRADEPOST_TRENDING_WINDOW_DAYS") {
            match days.parse() {
                Ok(n) => self.catalog.trending_window_days = n,
                Err(_) => warn!(value = %days, "Ignoring invalid TRADEPOST_TRENDING_WINDOW_DAYS"),
            }
        }

        if let Some(strategy) = lookup("TRADEPOST_CATEGORY_AGGREGATION") {
            match strategy.parse() {
                Ok(parsed) => {
                    debug!(strategy = %strategy, "Overriding category aggregation from environment");
                    self.catalog.category_aggregation = parsed;
                }
                Err(e) => warn!("Ignoring TRADEPOST_CATEGORY_AGGREGATION: {}", e),
            }
        }

        if let Some(strategy) = lookup("TRADEPOST_SUPPLIER_COUNTS") {
            match strategy.parse() {
                Ok(parsed) => {
                    debug!(strategy = %strategy, "Overriding supplier count strategy from environment");
                    self.catalog.supplier_counts = parsed;
                }
                Err(e) => warn!("Ignoring TRADEPOST_SUPPLIER_COUNTS: {}", e),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tradepost", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = StorefrontConfig::default();
        assert_eq!(config.catalog.page_size, 12);
        assert_eq!(config.catalog.trending_window_days, 30);
        assert_eq!(config.catalog.category_aggregation, CategoryAggregation::InProcess);
        assert_eq!(config.catalog.supplier_counts, SupplierCountStrategy::PerSupplier);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "database".parse::<CategoryAggregation>().unwrap(),
            CategoryAggregation::Database
        );
        assert_eq!(
            "Grouped".parse::<SupplierCountStrategy>().unwrap(),
            SupplierCountStrategy::Grouped
        );
        let err = "cached".parse::<CategoryAggregation>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown category_aggregation 'cached'");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[catalog]\npage_size = 24\nsupplier_counts = \"grouped\"\n"
        )
        .unwrap();

        let config = StorefrontConfig::load(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.catalog.page_size, 24);
        assert_eq!(config.catalog.supplier_counts, SupplierCountStrategy::Grouped);
        assert_eq!(config.catalog.trending_limit, 10);
        assert_eq!(config.database.max_connections, 5);
        assert!(!config.database.read_only);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[catalog]\npage_size = \"many\"").unwrap();
        assert!(matches!(
            StorefrontConfig::load(Some(file.path().to_path_buf())),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("TRADEPOST_DATABASE_PATH", "/tmp/override.db"),
            ("TRADEPOST_PAGE_SIZE", "30"),
            ("TRADEPOST_TRENDING_WINDOW_DAYS", "not-a-number"),
            ("TRADEPOST_CATEGORY_AGGREGATION", "database"),
            ("TRADEPOST_SUPPLIER_COUNTS", "bogus"),
        ]
        .into_iter()
        .collect();

        let mut config = StorefrontConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/tmp/override.db"));
        assert_eq!(config.catalog.page_size, 30);
        assert_eq!(config.catalog.trending_window_days, 30);
        assert_eq!(config.catalog.category_aggregation, CategoryAggregation::Database);
        assert_eq!(config.catalog.supplier_counts, SupplierCountStrategy::PerSupplier);
    }

    #[test]
    fn test_validation() {
        let mut config = StorefrontConfig::default();
        config.catalog.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = StorefrontConfig::default();
        config.database.min_connections = 10;
        assert!(config.validate().is_err());

        let mut config = StorefrontConfig::default();
        config.catalog.trending_window_days = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storefront.toml");

        let mut config = StorefrontConfig::default();
        config.catalog.category_aggregation = CategoryAggregation::Database;
        config.save(Some(path.clone())).unwrap();

        let reloaded = StorefrontConfig::from_file(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_db_config_from_settings() {
        let settings = DatabaseSettings {
            path: PathBuf::from("/tmp/x.db"),
            max_connections: 8,
            min_connections: 2,
            connect_timeout_secs: 3,
            read_only: true,
        };
        let db = settings.to_db_config();
        assert_eq!(db.max_connections, 8);
        assert_eq!(db.connect_timeout, Duration::from_secs(3));
        assert!(db.read_only);
    }
}
