//! # Store Configuration
//!
//! Configuration for the store, its database, and the partner split.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     AURA_DB_PATH=/data/aura.db                                         │
//! │     AURA_STORE_ID=aura-beauty-store                                    │
//! │     AURA_STORE_NAME="Aura Beauty"                                      │
//! │     AURA_GUARD_STOCK=true                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/aura-pos/aura.toml (Linux)                               │
//! │     ~/Library/Application Support/com.aura.pos/aura.toml (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Partner A 60% / Partner B 40%, unguarded stock                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! id = "aura-beauty-store"
//! name = "Aura Beauty"
//!
//! [database]
//! path = "/var/lib/aura/aura.db"
//! max_connections = 5
//!
//! [[partners]]
//! name = "Partner A"
//! share_percent = 60
//!
//! [[partners]]
//! name = "Partner B"
//! share_percent = 40
//!
//! [stock]
//! guard_negative = false
//! low_stock_threshold = 5
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use aura_core::{
    PartnerShare, ProfitSplit, Rate, StockGuard, LOW_STOCK_THRESHOLD, STORE_ID,
};

use crate::engine::EngineOptions;
use crate::pool::DbConfig;

const CONFIG_FILE_NAME: &str = "aura.toml";
const DATABASE_FILE_NAME: &str = "aura.db";

// =============================================================================
// Errors
// =============================================================================

/// Configuration load/validate errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[store]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_id")]
    pub id: String,

    #[serde(default = "default_store_name")]
    pub name: String,
}

fn default_store_id() -> String {
    STORE_ID.to_string()
}

fn default_store_name() -> String {
    "Aura Beauty".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            id: default_store_id(),
            name: default_store_name(),
        }
    }
}

/// `[database]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// One `[[partners]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerSettings {
    pub name: String,
    /// Percentage of distributable profit, e.g. `60` or `33.33`.
    pub share_percent: f64,
}

impl PartnerSettings {
    fn share(&self) -> ConfigResult<Rate> {
        let bps = (self.share_percent * 100.0).round();
        if !(0.0..=10_000.0).contains(&bps) {
            return Err(ConfigError::Invalid(format!(
                "share_percent for '{}' must be between 0 and 100, got {}",
                self.name, self.share_percent
            )));
        }
        Ok(Rate::from_bps(bps as u32))
    }
}

fn default_partners() -> Vec<PartnerSettings> {
    ProfitSplit::default()
        .partners()
        .iter()
        .map(|p| PartnerSettings {
            name: p.name.clone(),
            share_percent: p.share.percentage(),
        })
        .collect()
}

/// `[stock]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSettings {
    /// Abort a checkout that would take stock below zero.
    #[serde(default)]
    pub guard_negative: bool,

    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
}

fn default_low_stock_threshold() -> i64 {
    LOW_STOCK_THRESHOLD
}

impl Default for StockSettings {
    fn default() -> Self {
        StockSettings {
            guard_negative: false,
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuraConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default = "default_partners")]
    pub partners: Vec<PartnerSettings>,

    #[serde(default)]
    pub stock: StockSettings,
}

impl Default for AuraConfig {
    fn default() -> Self {
        AuraConfig {
            store: StoreSettings::default(),
            database: DatabaseSettings::default(),
            partners: default_partners(),
            stock: StockSettings::default(),
        }
    }
}

impl AuraConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`aura.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document. Missing sections take their defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, toml::to_string_pretty(self)?)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// ## Rules
    /// - store id not blank
    /// - at least one partner, unique names, shares summing to 100%
    /// - at least one database connection
    /// - non-negative low stock threshold
    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.id.trim().is_empty() {
            return Err(ConfigError::Invalid("store.id cannot be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.stock.low_stock_threshold < 0 {
            return Err(ConfigError::Invalid(
                "stock.low_stock_threshold cannot be negative".into(),
            ));
        }

        self.profit_split()?;
        Ok(())
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// `load` passes `std::env::var`; tests pass a map.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("AURA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(id) = lookup("AURA_STORE_ID") {
            debug!(store_id = %id, "Overriding store ID from environment");
            self.store.id = id;
        }

        if let Some(name) = lookup("AURA_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(guard) = lookup("AURA_GUARD_STOCK") {
            match guard.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.stock.guard_negative = true,
                "0" | "false" | "no" | "off" => self.stock.guard_negative = false,
                _ => warn!(value = %guard, "Unknown AURA_GUARD_STOCK value in environment"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "aura", "pos")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Conversions
    // =========================================================================

    /// Builds the validated partner split.
    pub fn profit_split(&self) -> ConfigResult<ProfitSplit> {
        let partners = self
            .partners
            .iter()
            .map(|p| Ok(PartnerShare::new(p.name.trim(), p.share()?)))
            .collect::<ConfigResult<Vec<_>>>()?;

        ProfitSplit::new(partners).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn stock_guard(&self) -> StockGuard {
        if self.stock.guard_negative {
            StockGuard::NonNegative
        } else {
            StockGuard::Unchecked
        }
    }

    /// Database file: configured path, else the platform data directory,
    /// else `aura.db` in the working directory.
    pub fn database_path(&self) -> PathBuf {
        self.database.path.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("com", "aura", "pos")
                .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
                .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
        })
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path())
            .store_id(self.store.id.clone())
            .max_connections(self.database.max_connections)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            store_id: self.store.id.clone(),
            stock_guard: self.stock_guard(),
            low_stock_threshold: self.stock.low_stock_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AuraConfig::default();
        assert_eq!(config.store.id, STORE_ID);
        assert_eq!(config.partners.len(), 2);
        assert_eq!(config.stock_guard(), StockGuard::Unchecked);
        assert!(config.validate().is_ok());

        let split = config.profit_split().unwrap();
        assert_eq!(split, ProfitSplit::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AuraConfig::from_toml(
            r#"
            [store]
            name = "Aura Zona 10"

            [stock]
            guard_negative = true
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "Aura Zona 10");
        assert_eq!(config.store.id, STORE_ID);
        assert_eq!(config.stock_guard(), StockGuard::NonNegative);
        assert_eq!(config.stock.low_stock_threshold, LOW_STOCK_THRESHOLD);
        assert_eq!(config.partners.len(), 2);
    }

    #[test]
    fn test_custom_partners() {
        let config = AuraConfig::from_toml(
            r#"
            [[partners]]
            name = "Lucía"
            share_percent = 33.33

            [[partners]]
            name = "Marta"
            share_percent = 33.33

            [[partners]]
            name = "Sofía"
            share_percent = 33.34
            "#,
        )
        .unwrap();

        let split = config.profit_split().unwrap();
        let bps: Vec<u32> = split.partners().iter().map(|p| p.share.bps()).collect();
        assert_eq!(bps, vec![3333, 3333, 3334]);
    }

    #[test]
    fn test_invalid_partner_split() {
        let mut config = AuraConfig::default();
        config.partners[0].share_percent = 50.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AuraConfig::default();
        config.partners[1].name = config.partners[0].name.clone();
        assert!(config.validate().is_err());

        let mut config = AuraConfig::default();
        config.partners.clear();
        assert!(config.validate().is_err());

        let mut config = AuraConfig::default();
        config.partners[0].share_percent = 160.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("AURA_DB_PATH", "/tmp/aura-test.db"),
            ("AURA_STORE_ID", "tienda-2"),
            ("AURA_STORE_NAME", "Aura Centro"),
            ("AURA_GUARD_STOCK", "yes"),
        ]
        .into_iter()
        .collect();

        let mut config = AuraConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path(), PathBuf::from("/tmp/aura-test.db"));
        assert_eq!(config.store.id, "tienda-2");
        assert_eq!(config.store.name, "Aura Centro");
        assert_eq!(config.stock_guard(), StockGuard::NonNegative);

        let db = config.db_config();
        assert_eq!(db.store_id, "tienda-2");
        assert_eq!(config.engine_options().stock_guard, StockGuard::NonNegative);
    }

    #[test]
    fn test_unknown_guard_value_is_ignored() {
        let mut config = AuraConfig::default();
        config.apply_env_overrides(|key| (key == "AURA_GUARD_STOCK").then(|| "maybe".to_string()));
        assert!(!config.stock.guard_negative);
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = AuraConfig::from_toml("[store\nid = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&AuraConfig::default()).unwrap();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[[partners]]"));
        assert!(!toml_str.contains("currency_symbol"));
        assert_eq!(AuraConfig::from_toml(&toml_str).unwrap(), AuraConfig::default());
    }

    #[test]
    fn test_older_files_with_currency_symbol_still_load() {
        let config = AuraConfig::from_toml(
            r#"
            [store]
            name = "Aura Centro"
            currency_symbol = "Q"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.name, "Aura Centro");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("aura-config-that-does-not-exist.toml");
        let config = AuraConfig::load(Some(path)).unwrap();
        assert_eq!(config.partners.len(), 2);
    }
}
