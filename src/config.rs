//! Configuration management with validation and defaults
//!
//! TOML file, then `CROUPIER_*` environment overrides, then validation.

use crate::errors::{ConfigurationError, CroupierResult};
use crate::ledger::DEFAULT_LEDGER_CAPACITY;
use serde::{Deserialize, Serialize};
use std::{env, path::Path};

/// Complete table configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CroupierConfig {
    pub table: TableConfig,
    pub ledger: LedgerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Bankroll and wheel settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TableConfig {
    /// Balance of a fresh account, counted as injected capital
    pub starting_balance: u64,
    /// Stake used by `simulate` and by `play` when none is given
    pub default_stake: u64,
    /// Fixed wheel seed for reproducible runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            starting_balance: 1000,
            default_stake: 10,
            rng_seed: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LedgerConfig {
    pub capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_LEDGER_CAPACITY,
        }
    }
}

/// Where player state is kept between runs
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file replaced atomically on every save
    File,
    /// Nothing survives the process
    Memory,
    /// Single-key RocksDB database (`rocksdb-store` feature)
    Rocksdb,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// State file for `file`, database directory for `rocksdb`
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: "./croupier_state.json".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
        }
    }
}

impl CroupierConfig {
    /// In-memory table with a fixed seed, for tests and demos
    pub fn testing() -> Self {
        Self {
            table: TableConfig {
                rng_seed: Some(42),
                ..Default::default()
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                ..Default::default()
            },
            logging: LoggingConfig {
                level: LogLevel::Debug,
            },
            ..Default::default()
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.ledger.capacity == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "ledger.capacity".to_string(),
                value: "0".to_string(),
                reason: "Ledger must keep at least one entry".to_string(),
            });
        }

        if self.table.default_stake == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "table.default_stake".to_string(),
                value: "0".to_string(),
                reason: "Stake must be positive".to_string(),
            });
        }

        if self.storage.backend != StorageBackend::Memory && self.storage.path.trim().is_empty() {
            return Err(ConfigurationError::MissingRequired("storage.path".to_string()));
        }

        if self.storage.backend == StorageBackend::Rocksdb && !cfg!(feature = "rocksdb-store") {
            return Err(ConfigurationError::InvalidValue {
                field: "storage.backend".to_string(),
                value: "rocksdb".to_string(),
                reason: "built without the rocksdb-store feature".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> CroupierResult<CroupierConfig> {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => CroupierConfig::default(),
        };

        apply_overrides(&mut config, |key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> Result<CroupierConfig, ConfigurationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)))
    }

    /// Save configuration to file
    pub fn save(&self, config: &CroupierConfig, path: &str) -> CroupierResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: String, reason: &str) -> Result<T, ConfigurationError> {
    value.trim().parse().map_err(|_| ConfigurationError::InvalidValue {
        field: key.to_string(),
        value,
        reason: reason.to_string(),
    })
}

/// Apply `CROUPIER_*` overrides read through `lookup`
pub fn apply_overrides<F>(config: &mut CroupierConfig, lookup: F) -> Result<(), ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("CROUPIER_STARTING_BALANCE") {
        config.table.starting_balance =
            parse_override("CROUPIER_STARTING_BALANCE", value, "Invalid balance")?;
    }
    if let Some(value) = lookup("CROUPIER_DEFAULT_STAKE") {
        config.table.default_stake = parse_override("CROUPIER_DEFAULT_STAKE", value, "Invalid stake")?;
    }
    if let Some(value) = lookup("CROUPIER_RNG_SEED") {
        config.table.rng_seed = Some(parse_override("CROUPIER_RNG_SEED", value, "Invalid seed")?);
    }
    if let Some(value) = lookup("CROUPIER_LEDGER_CAPACITY") {
        config.ledger.capacity = parse_override("CROUPIER_LEDGER_CAPACITY", value, "Invalid capacity")?;
    }
    if let Some(value) = lookup("CROUPIER_STATE_PATH") {
        config.storage.path = value;
    }
    if let Some(value) = lookup("CROUPIER_LOG_LEVEL") {
        config.logging.level = parse_override("CROUPIER_LOG_LEVEL", value, "Invalid log level")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = CroupierConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.table.starting_balance, 1000);
        assert_eq!(config.ledger.capacity, 100);
        assert_eq!(config.storage.backend, StorageBackend::File);
    }

    #[test]
    fn test_testing_config_is_valid() {
        let config = CroupierConfig::testing();
        assert!(config.validate().is_ok());
        assert_eq!(config.table.rng_seed, Some(42));
    }

    #[test]
    fn test_invalid_config_validation() {
        let mut config = CroupierConfig::default();
        config.ledger.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = CroupierConfig::default();
        config.storage.path = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CROUPIER_STARTING_BALANCE", "5000"),
            ("CROUPIER_RNG_SEED", "7"),
            ("CROUPIER_LOG_LEVEL", "DEBUG"),
        ]
        .into_iter()
        .collect();

        let mut config = CroupierConfig::default();
        apply_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.table.starting_balance, 5000);
        assert_eq!(config.table.rng_seed, Some(7));
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_bad_override_rejected() {
        let mut config = CroupierConfig::default();
        let err = apply_overrides(&mut config, |key| {
            (key == "CROUPIER_LEDGER_CAPACITY").then(|| "lots".to_string())
        })
        .unwrap_err();

        match err {
            ConfigurationError::InvalidValue { field, value, .. } => {
                assert_eq!(field, "CROUPIER_LEDGER_CAPACITY");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(config.ledger.capacity, 100);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: CroupierConfig = toml::from_str("[table]\nstarting_balance = 250\n").unwrap();

        assert_eq!(config.table.starting_balance, 250);
        assert_eq!(config.table.default_stake, 10);
        assert_eq!(config.ledger.capacity, 100);
    }

    #[test]
    fn test_save_and_load_config() -> CroupierResult<()> {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let mut original = CroupierConfig::default();
        original.table.starting_balance = 777;
        original.storage.backend = StorageBackend::Memory;

        ConfigLoader::new().save(&original, path)?;
        let loaded = ConfigLoader::new().load_from_file(path)?;

        assert_eq!(loaded, original);
        Ok(())
    }
}
