//! Configuration loading for the jackpot engine
//!
//! Reads a TOML file (or defaults), applies `JACKPOT_*` environment
//! overrides and validates the result.

use crate::config::JackpotConfig;
use crate::errors::{ConfigurationError, JackpotResult};
use std::env;
use std::path::Path;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> JackpotResult<JackpotConfig> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            JackpotConfig::default()
        };

        self.apply_env_overrides(&mut config)?;

        config
            .validate()
            .map_err(|e| ConfigurationError::ValidationFailed(e.to_string()))?;

        Ok(config)
    }

    /// Load configuration from TOML file
    fn load_from_file(&self, path: &str) -> JackpotResult<JackpotConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into()
        })
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut JackpotConfig) -> JackpotResult<()> {
        if let Ok(data_dir) = env::var("JACKPOT_DATA_DIR") {
            config.storage.data_directory = data_dir;
        }
        if let Ok(in_memory) = env::var("JACKPOT_IN_MEMORY") {
            config.storage.in_memory =
                parse_env("JACKPOT_IN_MEMORY", in_memory, "Invalid boolean value")?;
        }
        if let Ok(balance) = env::var("JACKPOT_STARTING_BALANCE") {
            config.economy.starting_balance =
                parse_env("JACKPOT_STARTING_BALANCE", balance, "Invalid balance")?;
        }
        if let Ok(price) = env::var("JACKPOT_TICKET_PRICE") {
            config.economy.ticket_price =
                parse_env("JACKPOT_TICKET_PRICE", price, "Invalid ticket price")?;
        }
        if let Ok(max) = env::var("JACKPOT_MAX_NUMBER") {
            config.game.max_number = parse_env("JACKPOT_MAX_NUMBER", max, "Invalid number range")?;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, config: &JackpotConfig, path: &str) -> JackpotResult<()> {
        let toml_string = toml::to_string_pretty(config).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, toml_string).map_err(|e| {
            ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into()
        })
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T: std::str::FromStr>(field: &str, value: String, reason: &str) -> JackpotResult<T> {
    value.parse().map_err(|_| {
        ConfigurationError::InvalidValue {
            field: field.to_string(),
            value,
            reason: reason.to_string(),
        }
        .into()
    })
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> JackpotResult<()> {
    let config = JackpotConfig::default();
    ConfigLoader::new().save(&config, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::JackpotError;
    use tempfile::NamedTempFile;

    #[test]
    fn test_save_and_load_config() -> JackpotResult<()> {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let mut original_config = JackpotConfig::high_stakes();
        original_config.storage.data_directory = "/tmp/jackpot-test".to_string();

        ConfigLoader::new().save(&original_config, path)?;
        let loaded_config = ConfigLoader::new().with_path(path).load()?;

        assert_eq!(loaded_config.economy, original_config.economy);
        assert_eq!(loaded_config.game, original_config.game);

        Ok(())
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[economy]\nticket_price = 0\n").unwrap();

        let result = ConfigLoader::new().with_path(temp_file.path()).load();
        assert!(matches!(
            result,
            Err(JackpotError::Configuration(ConfigurationError::ValidationFailed(_)))
        ));
    }

    #[test]
    fn test_missing_file_fails_to_load() {
        let result = ConfigLoader::new().with_path("/nonexistent/jackpot.toml").load();
        assert!(matches!(
            result,
            Err(JackpotError::Configuration(ConfigurationError::LoadFailed(_)))
        ));
    }

    #[test]
    fn test_parse_env_reports_field() {
        let result: JackpotResult<i64> =
            parse_env("JACKPOT_TICKET_PRICE", "five".to_string(), "Invalid ticket price");
        let message = result.unwrap_err().to_string();
        assert!(message.contains("JACKPOT_TICKET_PRICE"));
        assert!(message.contains("five"));
    }
}
