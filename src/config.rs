//! Configuration management with validation and defaults
//!
//! Game rules, economy constants, storage and logging settings in one
//! serde-backed tree that round-trips through TOML.

use serde::{Deserialize, Serialize};

/// Numbers on every ticket and in every draw
pub const NUMBERS_PER_DRAW: usize = 6;

/// Lowest number a ticket or draw may contain
pub const MIN_NUMBER: u8 = 1;

/// Complete engine configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct JackpotConfig {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// Number range and draw behaviour
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    /// Highest number a ticket or draw may contain
    pub max_number: u8,
    /// Sampling attempts before a draw gives up
    pub max_draw_attempts: u32,
    /// Rounds kept in the persisted history (0 disables history)
    pub history_limit: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_number: 35,
            max_draw_attempts: 1000,
            history_limit: 50,
        }
    }
}

/// Fixed payouts for partial matches
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PrizeTableConfig {
    pub match_2: i64,
    pub match_3: i64,
    pub match_4: i64,
    pub match_5: i64,
}

impl Default for PrizeTableConfig {
    fn default() -> Self {
        Self {
            match_2: 5,
            match_3: 25,
            match_4: 100,
            match_5: 1000,
        }
    }
}

/// Balance, ticket pricing and jackpot growth
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EconomyConfig {
    pub starting_balance: i64,
    pub starting_jackpot: i64,
    pub ticket_price: i64,
    pub power_play_surcharge: i64,
    /// Share of every ticket's cost added to the jackpot on non-jackpot rounds
    pub jackpot_growth_rate: f64,
    pub prize_table: PrizeTableConfig,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_balance: 100,
            starting_jackpot: 10_000,
            ticket_price: 5,
            power_play_surcharge: 5,
            jackpot_growth_rate: 0.3,
            prize_table: PrizeTableConfig::default(),
        }
    }
}

/// Durable storage settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub data_directory: String,
    /// Prefix of every key written for a player
    pub key_prefix: String,
    pub write_buffer_size_mb: usize,
    pub compression_type: CompressionType,
    /// Keep state in process memory only (testing)
    pub in_memory: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CompressionType {
    None,
    Snappy,
    Lz4,
    Zstd,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_directory: "./DB/jackpot_data".to_string(),
            key_prefix: "economy".to_string(),
            write_buffer_size_mb: 8,
            compression_type: CompressionType::Lz4,
            in_memory: false,
        }
    }
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitoringConfig {
    pub log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
        }
    }
}

impl EconomyConfig {
    /// Cost of one ticket, including the power-play surcharge when requested
    pub fn ticket_cost(&self, power_play: bool) -> i64 {
        if power_play {
            self.ticket_price + self.power_play_surcharge
        } else {
            self.ticket_price
        }
    }

    /// Jackpot increase funded by a ticket of the given cost
    pub fn jackpot_growth(&self, cost: i64) -> i64 {
        (cost as f64 * self.jackpot_growth_rate).floor() as i64
    }
}

/// Configuration validation and factory methods
impl JackpotConfig {
    /// In-memory configuration for tests and throwaway runs
    pub fn testing() -> Self {
        Self {
            storage: StorageConfig {
                in_memory: true,
                ..Default::default()
            },
            monitoring: MonitoringConfig {
                log_level: LogLevel::Debug,
            },
            ..Default::default()
        }
    }

    /// Bigger bankroll, pricier tickets and a faster growing jackpot
    pub fn high_stakes() -> Self {
        Self {
            economy: EconomyConfig {
                starting_balance: 10_000,
                starting_jackpot: 1_000_000,
                ticket_price: 50,
                power_play_surcharge: 50,
                jackpot_growth_rate: 0.5,
                prize_table: PrizeTableConfig {
                    match_2: 50,
                    match_3: 250,
                    match_4: 1_000,
                    match_5: 10_000,
                },
            },
            ..Default::default()
        }
    }

    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let game = &self.game;
        // One extra number is needed for the bonus ball
        if (game.max_number as usize) < NUMBERS_PER_DRAW + 1 {
            return Err(ConfigValidationError::InvalidValue(format!(
                "max_number must be >= {}",
                NUMBERS_PER_DRAW + 1
            )));
        }

        if game.max_draw_attempts == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "max_draw_attempts must be > 0".to_string(),
            ));
        }

        let economy = &self.economy;
        if economy.starting_balance <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "starting_balance must be > 0".to_string(),
            ));
        }

        if economy.ticket_price <= 0 {
            return Err(ConfigValidationError::InvalidValue(
                "ticket_price must be > 0".to_string(),
            ));
        }

        if economy.power_play_surcharge < 0 {
            return Err(ConfigValidationError::InvalidValue(
                "power_play_surcharge must be >= 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&economy.jackpot_growth_rate) {
            return Err(ConfigValidationError::InvalidValue(
                "jackpot_growth_rate must be within [0, 1]".to_string(),
            ));
        }

        let table = &economy.prize_table;
        if table.match_2 < 0
            || table.match_2 > table.match_3
            || table.match_3 > table.match_4
            || table.match_4 > table.match_5
        {
            return Err(ConfigValidationError::LogicalInconsistency(
                "prize table must be non-negative and non-decreasing in matches".to_string(),
            ));
        }

        if economy.starting_jackpot <= table.match_5 {
            return Err(ConfigValidationError::LogicalInconsistency(
                "starting_jackpot must exceed the five-match prize".to_string(),
            ));
        }

        if !self.storage.in_memory && self.storage.data_directory.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "storage.data_directory".to_string(),
            ));
        }

        if self.storage.key_prefix.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "storage.key_prefix".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    InvalidValue(String),
    LogicalInconsistency(String),
    MissingRequired(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValidationError::InvalidValue(msg) => {
                write!(f, "Invalid configuration value: {}", msg)
            }
            ConfigValidationError::LogicalInconsistency(msg) => {
                write!(f, "Configuration logical inconsistency: {}", msg)
            }
            ConfigValidationError::MissingRequired(msg) => {
                write!(f, "Missing required configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = JackpotConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(JackpotConfig::testing().validate().is_ok());
        assert!(JackpotConfig::high_stakes().validate().is_ok());
        assert!(JackpotConfig::testing().storage.in_memory);
    }

    #[test]
    fn test_invalid_config_validation() {
        let mut config = JackpotConfig::default();
        config.economy.ticket_price = 0;
        assert!(config.validate().is_err());

        let mut config = JackpotConfig::default();
        config.game.max_number = 6;
        assert!(config.validate().is_err());

        let mut config = JackpotConfig::default();
        config.economy.jackpot_growth_rate = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_prize_table_consistency_validation() {
        let mut config = JackpotConfig::default();
        config.economy.prize_table.match_4 = 2_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::LogicalInconsistency(_))
        ));

        let mut config = JackpotConfig::default();
        config.economy.starting_jackpot = 1_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ticket_cost_and_growth() {
        let economy = EconomyConfig::default();
        assert_eq!(economy.ticket_cost(false), 5);
        assert_eq!(economy.ticket_cost(true), 10);
        assert_eq!(economy.jackpot_growth(5), 1);
        assert_eq!(economy.jackpot_growth(10), 3);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: JackpotConfig = toml::from_str(
            r#"
            [economy]
            ticket_price = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.economy.ticket_price, 2);
        assert_eq!(config.economy.starting_balance, 100);
        assert_eq!(config.game.max_number, 35);
    }

    #[test]
    fn test_log_level_from_toml() {
        let config: JackpotConfig = toml::from_str(
            r#"
            [monitoring]
            log_level = "Warn"
            "#,
        )
        .unwrap();
        assert_eq!(config.monitoring.log_level, LogLevel::Warn);
        assert_eq!(config.monitoring.log_level.as_filter(), "warn");

        let saved = toml::to_string_pretty(&config).unwrap();
        let reloaded: JackpotConfig = toml::from_str(&saved).unwrap();
        assert_eq!(reloaded.monitoring, config.monitoring);
        assert_eq!(JackpotConfig::default().monitoring.log_level.as_filter(), "info");
    }

    #[test]
    fn test_unknown_game_keys_are_ignored() {
        let config: JackpotConfig = toml::from_str(
            r#"
            [game]
            max_number = 40
            numbers_per_ticket = 6
            "#,
        )
        .unwrap();
        assert_eq!(config.game.max_number, 40);
        assert!(config.validate().is_ok());
    }
}
