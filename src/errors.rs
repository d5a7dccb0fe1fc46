//! Error types for the jackpot engine
//!
//! Round errors abort a round before anything is committed. Storage errors
//! are surfaced by the store layer; the engine logs them during gameplay
//! instead of failing the round.

use thiserror::Error;

/// Root error type for all jackpot operations
#[derive(Debug, Error)]
pub enum JackpotError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Round and lifecycle errors
    #[error("Round error: {0}")]
    Round(#[from] RoundError),

    /// Storage system errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Configuration and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Errors that reject a round or a lifecycle operation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoundError {
    #[error("Invalid ticket: {0}")]
    InvalidTicket(String),

    #[error("Insufficient funds: balance {balance}, ticket costs {cost}")]
    InsufficientFunds { balance: i64, cost: i64 },

    #[error("Draw exhausted: {collected} of {requested} numbers after {attempts} attempts")]
    GenerationExhausted {
        requested: usize,
        collected: usize,
        attempts: u32,
    },

    #[error("Session is bust; start a new session to keep playing")]
    SessionBusted,

    #[error("Full reset requires explicit confirmation")]
    ResetNotConfirmed,

    #[error("Invalid player id: '{0}'")]
    InvalidPlayerId(String),
}

/// Storage system errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database open failed: {0}")]
    DatabaseOpenFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Corrupted data: {0}")]
    CorruptedData(String),
}

impl From<std::io::Error> for JackpotError {
    fn from(e: std::io::Error) -> Self {
        JackpotError::Storage(StorageError::ReadFailed(e.to_string()))
    }
}

impl JackpotError {
    /// The round error behind this error, if any
    pub fn as_round_error(&self) -> Option<&RoundError> {
        match self {
            JackpotError::Round(e) => Some(e),
            _ => None,
        }
    }
}

// Convenience type alias for Results
pub type JackpotResult<T> = Result<T, JackpotError>;
