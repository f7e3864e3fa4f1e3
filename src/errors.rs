//! Error types for the croupier table
//!
//! A root error wraps one enum per concern so callers can match broadly or
//! narrowly.

use thiserror::Error;
use uuid::Uuid;

/// Root error type for all croupier operations
#[derive(Debug, Error)]
pub enum CroupierError {
    /// Configuration and catalog construction errors
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Wager placement and resolution errors
    #[error("Wager error: {0}")]
    Wager(#[from] WagerError),

    /// Persisted state errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Configuration, catalog and boundary-input errors.
///
/// Any of these raised while building a table means the table must not take
/// wagers.
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

    #[error("Catalog has no category for {0}")]
    MissingCategory(String),

    #[error("Category {category} covers {actual} outcomes, expected {expected}")]
    CoverageMismatch {
        category: String,
        expected: usize,
        actual: usize,
    },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Errors raised while placing, spinning or resolving wagers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WagerError {
    #[error("Invalid outcome {0}: expected 00 (-1) or 0-36")]
    InvalidOutcome(i32),

    #[error("Invalid input '{0}': expected 00 or 0-36")]
    InvalidInput(String),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },

    #[error("Stake must be positive")]
    InvalidStake,

    #[error("Unknown bet: {0}")]
    UnknownBet(String),

    #[error("Wager {0} was already resolved")]
    DoubleResolution(Uuid),

    #[error("Wager {0} has not been resolved")]
    UnresolvedWager(Uuid),

    #[error("A spin is already in progress")]
    SpinInProgress,

    #[error("No spin in progress")]
    NoSpinInProgress,

    #[error("No active wagers to resolve")]
    NoActiveWagers,

    #[error("Arithmetic overflow while computing {0}")]
    Overflow(&'static str),
}

/// Persisted state errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Corrupted data: {0}")]
    CorruptedData(String),

    #[error("Unsupported state version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::ReadFailed(e.to_string()),
            _ => StorageError::WriteFailed(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::CorruptedData(e.to_string())
    }
}

// Convenience type alias for Results
pub type CroupierResult<T> = Result<T, CroupierError>;
