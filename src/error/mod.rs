//! Error handling for the ledger
//!
//! The ledger itself is trusting: with the default policy nothing here is raised
//! while submitting transactions. The validation and audit variants only show up
//! when a chain is built with the strict policy or when its history is audited.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error types for ledger operations
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// Transaction rejected by the strict policy
    InvalidTransaction(String),
    /// Audit walk found a broken link or a tampered block
    ChainIntegrity { sequence: u64, reason: String },
    /// Attempt to append to a block that was already committed
    BlockSealed(u64),
    /// Illegal block status transition
    InvalidStatus(String),
    /// System clock errors
    Time(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
    /// Serialization errors
    Serialization(String),
    /// Poisoned lock around a shared chain
    Lock(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::InvalidTransaction(msg) => write!(f, "Invalid transaction: {msg}"),
            LedgerError::ChainIntegrity { sequence, reason } => {
                write!(f, "Chain integrity error at block {sequence}: {reason}")
            }
            LedgerError::BlockSealed(sequence) => {
                write!(f, "Block {sequence} is committed and cannot accept transactions")
            }
            LedgerError::InvalidStatus(msg) => write!(f, "Invalid block status: {msg}"),
            LedgerError::Time(msg) => write!(f, "Time error: {msg}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Lock(msg) => write!(f, "Lock error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}
