//! # Batch Ledger - an in-memory, hash-linked transaction ledger
//!
//! Transactions are collected into blocks. Once a block holds ten transactions,
//! the next submission seals it with a hash over the previous block's hash, the
//! chain identity, a timestamp, the block's sequence number, a bounded random
//! nonce and the aggregate hash of its transactions, then opens a fresh block.
//!
//! ## How the code is organized
//! - `core/`: transactions, blocks, the chain, the lock-guarded shared handle and
//!   the injectable hash/clock/nonce sources
//! - `config/`: settings for the binary (TOML file plus environment overrides)
//! - `utils/`: SHA-256 and timestamp helpers
//! - `cli/`: command-line interface
//!
//! Everything lives in process memory; dropping a `Chain` discards its history.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt, OutputFormat};
pub use config::Settings;
pub use core::{
    Block, BlockHeader, BlockStatus, Chain, ChainBuilder, Clock, FixedClock, FixedNonce,
    HashFunction, NonceSource, RandomNonce, Sha256Hash, SharedChain, SystemClock, Transaction,
    TransactionPolicy, TransactionView, BLOCK_CAPACITY,
};
pub use error::{LedgerError, Result};
pub use utils::{current_timestamp, sha256_digest, sha256_hex};
