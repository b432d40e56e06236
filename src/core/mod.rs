//! Core ledger functionality
//!
//! This module contains the fundamental ledger components: transactions, blocks,
//! the chain that seals and links them, and the injectable sources of time,
//! hashing and randomness they depend on.

pub mod block;
pub mod chain;
pub mod shared;
pub mod sources;
pub mod transaction;

pub use block::{Block, BlockHeader, BlockStatus, NONE_SENTINEL};
pub use chain::{Chain, ChainBuilder, BLOCK_CAPACITY};
pub use shared::SharedChain;
pub use sources::{
    Clock, FixedClock, FixedNonce, HashFunction, NonceSource, RandomNonce, Sha256Hash,
    SystemClock, BLOCK_NONCE_BOUND,
};
pub use transaction::{Transaction, TransactionPolicy, TransactionView};
