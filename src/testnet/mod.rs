//! Test harness for ledger testing
//!
//! Deterministic clocks and nonce sources plus helpers that build and fill
//! chains, so tests can pin every input that ends up in a hash.

pub mod test_utils;

pub use test_utils::*;
