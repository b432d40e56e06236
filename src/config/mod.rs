//! Configuration management
//!
//! This module handles the settings of the ledger binary: the default chain name,
//! log level, validation policy and an optional nonce seed.
//!
//! Defaults come first, then an optional TOML file, then environment overrides.

pub mod settings;

pub use settings::Settings;
