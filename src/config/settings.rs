use crate::core::TransactionPolicy;
use crate::error::{LedgerError, Result};
use log::LevelFilter;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

static DEFAULT_CHAIN_NAME: &str = "ledger";
static DEFAULT_LOG_LEVEL: &str = "info";

const CHAIN_NAME_KEY: &str = "LEDGER_CHAIN_NAME";
const LOG_LEVEL_KEY: &str = "LEDGER_LOG_LEVEL";
const STRICT_KEY: &str = "LEDGER_STRICT";
const NONCE_SEED_KEY: &str = "LEDGER_NONCE_SEED";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chain_name: String,
    pub log_level: String,
    pub policy: TransactionPolicy,
    pub nonce_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            chain_name: DEFAULT_CHAIN_NAME.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            policy: TransactionPolicy::Lenient,
            nonce_seed: None,
        }
    }
}

impl Settings {
    /// Defaults, then the optional TOML file, then the environment
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Settings::default(),
        };
        settings.with_overrides(|key| env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Settings> {
        let contents = fs::read_to_string(path).map_err(|e| {
            LedgerError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Settings> {
        Ok(toml::from_str(contents)?)
    }

    // The lookup is a parameter so tests don't have to touch the real environment
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Settings> {
        if let Some(name) = lookup(CHAIN_NAME_KEY) {
            self.chain_name = name;
        }
        if let Some(level) = lookup(LOG_LEVEL_KEY) {
            self.log_level = level;
        }
        if let Some(strict) = lookup(STRICT_KEY) {
            self.policy = match strict.to_lowercase().as_str() {
                "1" | "true" | "yes" => TransactionPolicy::Strict,
                "0" | "false" | "no" => TransactionPolicy::Lenient,
                other => {
                    return Err(LedgerError::Config(format!(
                        "Invalid {STRICT_KEY} value: {other}"
                    )))
                }
            };
        }
        if let Some(seed) = lookup(NONCE_SEED_KEY) {
            let seed = seed.parse::<u64>().map_err(|e| {
                LedgerError::Config(format!("Invalid {NONCE_SEED_KEY} value {seed}: {e}"))
            })?;
            self.nonce_seed = Some(seed);
        }
        Ok(self)
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| LedgerError::Config(format!("Invalid log level: {}", self.log_level)))
    }
}
