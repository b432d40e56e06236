// A transaction is one value transfer from a sender to a receiver, stamped with the
// time it was captured and a content hash over everything else it carries.
// Nothing here can be changed after construction: there are no setters and the
// fields are private, so the hash always matches the data.

use crate::core::sources::{Clock, HashFunction};
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    timestamp: i64,   // Capture time in milliseconds
    sender: String,   // Who sends the value
    receiver: String, // Who receives it
    value: f64,       // Unit-less amount
    hash: String,     // digest(timestamp + sender + receiver + value)
}

impl Transaction {
    // When I want a transaction stamped by the block's clock and hashed with its digest
    pub fn create(
        sender: &str,
        receiver: &str,
        value: f64,
        clock: &dyn Clock,
        hasher: &dyn HashFunction,
    ) -> Transaction {
        Transaction::at(clock.now(), sender, receiver, value, hasher)
    }

    // Builds a transaction for a known capture time, so the hash is fully reproducible
    pub fn at(
        timestamp: i64,
        sender: &str,
        receiver: &str,
        value: f64,
        hasher: &dyn HashFunction,
    ) -> Transaction {
        let hash = hasher.digest(&Self::content(timestamp, sender, receiver, value));
        Transaction {
            timestamp,
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            value,
            hash,
        }
    }

    // The exact text that gets hashed: timestamp, sender, receiver, value, in that order
    fn content(timestamp: i64, sender: &str, receiver: &str, value: f64) -> String {
        format!("{timestamp}{sender}{receiver}{value}")
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_sender(&self) -> &str {
        self.sender.as_str()
    }

    pub fn get_receiver(&self) -> &str {
        self.receiver.as_str()
    }

    pub fn get_value(&self) -> f64 {
        self.value
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }

    // Lets audit tests plant a transaction whose stored hash is wrong
    #[cfg(test)]
    pub(crate) fn with_forged_hash(mut self, hash: &str) -> Transaction {
        self.hash = hash.to_string();
        self
    }

    /// Recompute the content hash and compare it with the stored one
    pub fn verify_hash(&self, hasher: &dyn HashFunction) -> bool {
        let content = Self::content(self.timestamp, &self.sender, &self.receiver, self.value);
        hasher.digest(&content) == self.hash
    }

    /// Display row without the content hash
    pub fn view(&self) -> TransactionView {
        TransactionView {
            timestamp: self.timestamp,
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
            value: self.value,
        }
    }
}

/// What gets shown for a transaction when a block is displayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    pub timestamp: i64,
    pub sender: String,
    pub receiver: String,
    pub value: f64,
}

/// How much checking a chain does before accepting a transaction.
///
/// `Lenient` accepts anything, which is how the ledger has always behaved.
/// `Strict` is an opt-in hardening that rejects empty identifiers and
/// values that are not finite and positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionPolicy {
    #[default]
    Lenient,
    Strict,
}

impl TransactionPolicy {
    pub fn check(&self, sender: &str, receiver: &str, value: f64) -> Result<()> {
        if *self == TransactionPolicy::Lenient {
            return Ok(());
        }

        if sender.trim().is_empty() {
            return Err(LedgerError::InvalidTransaction(
                "Sender must not be empty".to_string(),
            ));
        }
        if receiver.trim().is_empty() {
            return Err(LedgerError::InvalidTransaction(
                "Receiver must not be empty".to_string(),
            ));
        }
        if !value.is_finite() {
            return Err(LedgerError::InvalidTransaction(format!(
                "Value must be finite, got {value}"
            )));
        }
        if value <= 0.0 {
            return Err(LedgerError::InvalidTransaction(format!(
                "Value must be positive, got {value}"
            )));
        }

        Ok(())
    }
}
