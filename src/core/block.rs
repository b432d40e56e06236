use crate::core::sources::{Clock, HashFunction, Sha256Hash, SystemClock};
use crate::core::transaction::{Transaction, TransactionView};
use crate::error::{LedgerError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Text used wherever an absent hash has to be rendered or hashed
pub const NONE_SENTINEL: &str = "None";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockStatus {
    Uncommitted,
    Committed,
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockStatus::Uncommitted => write!(f, "UNCOMMITTED"),
            BlockStatus::Committed => write!(f, "COMMITTED"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    sequence: u64,
    pre_block_hash: Option<String>,
    transactions: Vec<Transaction>,
    merkle_hash: Option<String>, // Digest over every transaction hash, in append order
    status: BlockStatus,
    hash: Option<String>, // Only set once the chain commits the block
    hasher: Arc<dyn HashFunction>,
    clock: Arc<dyn Clock>,
}

impl Block {
    pub fn new(sequence: u64, pre_block_hash: Option<String>) -> Block {
        Block::with_sources(
            sequence,
            pre_block_hash,
            Arc::new(Sha256Hash),
            Arc::new(SystemClock::new()),
        )
    }

    pub fn with_sources(
        sequence: u64,
        pre_block_hash: Option<String>,
        hasher: Arc<dyn HashFunction>,
        clock: Arc<dyn Clock>,
    ) -> Block {
        Block {
            sequence,
            pre_block_hash,
            transactions: Vec::new(),
            merkle_hash: None,
            status: BlockStatus::Uncommitted,
            hash: None,
            hasher,
            clock,
        }
    }

    /// Append a transaction and refresh the aggregate hash.
    ///
    /// Capacity is the chain's concern; a block takes as many transactions as it
    /// is given until it is committed.
    pub fn add_transaction(&mut self, sender: &str, receiver: &str, value: f64) -> Result<()> {
        if self.status == BlockStatus::Committed {
            warn!("Rejected transaction for committed block {}", self.sequence);
            return Err(LedgerError::BlockSealed(self.sequence));
        }

        let transaction = Transaction::create(
            sender,
            receiver,
            value,
            self.clock.as_ref(),
            self.hasher.as_ref(),
        );
        debug!(
            "Block {} appending transaction {}",
            self.sequence,
            transaction.get_hash()
        );
        self.transactions.push(transaction);
        self.merkle_hash = Some(self.recompute_aggregate_hash());
        Ok(())
    }

    /// Digest of the concatenated transaction hashes, rebuilt from scratch
    pub fn recompute_aggregate_hash(&self) -> String {
        let joined: String = self
            .transactions
            .iter()
            .map(|tx| tx.get_hash())
            .collect();
        self.hasher.digest(&joined)
    }

    pub fn size(&self) -> usize {
        self.transactions.len()
    }

    pub fn aggregate_hash(&self) -> Option<&str> {
        self.merkle_hash.as_deref()
    }

    pub fn get_sequence(&self) -> u64 {
        self.sequence
    }

    pub fn get_pre_block_hash(&self) -> Option<&str> {
        self.pre_block_hash.as_deref()
    }

    pub fn get_hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn get_status(&self) -> BlockStatus {
        self.status
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn values(&self) -> Vec<f64> {
        self.transactions.iter().map(|tx| tx.get_value()).collect()
    }

    pub(crate) fn hasher(&self) -> &dyn HashFunction {
        self.hasher.as_ref()
    }

    // Only the chain seals blocks, so these two stay crate-private.
    pub(crate) fn set_status(&mut self, status: BlockStatus) -> Result<()> {
        match (self.status, status) {
            (BlockStatus::Committed, BlockStatus::Uncommitted) => Err(LedgerError::InvalidStatus(
                format!("block {} cannot return to UNCOMMITTED", self.sequence),
            )),
            (BlockStatus::Committed, BlockStatus::Committed) => Err(LedgerError::InvalidStatus(
                format!("block {} is already COMMITTED", self.sequence),
            )),
            _ => {
                self.status = status;
                Ok(())
            }
        }
    }

    pub(crate) fn set_block_hash(&mut self, hash: String) -> Result<()> {
        if self.hash.is_some() {
            return Err(LedgerError::InvalidStatus(format!(
                "block {} already has a hash",
                self.sequence
            )));
        }
        self.hash = Some(hash);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn overwrite_aggregate_hash(&mut self, hash: &str) {
        self.merkle_hash = Some(hash.to_string());
    }

    #[cfg(test)]
    pub(crate) fn overwrite_transaction(&mut self, index: usize, transaction: Transaction) {
        self.transactions[index] = transaction;
    }

    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            sequence: self.sequence,
            status: self.status,
            hash: self.hash.clone(),
            pre_block_hash: self.pre_block_hash.clone(),
            merkle_hash: self.merkle_hash.clone(),
            transaction_count: self.size(),
        }
    }

    pub fn transactions_view(&self) -> Vec<TransactionView> {
        self.transactions.iter().map(Transaction::view).collect()
    }

    /// Fixed-width table of the transaction view, header row first
    pub fn render_transactions(&self) -> String {
        let rows: Vec<[String; 4]> = self
            .transactions_view()
            .into_iter()
            .map(|row| {
                [
                    row.timestamp.to_string(),
                    row.sender,
                    row.receiver,
                    row.value.to_string(),
                ]
            })
            .collect();

        let titles = ["Timestamp", "Sender", "Receiver", "Value"];
        // Padding counts chars, so widths must too
        let mut widths = titles.map(|title| title.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = format!(
            "{:>w0$} {:>w1$} {:>w2$} {:>w3$}",
            titles[0],
            titles[1],
            titles[2],
            titles[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        );
        for row in &rows {
            out.push('\n');
            out.push_str(&format!(
                "{:>w0$} {:>w1$} {:>w2$} {:>w3$}",
                row[0],
                row[1],
                row[2],
                row[3],
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
                w3 = widths[3],
            ));
        }
        out
    }

    /// Header line followed by the transaction table
    pub fn render(&self) -> String {
        format!("{}\n{}", self.header(), self.render_transactions())
    }
}

/// Summary of a block for display and audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub sequence: u64,
    pub status: BlockStatus,
    pub hash: Option<String>,
    pub pre_block_hash: Option<String>,
    pub merkle_hash: Option<String>,
    pub transaction_count: usize,
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_none = |value: &Option<String>| {
            value
                .clone()
                .unwrap_or_else(|| NONE_SENTINEL.to_string())
        };
        write!(
            f,
            "{}, {}, {}, {}, {}, {}",
            self.sequence,
            self.status,
            or_none(&self.hash),
            or_none(&self.pre_block_hash),
            or_none(&self.merkle_hash),
            self.transaction_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sources::FixedClock;
    use crate::utils::sha256_hex;

    fn fixed_block(sequence: u64, pre: Option<&str>, at: i64) -> Block {
        Block::with_sources(
            sequence,
            pre.map(str::to_string),
            Arc::new(Sha256Hash),
            Arc::new(FixedClock(at)),
        )
    }

    #[test]
    fn test_new_block_is_empty() {
        let block = Block::new(1, Some("test".to_string()));
        assert_eq!(block.size(), 0);
        assert_eq!(block.get_status(), BlockStatus::Uncommitted);
        assert!(block.get_hash().is_none());
        assert!(block.aggregate_hash().is_none());
        assert_eq!(block.get_pre_block_hash(), Some("test"));
    }

    #[test]
    fn test_add_transaction_grows_block() {
        let mut block = Block::new(1, Some("test".to_string()));
        block.add_transaction("Bob", "Alice", 50.0).unwrap();
        assert_eq!(block.size(), 1);
        assert!(block.aggregate_hash().is_some());
    }

    #[test]
    fn test_aggregate_hash_over_ordered_tx_hashes() {
        let mut block = fixed_block(0, None, 1000);
        block.add_transaction("Bob", "Alice", 50.0).unwrap();
        block.add_transaction("Alice", "Carol", 51.0).unwrap();

        let first = sha256_hex("1000BobAlice50");
        let second = sha256_hex("1000AliceCarol51");
        let expected = sha256_hex(&format!("{first}{second}"));
        assert_eq!(block.aggregate_hash(), Some(expected.as_str()));
        assert_eq!(block.recompute_aggregate_hash(), expected);
    }

    #[test]
    fn test_aggregate_hash_reproducible_with_fixed_clock() {
        let mut a = fixed_block(0, None, 5);
        let mut b = fixed_block(7, Some("other"), 5);
        for value in [50.0, 51.0, 52.0] {
            a.add_transaction("Bob", "Alice", value).unwrap();
            b.add_transaction("Bob", "Alice", value).unwrap();
        }
        assert_eq!(a.aggregate_hash(), b.aggregate_hash());
    }

    #[test]
    fn test_aggregate_hash_depends_on_order() {
        let mut a = fixed_block(0, None, 5);
        let mut b = fixed_block(0, None, 5);
        a.add_transaction("Bob", "Alice", 1.0).unwrap();
        a.add_transaction("Bob", "Alice", 2.0).unwrap();
        b.add_transaction("Bob", "Alice", 2.0).unwrap();
        b.add_transaction("Bob", "Alice", 1.0).unwrap();
        assert_ne!(a.aggregate_hash(), b.aggregate_hash());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut block = fixed_block(0, None, 5);
        block.add_transaction("Bob", "Alice", 53.0).unwrap();
        block.add_transaction("Bob", "Alice", 53.0).unwrap();
        assert_eq!(block.size(), 2);
        assert_eq!(block.values(), vec![53.0, 53.0]);
    }

    #[test]
    fn test_status_transitions_once() {
        let mut block = fixed_block(0, None, 5);
        block.set_status(BlockStatus::Committed).unwrap();
        assert!(block.set_status(BlockStatus::Uncommitted).is_err());
        assert!(block.set_status(BlockStatus::Committed).is_err());
        assert_eq!(block.get_status(), BlockStatus::Committed);
    }

    #[test]
    fn test_block_hash_is_set_once() {
        let mut block = fixed_block(0, None, 5);
        block.set_block_hash("abc".to_string()).unwrap();
        assert!(block.set_block_hash("def".to_string()).is_err());
        assert_eq!(block.get_hash(), Some("abc"));
    }

    #[test]
    fn test_committed_block_rejects_appends() {
        let mut block = fixed_block(3, None, 5);
        block.add_transaction("Bob", "Alice", 50.0).unwrap();
        let sealed_merkle = block.aggregate_hash().map(str::to_string);
        block.set_block_hash("sealed".to_string()).unwrap();
        block.set_status(BlockStatus::Committed).unwrap();

        let result = block.add_transaction("Bob", "Alice", 60.0);
        assert_eq!(result, Err(LedgerError::BlockSealed(3)));
        assert_eq!(block.size(), 1);
        assert_eq!(block.aggregate_hash().map(str::to_string), sealed_merkle);
    }

    #[test]
    fn test_header_display_uses_none_sentinel() {
        let block = fixed_block(0, None, 5);
        assert_eq!(block.header().to_string(), "0, UNCOMMITTED, None, None, None, 0");
    }

    #[test]
    fn test_header_fields() {
        let mut block = fixed_block(2, Some("prev"), 5);
        block.add_transaction("Bob", "Alice", 50.0).unwrap();
        let header = block.header();
        assert_eq!(header.sequence, 2);
        assert_eq!(header.pre_block_hash.as_deref(), Some("prev"));
        assert_eq!(header.transaction_count, 1);
        assert_eq!(header.merkle_hash.as_deref(), block.aggregate_hash());

        let json = serde_json::to_value(&header).unwrap();
        assert_eq!(json["status"], "UNCOMMITTED");
    }

    #[test]
    fn test_render_transactions_pads_multibyte_names() {
        let mut block = fixed_block(0, None, 1234);
        block.add_transaction("Zoë Åkesson-Müller", "Alice", 50.0).unwrap();
        block.add_transaction("Bobby", "Alice", 51.0).unwrap();
        let table = block.render_transactions();
        let widths: Vec<usize> = table.lines().map(|line| line.chars().count()).collect();
        assert_eq!(widths.len(), 3);
        assert!(widths.iter().all(|w| *w == widths[0]), "uneven rows: {widths:?}");
        // titles set every width except the 18-char sender
        assert_eq!(widths[0], 9 + 1 + 18 + 1 + 8 + 1 + 5);
    }

    #[test]
    fn test_render_transactions_excludes_hash() {
        let mut block = fixed_block(0, None, 1234);
        block.add_transaction("Bob", "Alice", 50.0).unwrap();
        let table = block.render_transactions();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Timestamp"));
        assert!(lines[1].contains("1234"));
        assert!(lines[1].contains("Bob"));
        assert!(lines[1].ends_with("50"));
        assert!(!table.contains(block.get_transactions()[0].get_hash()));
    }
}
