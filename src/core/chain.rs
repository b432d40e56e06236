// This is the ledger itself: a history of committed blocks plus exactly one open block.
// Transactions always land in the open block. Once it holds BLOCK_CAPACITY transactions,
// the next submission seals it first: the block gets its hash, joins the history, and a
// fresh block linked to that hash takes its place.

use crate::core::block::{Block, BlockHeader, BlockStatus, NONE_SENTINEL};
use crate::core::sources::{
    Clock, HashFunction, NonceSource, RandomNonce, Sha256Hash, SystemClock, BLOCK_NONCE_BOUND,
};
use crate::core::transaction::TransactionPolicy;
use crate::error::{LedgerError, Result};
use log::{debug, info};
use std::iter;
use std::mem;
use std::sync::Arc;

/// Number of transactions a block holds before the next submission commits it
pub const BLOCK_CAPACITY: usize = 10;

#[derive(Debug)]
pub struct Chain {
    name: String,               // Display name, always uppercase
    id: String,                 // digest(identity nonce + name + creation time)
    blocks: Vec<Block>,         // Committed history, in commit order
    current_block: Block,       // The single open block
    prev_hash: Option<String>,  // Hash of the last committed block
    seq_id: u64,                // Sequence number of the open block
    policy: TransactionPolicy,
    hasher: Arc<dyn HashFunction>,
    clock: Arc<dyn Clock>,
    nonce_source: Box<dyn NonceSource>,
}

impl Chain {
    // When I want a chain with the real clock, SHA-256 and an entropy-seeded nonce source
    pub fn new(name: &str) -> Chain {
        Chain::builder(name).build()
    }

    pub fn builder(name: &str) -> ChainBuilder {
        ChainBuilder::new(name)
    }

    /// Submit a transaction, committing the open block first if it is full
    pub fn add_transaction(&mut self, sender: &str, receiver: &str, value: f64) -> Result<()> {
        self.policy.check(sender, receiver, value)?;

        if self.current_block.size() >= BLOCK_CAPACITY {
            self.commit_block()?;
        }
        self.current_block.add_transaction(sender, receiver, value)
    }

    // Sealing happens here and only here
    fn commit_block(&mut self) -> Result<()> {
        let timestamp = self.clock.now();
        let merkle_hash = self
            .current_block
            .aggregate_hash()
            .unwrap_or(NONE_SENTINEL)
            .to_string();
        let nonce = self.nonce_source.block_nonce(BLOCK_NONCE_BOUND);
        let prev_hash = self.prev_hash.as_deref().unwrap_or(NONE_SENTINEL);

        let block_hash = self.hasher.digest(&format!(
            "{prev_hash}{}{timestamp}{}{nonce}{merkle_hash}",
            self.id, self.seq_id
        ));

        self.current_block.set_block_hash(block_hash.clone())?;
        self.current_block.set_status(BlockStatus::Committed)?;

        self.seq_id += 1;
        let next_block = Block::with_sources(
            self.seq_id,
            Some(block_hash.clone()),
            Arc::clone(&self.hasher),
            Arc::clone(&self.clock),
        );
        let committed = mem::replace(&mut self.current_block, next_block);
        info!(
            "Block {} committed with hash {block_hash}",
            committed.get_sequence()
        );
        self.blocks.push(committed);
        self.prev_hash = Some(block_hash);
        Ok(())
    }

    /// Committed blocks plus the open one, so never less than 1
    pub fn block_count(&self) -> usize {
        self.blocks.len() + 1
    }

    /// Per-block transaction values, committed blocks first and the open block last
    pub fn values(&self) -> Vec<Vec<f64>> {
        self.all_blocks().map(Block::values).collect()
    }

    pub fn transaction_count(&self) -> usize {
        self.all_blocks().map(Block::size).sum()
    }

    pub fn headers(&self) -> Vec<BlockHeader> {
        self.all_blocks().map(Block::header).collect()
    }

    pub fn headers_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.headers())?)
    }

    pub fn render_chain(&self) -> String {
        self.all_blocks()
            .map(Block::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_block_headers(&self) -> String {
        self.headers()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn display_chain(&self) {
        println!("{}", self.render_chain());
    }

    pub fn display_block_headers(&self) {
        println!("{}", self.render_block_headers());
    }

    /// Walk the history and check every link and every stored hash.
    ///
    /// Fails on the first block whose sequence, status, previous hash, transaction
    /// hashes or aggregate hash do not line up with the blocks before it.
    pub fn verify_integrity(&self) -> Result<()> {
        let mut expected_prev: Option<&str> = None;

        for (index, block) in self.blocks.iter().enumerate() {
            let sequence = block.get_sequence();
            let integrity = |reason: String| LedgerError::ChainIntegrity { sequence, reason };

            if sequence != index as u64 {
                return Err(integrity(format!(
                    "expected sequence {index}, found {sequence}"
                )));
            }
            if block.get_status() != BlockStatus::Committed {
                return Err(integrity("block in history is not committed".to_string()));
            }
            let hash = block
                .get_hash()
                .ok_or_else(|| integrity("committed block has no hash".to_string()))?;
            if block.get_pre_block_hash() != expected_prev {
                return Err(integrity(format!(
                    "previous hash mismatch: expected {}, found {}",
                    expected_prev.unwrap_or(NONE_SENTINEL),
                    block.get_pre_block_hash().unwrap_or(NONE_SENTINEL)
                )));
            }
            Self::verify_contents(block).map_err(integrity)?;

            expected_prev = Some(hash);
        }

        let open = &self.current_block;
        let sequence = open.get_sequence();
        let integrity = |reason: String| LedgerError::ChainIntegrity { sequence, reason };
        if sequence != self.blocks.len() as u64 {
            return Err(integrity(format!(
                "open block has sequence {sequence}, expected {}",
                self.blocks.len()
            )));
        }
        if open.get_status() != BlockStatus::Uncommitted {
            return Err(integrity("open block is already committed".to_string()));
        }
        if open.get_pre_block_hash() != expected_prev {
            return Err(integrity(
                "open block is not linked to the last committed block".to_string(),
            ));
        }
        Self::verify_contents(open).map_err(integrity)?;

        debug!("Chain {} passed integrity audit", self.name);
        Ok(())
    }

    fn verify_contents(block: &Block) -> std::result::Result<(), String> {
        let hasher = block.hasher();
        if let Some(position) = block
            .get_transactions()
            .iter()
            .position(|tx| !tx.verify_hash(hasher))
        {
            return Err(format!("transaction {position} does not match its hash"));
        }

        let stored = block.aggregate_hash();
        let recomputed = (block.size() > 0).then(|| block.recompute_aggregate_hash());
        if stored != recomputed.as_deref() {
            return Err("aggregate hash does not match transactions".to_string());
        }
        Ok(())
    }

    fn all_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().chain(iter::once(&self.current_block))
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn blocks(&self) -> &[Block] {
        self.blocks.as_slice()
    }

    pub fn current_block(&self) -> &Block {
        &self.current_block
    }

    pub fn last_hash(&self) -> Option<&str> {
        self.prev_hash.as_deref()
    }

    pub fn policy(&self) -> TransactionPolicy {
        self.policy
    }
}

/// Wires a chain to its hash function, clock, nonce source and validation policy
pub struct ChainBuilder {
    name: String,
    hasher: Arc<dyn HashFunction>,
    clock: Arc<dyn Clock>,
    nonce_source: Box<dyn NonceSource>,
    policy: TransactionPolicy,
}

impl ChainBuilder {
    fn new(name: &str) -> ChainBuilder {
        ChainBuilder {
            name: name.to_string(),
            hasher: Arc::new(Sha256Hash),
            clock: Arc::new(SystemClock::new()),
            nonce_source: Box::new(RandomNonce::new()),
            policy: TransactionPolicy::default(),
        }
    }

    pub fn hasher(mut self, hasher: impl HashFunction + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn nonce_source(mut self, nonce_source: impl NonceSource + 'static) -> Self {
        self.nonce_source = Box::new(nonce_source);
        self
    }

    pub fn policy(mut self, policy: TransactionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Chain {
        let ChainBuilder {
            name,
            hasher,
            clock,
            mut nonce_source,
            policy,
        } = self;

        let name = name.to_uppercase();
        let created_at = clock.now();
        let identity = nonce_source.identity_nonce();
        let id = hasher.digest(&format!("{identity}{name}{created_at}"));
        let current_block =
            Block::with_sources(0, None, Arc::clone(&hasher), Arc::clone(&clock));

        info!("{name} chain created with ID {id}, chain started.");

        Chain {
            name,
            id,
            blocks: Vec::new(),
            current_block,
            prev_hash: None,
            seq_id: 0,
            policy,
            hasher,
            clock,
            nonce_source,
        }
    }
}
