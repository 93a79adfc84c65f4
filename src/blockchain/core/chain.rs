use crate::crypto::canonical_hash;
use crate::error::ChainError;
use crate::mempool::Mempool;
use crate::miner::ProofOfWork;
use crate::transaction::{Amount, Transaction};
use serde_json::{json, Value};

use super::validation::validate_chain;

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str =
    "The Times 03/Jan/2009 Chancellor on brink of second bailout for banks.";

/// Proof stored in the genesis block; it seeds the first search.
pub const GENESIS_PROOF: u64 = 100;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub index: u64,
    /// Seconds since the Unix epoch, with sub-second precision.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Self {
        let timestamp = chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0;

        Block {
            index,
            timestamp,
            transactions,
            proof,
            previous_hash,
        }
    }

    /// JSON object form of the block; keys are emitted sorted when rendered.
    pub fn canonical_value(&self) -> Value {
        let transactions: Vec<Value> = self
            .transactions
            .iter()
            .map(Transaction::canonical_value)
            .collect();

        json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "transactions": transactions,
            "proof": self.proof,
            "previous_hash": self.previous_hash,
        })
    }

    /// Lowercase hex SHA-256 of the canonical JSON form.
    pub fn hash(&self) -> String {
        canonical_hash(&self.canonical_value())
    }
}

/// The ledger: an append-only chain plus the pool feeding its next block.
#[derive(Debug, Clone)]
pub struct Blockchain {
    chain: Vec<Block>,
    mempool: Mempool,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Create a ledger holding only the genesis block.
    pub fn new() -> Self {
        let mut blockchain = Blockchain {
            chain: Vec::new(),
            mempool: Mempool::new(),
        };
        blockchain.new_block(GENESIS_PROOF, Some(GENESIS_PREVIOUS_HASH.to_string()));
        blockchain
    }

    /// Queue a transaction for the next block and return that block's index.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> u64 {
        self.submit(Transaction::new(sender, recipient, amount))
    }

    /// Queue an already-built transaction; returns the index of the block it will land in.
    pub fn submit(&mut self, tx: Transaction) -> u64 {
        tracing::debug!(
            sender = %tx.sender,
            recipient = %tx.recipient,
            amount = %tx.amount,
            "transaction queued"
        );
        self.mempool.add_transaction(tx);
        self.last_block().index + 1
    }

    /// Append a block holding every pending transaction.
    ///
    /// The proof is taken as given. Without an explicit `previous_hash` the
    /// hash of the current last block is used.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> &Block {
        let previous_hash = match previous_hash {
            Some(hash) => hash,
            None => self.last_block().hash(),
        };
        let index = self.chain.len() as u64 + 1;
        let block = Block::new(index, self.mempool.take_all(), proof, previous_hash);

        tracing::info!(
            index = block.index,
            proof = block.proof,
            transactions = block.transactions.len(),
            "block appended"
        );

        self.push(block)
    }

    fn push(&mut self, block: Block) -> &Block {
        self.chain.push(block);
        &self.chain[self.chain.len() - 1]
    }

    /// The final block. The chain always holds at least the genesis block.
    pub fn last_block(&self) -> &Block {
        &self.chain[self.chain.len() - 1]
    }

    /// Search for the next proof and forge a block rewarding `miner`.
    pub fn mine(&mut self, miner: &str) -> &Block {
        let seed = self.last_block().proof;
        let proof = ProofOfWork::search(seed);
        self.forge_block(proof, miner)
    }

    /// Reward `miner` and seal the pool into a block carrying `proof`.
    ///
    /// `previous_hash` covers the last block as it stands; the reward only
    /// lands in the new block.
    pub fn forge_block(&mut self, proof: u64, miner: &str) -> &Block {
        self.submit(Transaction::reward(miner));
        let previous_hash = self.last_block().hash();
        self.new_block(proof, Some(previous_hash))
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Block by its 1-based index.
    pub fn block(&self, index: u64) -> Option<&Block> {
        let position = usize::try_from(index).ok()?.checked_sub(1)?;
        self.chain.get(position)
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        self.mempool.get_all_transactions()
    }

    /// Check linkage, indices and proofs along the whole chain.
    pub fn validate(&self) -> Result<(), ChainError> {
        validate_chain(&self.chain)
    }
}
