//! Pending transaction pool
//!
//! Transactions wait here, in submission order, until the next block takes
//! ownership of all of them at once.

use crate::transaction::Transaction;

#[derive(Debug, Clone, Default)]
pub struct Mempool {
    transactions: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// Moves every pending transaction out, leaving a fresh empty pool behind.
    pub fn take_all(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }

    pub fn get_all_transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
