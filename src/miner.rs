//! Proof-of-work search and verification
//!
//! The puzzle: find the smallest integer `proof` such that the SHA-256 hex
//! digest of `"{seed}{proof}"` starts with [`DIFFICULTY`] zero characters,
//! where `seed` is the proof stored in the previous block.

use crate::crypto::sha256_hex;
use crate::error::ChainError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Number of leading `'0'` hex characters a valid guess hash must carry.
pub const DIFFICULTY: usize = 4;

/// How many candidates are tried between checks of the cancel flag.
const CANCEL_CHECK_INTERVAL: u64 = 1024;

pub struct ProofOfWork;

impl ProofOfWork {
    /// Scans candidates from 0 upward and returns the first one that
    /// satisfies [`ProofOfWork::verify`]. Unbounded.
    pub fn search(seed: u64) -> u64 {
        let mut proof = 0;
        while !Self::verify(seed, proof) {
            proof += 1;
        }
        proof
    }

    /// Same scan as [`ProofOfWork::search`], abandoned once `cancel` is set.
    pub fn search_until(seed: u64, cancel: &AtomicBool) -> Option<u64> {
        let mut proof = 0;
        loop {
            if proof % CANCEL_CHECK_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
                return None;
            }
            if Self::verify(seed, proof) {
                return Some(proof);
            }
            proof += 1;
        }
    }

    /// True when the hash of `seed` followed by `proof` starts with [`DIFFICULTY`] zeros.
    pub fn verify(seed: u64, proof: u64) -> bool {
        let guess_hash = sha256_hex(format!("{}{}", seed, proof));
        guess_hash.bytes().take(DIFFICULTY).all(|b| b == b'0')
    }
}

/// A proof-of-work search running on tokio's blocking pool.
///
/// Dropping the task raises its cancel flag, so a caller that goes away
/// mid-search leaves nothing running and nothing mutated.
pub struct MiningTask {
    seed: u64,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<Option<u64>>>,
}

impl MiningTask {
    /// Must be called from within a tokio runtime.
    pub fn spawn(seed: u64) -> Self {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = cancel.clone();
        let handle = tokio::task::spawn_blocking(move || ProofOfWork::search_until(seed, &flag));
        tracing::debug!(seed, "proof-of-work search started");

        Self {
            seed,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Waits for the search to finish.
    pub async fn proof(mut self) -> Result<u64, ChainError> {
        let joined = match self.handle.as_mut() {
            Some(handle) => handle.await,
            None => return Err(ChainError::MiningCancelled),
        };
        self.handle = None;

        match joined {
            Ok(Some(proof)) => {
                tracing::debug!(seed = self.seed, proof, "proof-of-work search finished");
                Ok(proof)
            }
            Ok(None) => Err(ChainError::MiningCancelled),
            Err(e) => {
                tracing::warn!(seed = self.seed, "proof-of-work worker failed: {}", e);
                Err(ChainError::MiningCancelled)
            }
        }
    }
}

impl Drop for MiningTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_verifies() {
        for seed in [0, 1, 100, 35_293, 987_654_321] {
            let proof = ProofOfWork::search(seed);
            assert!(ProofOfWork::verify(seed, proof), "seed {}", seed);
        }
    }

    #[test]
    fn test_search_returns_first_solution() {
        let seed = 100;
        let proof = ProofOfWork::search(seed);
        assert!((0..proof).all(|candidate| !ProofOfWork::verify(seed, candidate)));
    }

    #[test]
    fn test_search_from_genesis_proof() {
        assert_eq!(ProofOfWork::search(100), 35_293);
    }

    #[test]
    fn test_verify_rejects_wrong_candidate() {
        assert_ne!(ProofOfWork::search(100), 0);
        assert!(!ProofOfWork::verify(100, 0));
    }

    #[test]
    fn test_verify_checks_hash_prefix() {
        let proof = ProofOfWork::search(42);
        let guess = sha256_hex(format!("{}{}", 42, proof));
        assert!(guess.starts_with(&"0".repeat(DIFFICULTY)));
    }

    #[test]
    fn test_search_until_honours_cancel() {
        let cancel = AtomicBool::new(true);
        assert_eq!(ProofOfWork::search_until(100, &cancel), None);

        let cancel = AtomicBool::new(false);
        assert_eq!(
            ProofOfWork::search_until(100, &cancel),
            Some(ProofOfWork::search(100))
        );
    }

    #[tokio::test]
    async fn test_mining_task_finds_proof() {
        let task = MiningTask::spawn(100);
        assert_eq!(task.seed(), 100);
        let proof = task.proof().await.unwrap();
        assert_eq!(proof, ProofOfWork::search(100));
    }

    #[tokio::test]
    async fn test_cancelled_mining_task_reports_cancellation() {
        let task = MiningTask::spawn(100);
        task.cancel();
        // The worker may have found the proof before observing the flag.
        match task.proof().await {
            Ok(proof) => assert!(ProofOfWork::verify(100, proof)),
            Err(e) => assert_eq!(e, ChainError::MiningCancelled),
        }
    }
}
