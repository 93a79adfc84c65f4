use crate::error::ChainError;
use crate::miner::ProofOfWork;

use super::chain::Block;

/// Walk `chain` from genesis and report the first block that breaks an
/// invariant: gapless 1-based indices, hash linkage, and a proof that solves
/// the puzzle seeded by the previous block's proof.
pub fn validate_chain(chain: &[Block]) -> Result<(), ChainError> {
    let genesis = chain.first().ok_or(ChainError::EmptyChain)?;
    if genesis.index != 1 {
        return Err(ChainError::InvalidBlock(format!(
            "Genesis block must have index 1, but got {}.",
            genesis.index
        )));
    }

    for pair in chain.windows(2) {
        let (previous, block) = (&pair[0], &pair[1]);

        if block.index != previous.index + 1 {
            return Err(ChainError::InvalidBlock(format!(
                "Invalid block index. Expected {}, but got {}.",
                previous.index + 1,
                block.index
            )));
        }

        let expected = previous.hash();
        if block.previous_hash != expected {
            tracing::warn!(index = block.index, "previous hash mismatch");
            return Err(ChainError::InvalidBlockLinkage {
                index: block.index,
                expected,
                found: block.previous_hash.clone(),
            });
        }

        if !ProofOfWork::verify(previous.proof, block.proof) {
            tracing::warn!(index = block.index, "proof does not solve puzzle");
            return Err(ChainError::InvalidProofOfWork {
                index: block.index,
                seed: previous.proof,
                proof: block.proof,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::Blockchain;
    use crate::transaction::Transaction;

    fn mined_chain() -> Vec<Block> {
        let mut blockchain = Blockchain::new();
        blockchain.new_transaction("A", "B", 10u64);
        blockchain.mine("M");
        blockchain.mine("M");
        blockchain.chain().to_vec()
    }

    #[test]
    fn test_valid_chain() {
        assert!(validate_chain(&mined_chain()).is_ok());
        assert!(validate_chain(&Blockchain::new().chain().to_vec()).is_ok());
    }

    #[test]
    fn test_empty_chain_rejected() {
        assert_eq!(validate_chain(&[]), Err(ChainError::EmptyChain));
    }

    #[test]
    fn test_tampered_transaction_breaks_linkage() {
        let mut chain = mined_chain();
        chain[1].transactions[0] = Transaction::new("A", "B", 1_000u64);

        match validate_chain(&chain) {
            Err(ChainError::InvalidBlockLinkage { index, .. }) => assert_eq!(index, 3),
            other => panic!("Expected InvalidBlockLinkage, got {:?}", other),
        }
    }

    #[test]
    fn test_unsolved_proof_rejected() {
        let mut blockchain = Blockchain::new();
        blockchain.new_block(0, None);

        match blockchain.validate() {
            Err(ChainError::InvalidProofOfWork { index, seed, proof }) => {
                assert_eq!((index, seed, proof), (2, 100, 0));
            }
            other => panic!("Expected InvalidProofOfWork, got {:?}", other),
        }
    }

    #[test]
    fn test_index_gap_rejected() {
        let mut chain = mined_chain();
        chain.remove(1);
        assert!(matches!(
            validate_chain(&chain),
            Err(ChainError::InvalidBlock(_))
        ));
    }
}
