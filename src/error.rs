//! Error types for hashledger

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Invalid block: {0}")]
    InvalidBlock(String),
    #[error("Invalid block linkage at index {index}: expected previous hash {expected}, found {found}")]
    InvalidBlockLinkage {
        index: u64,
        expected: String,
        found: String,
    },
    #[error("Invalid proof of work at index {index}: proof {proof} does not solve seed {seed}")]
    InvalidProofOfWork { index: u64, seed: u64, proof: u64 },
    #[error("Chain is empty")]
    EmptyChain,
    #[error("Mining was cancelled before a proof was found")]
    MiningCancelled,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
