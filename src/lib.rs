//! hashledger - A single-node proof-of-work ledger
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the append-only chain and its validation
//! - [`transaction`] - Transaction and amount types
//! - [`mempool`] - Pending transaction pool
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work search and verification
//!
//! ## Cryptography
//! - [`crypto`] - Canonical JSON hashing (SHA-256) and node identifiers
//!
//! ## Node & Integration
//! - [`node`] - Process orchestrator owning the ledger instance
//! - `api` - HTTP endpoints (feature `api`)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod mempool;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Node & Integration
// ============================================================================
#[cfg(feature = "api")]
pub mod api;
pub mod node;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
