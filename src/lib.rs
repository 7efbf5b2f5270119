//! sigledger - a minimal value-transfer ledger with chained signature verification
//!
//! # Architecture
//!
//! Accounts are identified by their uncompressed secp256k1 public key and hold
//! an unsigned balance plus a chain token. Every verified transfer replaces the
//! sender's chain token with the digest it signed, so a signed transfer can be
//! applied at most once.
//!
//! ## Core
//! - [`ledger`] - Register, balance and send state transitions
//! - [`transaction`] - Transfer envelope, signed payload and signature verification
//!
//! ## Cryptography & Encoding
//! - [`crypto`] - Keccak-256 and recoverable secp256k1 signatures
//! - [`codec`] - Canonical binary encoding
//! - [`address`] - Address to state-key mapping
//!
//! ## Host Boundary
//! - [`persistence`] - Key-value state stores (in-memory, SQLite)
//! - [`dispatch`] - Named operation dispatch
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core
// ============================================================================
pub mod ledger;
pub mod transaction;

// ============================================================================
// Cryptography & Encoding
// ============================================================================
pub mod address;
pub mod codec;
pub mod crypto;

// ============================================================================
// Host Boundary
// ============================================================================
pub mod dispatch;
pub mod persistence;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

pub use error::{LedgerError, Result};
pub use ledger::{Balance, Ledger, LedgerPolicy};
pub use transaction::Transaction;
