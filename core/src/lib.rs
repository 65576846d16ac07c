//! Shade Core
//!
//! Shielded-balance ledger: every account holds a plaintext public balance
//! and a private balance known to the ledger only as a Poseidon commitment.
//! Value moves between the two through proof-gated Burn and Mint
//! transitions.

pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
pub use ledger::ShieldedLedger;

#[cfg(test)]
mod tests;
