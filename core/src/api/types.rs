//! API Types
//!
//! Request/response types for the HTTP API.

use serde::{Deserialize, Serialize};
use shade_account::AccountId;
use shade_privacy::FieldElement;

use crate::ledger::ProofBundle;
use crate::storage::AccountState;

// ============================================================================
// Health & Status
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub owner: AccountId,
    pub burn_controller: Option<AccountId>,
    pub mint_controller: Option<AccountId>,
    pub nullifier_count: usize,
    /// blake3 of each verifying key, hex encoded
    pub balance_shift_vk: String,
    pub commitment_transition_vk: String,
}

// ============================================================================
// Account Operations
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
    pub account: AccountId,
}

/// Public view of an account
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceResponse {
    pub account: AccountId,
    pub public_balance: u128,
    pub private_commitment: FieldElement,
}

impl BalanceResponse {
    pub fn new(account: AccountId, state: AccountState) -> Self {
        Self {
            account,
            public_balance: state.public_balance,
            private_commitment: state.private_commitment,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BootstrapRequest {
    pub account: AccountId,
    pub public_balance: u128,
    pub initial_commitment: FieldElement,
}

// ============================================================================
// Transitions
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BurnRequest {
    pub account: AccountId,
    pub bundle: ProofBundle,
}

#[derive(Debug, Deserialize)]
pub struct MintRequest {
    pub account: AccountId,
    pub balance_shift: ProofBundle,
    pub commitment_transition: ProofBundle,
}

// ============================================================================
// Error Response
// ============================================================================

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::new(msg, "VERIFY_TIMEOUT")
    }
}
