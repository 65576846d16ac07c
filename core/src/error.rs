//! Ledger Errors
//!
//! Every rejected transition maps to exactly one variant. Variants carry
//! only values that are already public (account ids, public balances,
//! commitments, nullifiers), never a secret or a private balance.

use shade_account::AccountId;
use shade_privacy::{DomainError, FieldElement, Nullifier, TransitionKind};
use thiserror::Error;

use crate::ledger::access::{ControllerRole, Role};
use crate::ledger::bundle::Circuit;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{caller} is not authorized to act as {role}")]
    Authorization { caller: AccountId, role: Role },

    #[error("account {0} is already initialized")]
    AlreadyInitialized(AccountId),

    #[error("stale state for {account}: ledger holds {stored}, proof targets {signalled}")]
    StaleState {
        account: AccountId,
        stored: FieldElement,
        signalled: FieldElement,
    },

    #[error("{kind} must leave the public balance unchanged ({current} -> {new})")]
    InvalidTransition {
        kind: TransitionKind,
        current: FieldElement,
        new: FieldElement,
    },

    #[error("invalid {kind} amount {shift}: {reason}")]
    InvalidAmount {
        kind: TransitionKind,
        shift: FieldElement,
        reason: &'static str,
    },

    #[error("proof rejected by the {circuit} verifier")]
    InvalidProof { circuit: Circuit },

    #[error("inconsistent mint proofs: {0}")]
    InconsistentProofs(&'static str),

    #[error("nullifier {0} has already been consumed")]
    Replay(Nullifier),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{role} is already bound to {holder}")]
    RoleAlreadyBound {
        role: ControllerRole,
        holder: AccountId,
    },

    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl LedgerError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Authorization { .. } => "UNAUTHORIZED",
            LedgerError::AlreadyInitialized(_) => "ALREADY_INITIALIZED",
            LedgerError::StaleState { .. } => "STALE_STATE",
            LedgerError::InvalidTransition { .. } => "INVALID_TRANSITION",
            LedgerError::InvalidAmount { .. } => "INVALID_AMOUNT",
            LedgerError::InvalidProof { .. } => "INVALID_PROOF",
            LedgerError::InconsistentProofs(_) => "INCONSISTENT_PROOFS",
            LedgerError::Replay(_) => "REPLAY",
            LedgerError::Domain(_) => "DOMAIN_ERROR",
            LedgerError::RoleAlreadyBound { .. } => "ROLE_ALREADY_BOUND",
            LedgerError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
