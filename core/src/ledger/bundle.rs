//! Proof Bundles
//!
//! Tagged proof payloads with fixed public-signal arity.
//!
//! ```json
//! { "circuit": "balance_shift", "proof": "<hex>",
//!   "public_signals": ["100", "0", "40", "40", "100"],
//!   "nullifier": "...", "new_commitment": "..." }
//! ```

use serde::{Deserialize, Serialize};
use shade_privacy::{
    BALANCE_SHIFT_ARITY, BalanceShiftInputs, COMMITMENT_TRANSITION_ARITY,
    CommitmentTransitionInputs, DomainError, FieldElement, Nullifier,
};
use std::fmt;

/// Which verifier a proof targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Circuit {
    /// Circuit A
    BalanceShift,
    /// Circuit B
    CommitmentTransition,
}

impl Circuit {
    pub fn as_str(self) -> &'static str {
        match self {
            Circuit::BalanceShift => "balance shift",
            Circuit::CommitmentTransition => "commitment transition",
        }
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Circuit A proof plus the companion values it attests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceShiftProof {
    #[serde(with = "hex")]
    pub proof: Vec<u8>,
    pub public_signals: Vec<FieldElement>,
    pub nullifier: Nullifier,
    pub new_commitment: FieldElement,
}

impl BalanceShiftProof {
    pub fn new(proof: Vec<u8>, inputs: &BalanceShiftInputs) -> Self {
        Self {
            proof,
            public_signals: inputs.public_signals.to_vec(),
            nullifier: inputs.nullifier,
            new_commitment: inputs.new_commitment,
        }
    }

    pub fn signals(&self) -> Result<BalanceShiftSignals, DomainError> {
        BalanceShiftSignals::parse(&self.public_signals)
    }
}

/// Circuit B proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentTransitionProof {
    #[serde(with = "hex")]
    pub proof: Vec<u8>,
    pub public_signals: Vec<FieldElement>,
}

impl CommitmentTransitionProof {
    pub fn new(proof: Vec<u8>, inputs: &CommitmentTransitionInputs) -> Self {
        Self {
            proof,
            public_signals: inputs.public_signals.to_vec(),
        }
    }

    pub fn signals(&self) -> Result<CommitmentTransitionSignals, DomainError> {
        CommitmentTransitionSignals::parse(&self.public_signals)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "circuit", rename_all = "snake_case")]
pub enum ProofBundle {
    BalanceShift(BalanceShiftProof),
    CommitmentTransition(CommitmentTransitionProof),
}

impl ProofBundle {
    pub fn circuit(&self) -> Circuit {
        match self {
            ProofBundle::BalanceShift(_) => Circuit::BalanceShift,
            ProofBundle::CommitmentTransition(_) => Circuit::CommitmentTransition,
        }
    }

    pub fn into_balance_shift(self) -> Result<BalanceShiftProof, DomainError> {
        match self {
            ProofBundle::BalanceShift(p) => Ok(p),
            other => Err(wrong_circuit(Circuit::BalanceShift, other.circuit())),
        }
    }

    pub fn into_commitment_transition(self) -> Result<CommitmentTransitionProof, DomainError> {
        match self {
            ProofBundle::CommitmentTransition(p) => Ok(p),
            other => Err(wrong_circuit(Circuit::CommitmentTransition, other.circuit())),
        }
    }
}

impl From<BalanceShiftProof> for ProofBundle {
    fn from(p: BalanceShiftProof) -> Self {
        ProofBundle::BalanceShift(p)
    }
}

impl From<CommitmentTransitionProof> for ProofBundle {
    fn from(p: CommitmentTransitionProof) -> Self {
        ProofBundle::CommitmentTransition(p)
    }
}

fn wrong_circuit(expected: Circuit, got: Circuit) -> DomainError {
    DomainError::WrongCircuit {
        expected: expected.as_str(),
        got: got.as_str(),
    }
}

fn check_arity<const N: usize>(signals: &[FieldElement]) -> Result<[FieldElement; N], DomainError> {
    signals.try_into().map_err(|_| DomainError::Arity {
        expected: N,
        got: signals.len(),
    })
}

/// Named view of the five Circuit A signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceShiftSignals {
    pub current_public: FieldElement,
    pub current_private: FieldElement,
    pub shift_amount: FieldElement,
    pub new_private: FieldElement,
    pub new_public: FieldElement,
}

impl BalanceShiftSignals {
    pub fn parse(signals: &[FieldElement]) -> Result<Self, DomainError> {
        let [current_public, current_private, shift_amount, new_private, new_public] =
            check_arity::<BALANCE_SHIFT_ARITY>(signals)?;
        Ok(Self {
            current_public,
            current_private,
            shift_amount,
            new_private,
            new_public,
        })
    }

    pub fn to_array(&self) -> [FieldElement; BALANCE_SHIFT_ARITY] {
        [
            self.current_public,
            self.current_private,
            self.shift_amount,
            self.new_private,
            self.new_public,
        ]
    }
}

/// Named view of the three Circuit B signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitmentTransitionSignals {
    pub amount_hash: FieldElement,
    pub old_commitment: FieldElement,
    pub new_commitment: FieldElement,
}

impl CommitmentTransitionSignals {
    pub fn parse(signals: &[FieldElement]) -> Result<Self, DomainError> {
        let [amount_hash, old_commitment, new_commitment] =
            check_arity::<COMMITMENT_TRANSITION_ARITY>(signals)?;
        Ok(Self {
            amount_hash,
            old_commitment,
            new_commitment,
        })
    }

    pub fn to_array(&self) -> [FieldElement; COMMITMENT_TRANSITION_ARITY] {
        [self.amount_hash, self.old_commitment, self.new_commitment]
    }
}
