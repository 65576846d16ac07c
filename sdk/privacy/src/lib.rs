//! Shade Privacy SDK
//!
//! Field, commitment and nullifier primitives shared by the ledger and by
//! provers building burn/mint proofs.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Account Transition                      │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌───────────────┐   │
//! │  │  Nullifier   │  │  New Commitment  │  │ Public Signals│   │
//! │  │  (consumed)  │  │  (private bal.)  │  │ (5 or 5 + 3)  │   │
//! │  └──────────────┘  └──────────────────┘  └───────────────┘   │
//! │         │                  │                     │           │
//! │         ▼                  ▼                     ▼           │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              ZK Proof (Groth16, BN254)                 │  │
//! │  │  • Prior commitment opens to currentPrivate            │  │
//! │  │  • New commitment opens to newPrivate                  │  │
//! │  │  • Balances move by exactly shiftAmount                │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod commitment;
pub mod field;
pub mod inputs;
pub mod nullifier;

pub use commitment::CommitmentScheme;
pub use field::{DomainError, FieldElement};
pub use inputs::{
    BALANCE_SHIFT_ARITY, BalanceShiftInputs, COMMITMENT_TRANSITION_ARITY,
    CommitmentTransitionInputs, InputError, PrivateState, balance_shift_public_inputs,
    burn_inputs, mint_inputs,
};
pub use nullifier::{Nullifier, NullifierKey, TransitionKind};
