//! Proof Inputs
//!
//! Off-ledger helpers that compute what a prover must target for a burn or
//! a mint: the public signals, the successor commitment and the nullifier.
//! Also owns the public-input layout shared by prover and verifier.

use serde::{Deserialize, Serialize};
use shade_account::AccountId;
use thiserror::Error;

use crate::commitment::CommitmentScheme;
use crate::field::FieldElement;
use crate::nullifier::{Nullifier, NullifierKey, TransitionKind};

/// Number of public signals in a balance shift proof (Circuit A)
pub const BALANCE_SHIFT_ARITY: usize = 5;

/// Number of public signals in a commitment transition proof (Circuit B)
pub const COMMITMENT_TRANSITION_ARITY: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("shift amount must be positive")]
    ZeroAmount,

    #[error("insufficient private balance: has {available}, needs {requested}")]
    InsufficientPrivateBalance { available: u128, requested: u128 },

    #[error("balance overflow")]
    Overflow,
}

/// Everything the prover knows about one account
#[derive(Debug, Clone)]
pub struct PrivateState {
    pub account: AccountId,
    pub secret: FieldElement,
    pub private_balance: u128,
    pub public_balance: u128,
}

impl PrivateState {
    pub fn commitment(&self, scheme: &CommitmentScheme) -> FieldElement {
        scheme.commit_balance(&self.secret, self.private_balance)
    }
}

/// Targets for a Circuit A proof
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceShiftInputs {
    /// (currentPublic, currentPrivate, shiftAmount, newPrivate, newPublic)
    pub public_signals: [FieldElement; BALANCE_SHIFT_ARITY],
    pub prior_commitment: FieldElement,
    pub new_commitment: FieldElement,
    pub nullifier: Nullifier,
}

impl BalanceShiftInputs {
    /// Full verifier input vector for this proof
    pub fn verifier_inputs(&self) -> Vec<FieldElement> {
        balance_shift_public_inputs(
            &self.public_signals,
            &self.prior_commitment,
            &self.new_commitment,
            &self.nullifier,
        )
    }
}

/// Targets for a Circuit B proof
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentTransitionInputs {
    /// (amountHash, oldCommitment, newCommitment)
    pub public_signals: [FieldElement; COMMITMENT_TRANSITION_ARITY],
}

/// Circuit A verifier inputs: `signals ‖ prior ‖ new ‖ nullifier`
pub fn balance_shift_public_inputs(
    signals: &[FieldElement; BALANCE_SHIFT_ARITY],
    prior_commitment: &FieldElement,
    new_commitment: &FieldElement,
    nullifier: &Nullifier,
) -> Vec<FieldElement> {
    let mut inputs = Vec::with_capacity(BALANCE_SHIFT_ARITY + 3);
    inputs.extend_from_slice(signals);
    inputs.push(*prior_commitment);
    inputs.push(*new_commitment);
    inputs.push(*nullifier.as_field());
    inputs
}

/// Inputs for moving `amount` from the public to the private balance.
/// The public balance is left unchanged.
pub fn burn_inputs(
    scheme: &CommitmentScheme,
    state: &PrivateState,
    amount: u128,
) -> Result<BalanceShiftInputs, InputError> {
    if amount == 0 {
        return Err(InputError::ZeroAmount);
    }
    let new_private = state
        .private_balance
        .checked_add(amount)
        .ok_or(InputError::Overflow)?;

    Ok(shift_inputs(
        scheme,
        state,
        amount,
        new_private,
        state.public_balance,
        TransitionKind::Burn,
    ))
}

/// Inputs for moving `amount` from the private to the public balance
pub fn mint_inputs(
    scheme: &CommitmentScheme,
    state: &PrivateState,
    amount: u128,
) -> Result<(BalanceShiftInputs, CommitmentTransitionInputs), InputError> {
    if amount == 0 {
        return Err(InputError::ZeroAmount);
    }
    let new_private = state.private_balance.checked_sub(amount).ok_or(
        InputError::InsufficientPrivateBalance {
            available: state.private_balance,
            requested: amount,
        },
    )?;
    let new_public = state
        .public_balance
        .checked_add(amount)
        .ok_or(InputError::Overflow)?;

    let a = shift_inputs(
        scheme,
        state,
        amount,
        new_private,
        new_public,
        TransitionKind::Mint,
    );
    let b = CommitmentTransitionInputs {
        public_signals: [scheme.amount_hash(amount), a.prior_commitment, a.new_commitment],
    };
    Ok((a, b))
}

fn shift_inputs(
    scheme: &CommitmentScheme,
    state: &PrivateState,
    amount: u128,
    new_private: u128,
    new_public: u128,
    kind: TransitionKind,
) -> BalanceShiftInputs {
    let prior_commitment = state.commitment(scheme);
    let new_commitment = scheme.commit_balance(&state.secret, new_private);
    let nullifier = NullifierKey::new(state.secret).derive(
        &state.account,
        state.public_balance,
        &prior_commitment,
        kind,
    );

    BalanceShiftInputs {
        public_signals: [
            FieldElement::from_u128(state.public_balance),
            FieldElement::from_u128(state.private_balance),
            FieldElement::from_u128(amount),
            FieldElement::from_u128(new_private),
            FieldElement::from_u128(new_public),
        ],
        prior_commitment,
        new_commitment,
        nullifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(private_balance: u128, public_balance: u128) -> PrivateState {
        PrivateState {
            account: AccountId([9u8; 32]),
            secret: FieldElement::from_u64(99999),
            private_balance,
            public_balance,
        }
    }

    #[test]
    fn burn_keeps_public_and_grows_private() {
        let scheme = CommitmentScheme::new();
        let inputs = burn_inputs(&scheme, &state(0, 100), 40).unwrap();

        let s = inputs.public_signals;
        assert_eq!(s[0], FieldElement::from_u64(100));
        assert_eq!(s[1], FieldElement::from_u64(0));
        assert_eq!(s[2], FieldElement::from_u64(40));
        assert_eq!(s[3], FieldElement::from_u64(40));
        assert_eq!(s[4], FieldElement::from_u64(100));
        assert_eq!(
            inputs.new_commitment,
            scheme.commit_balance(&FieldElement::from_u64(99999), 40)
        );
    }

    #[test]
    fn mint_links_both_circuits() {
        let scheme = CommitmentScheme::new();
        let (a, b) = mint_inputs(&scheme, &state(40, 100), 25).unwrap();

        assert_eq!(a.public_signals[3], FieldElement::from_u64(15));
        assert_eq!(a.public_signals[4], FieldElement::from_u64(125));
        assert_eq!(b.public_signals[0], scheme.amount_hash(25));
        assert_eq!(b.public_signals[1], a.prior_commitment);
        assert_eq!(b.public_signals[2], a.new_commitment);
    }

    #[test]
    fn mint_cannot_overdraw_private_balance() {
        let scheme = CommitmentScheme::new();
        let err = mint_inputs(&scheme, &state(10, 0), 25).unwrap_err();
        assert_eq!(
            err,
            InputError::InsufficientPrivateBalance {
                available: 10,
                requested: 25
            }
        );
    }

    #[test]
    fn zero_amount_is_rejected() {
        let scheme = CommitmentScheme::new();
        assert_eq!(burn_inputs(&scheme, &state(0, 1), 0).unwrap_err(), InputError::ZeroAmount);
    }

    #[test]
    fn burn_after_round_trip_has_fresh_nullifier() {
        let scheme = CommitmentScheme::new();
        let first = burn_inputs(&scheme, &state(0, 100), 40).unwrap();
        // minted the 40 back: private 0 again, public 140
        let later = burn_inputs(&scheme, &state(0, 140), 10).unwrap();

        assert_eq!(first.prior_commitment, later.prior_commitment);
        assert_ne!(first.nullifier, later.nullifier);
    }

    #[test]
    fn verifier_inputs_append_companion_values() {
        let scheme = CommitmentScheme::new();
        let inputs = burn_inputs(&scheme, &state(0, 100), 40).unwrap();
        let v = inputs.verifier_inputs();
        assert_eq!(v.len(), BALANCE_SHIFT_ARITY + 3);
        assert_eq!(v[5], inputs.prior_commitment);
        assert_eq!(v[6], inputs.new_commitment);
        assert_eq!(v[7], *inputs.nullifier.as_field());
    }
}
