//! Nullifiers
//!
//! Implements nullifier derivation for replay prevention.
//!
//! ```text
//! Nullifier = Poseidon(NULL, secret, account_hi, account_lo, current_public, prior_commitment, op)
//! ```
//!
//! The public balance never decreases: a burn keeps it and strictly grows the
//! private side, a mint strictly grows it. So `(current_public,
//! prior_commitment)` never repeats for one account and op, even when the
//! private balance returns to an earlier value. A replayed bundle carries a
//! nullifier the ledger has already consumed.
//!
//! The account id enters as two 128-bit limbs so distinct ids never collide
//! after reduction into the field.

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};
use shade_account::AccountId;
use std::fmt;

use crate::commitment::CommitmentScheme;
use crate::field::FieldElement;

/// Domain separation tag ("NULL")
const NULLIFIER_DOMAIN: u64 = 0x4e55_4c4c;

/// A nullifier - unique tag for one consumed transition
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nullifier(pub FieldElement);

impl Nullifier {
    pub fn as_field(&self) -> &FieldElement {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl From<FieldElement> for Nullifier {
    fn from(f: FieldElement) -> Self {
        Self(f)
    }
}

impl fmt::Debug for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nullifier({})", self.0)
    }
}

impl fmt::Display for Nullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Direction of a balance shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    /// public -> private
    Burn,
    /// private -> public
    Mint,
}

impl TransitionKind {
    pub fn op_tag(self) -> u64 {
        match self {
            TransitionKind::Burn => 1,
            TransitionKind::Mint => 2,
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionKind::Burn => f.write_str("burn"),
            TransitionKind::Mint => f.write_str("mint"),
        }
    }
}

/// Nullifier derivation key
///
/// Wraps the account secret that also blinds the balance commitment.
/// Only the prover side ever holds one.
#[derive(Clone)]
pub struct NullifierKey {
    secret: FieldElement,
    scheme: CommitmentScheme,
}

impl NullifierKey {
    pub fn new(secret: FieldElement) -> Self {
        Self {
            secret,
            scheme: CommitmentScheme::new(),
        }
    }

    /// Derive the nullifier for one transition attempt from the account
    /// state it starts at
    pub fn derive(
        &self,
        account: &AccountId,
        current_public: u128,
        prior_commitment: &FieldElement,
        kind: TransitionKind,
    ) -> Nullifier {
        let (hi, lo) = account_limbs(account);
        Nullifier(self.scheme.hash(&[
            Fr::from(NULLIFIER_DOMAIN),
            self.secret.to_fr(),
            Fr::from(hi),
            Fr::from(lo),
            Fr::from(current_public),
            prior_commitment.to_fr(),
            Fr::from(kind.op_tag()),
        ]))
    }
}

/// Big-endian id split into (high, low) halves
fn account_limbs(account: &AccountId) -> (u128, u128) {
    let mut hi = [0u8; 16];
    let mut lo = [0u8; 16];
    hi.copy_from_slice(&account.as_bytes()[..16]);
    lo.copy_from_slice(&account.as_bytes()[16..]);
    (u128::from_be_bytes(hi), u128::from_be_bytes(lo))
}

impl fmt::Debug for NullifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NullifierKey").finish_non_exhaustive()
    }
}
