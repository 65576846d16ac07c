//! Balance Commitments
//!
//! Implements the Poseidon-based commitment that hides a private balance.
//!
//! ```text
//! Commitment = Poseidon(secret, balance)
//! AmountHash = Poseidon(AMOUNT_DOMAIN, amount)
//! ```
//!
//! The ledger only ever stores and compares commitments; there is no inverse.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::{
    CryptographicSponge,
    poseidon::{PoseidonConfig, PoseidonSponge, find_poseidon_ark_and_mds},
};
use std::sync::LazyLock;

use crate::field::{DomainError, FieldElement};

/// Domain tag for amount hashing ("AMNT")
const AMOUNT_DOMAIN: u64 = 0x414d_4e54;

static POSEIDON: LazyLock<PoseidonConfig<Fr>> = LazyLock::new(poseidon_config);

/// Commitment scheme over the shared Poseidon parameters
#[derive(Debug, Clone, Copy)]
pub struct CommitmentScheme {
    config: &'static PoseidonConfig<Fr>,
}

impl CommitmentScheme {
    pub fn new() -> Self {
        Self { config: &POSEIDON }
    }

    /// C = Poseidon(secret, balance)
    pub fn commit(&self, secret: &FieldElement, balance: &FieldElement) -> FieldElement {
        self.hash(&[secret.to_fr(), balance.to_fr()])
    }

    /// Same as [`Self::commit`] for raw encodings; unreduced inputs are a
    /// [`DomainError`].
    pub fn commit_bytes(
        &self,
        secret: [u8; 32],
        balance: [u8; 32],
    ) -> Result<FieldElement, DomainError> {
        let secret = FieldElement::from_le_bytes(secret)?;
        let balance = FieldElement::from_le_bytes(balance)?;
        Ok(self.commit(&secret, &balance))
    }

    /// Commitment of a balance given as an integer
    pub fn commit_balance(&self, secret: &FieldElement, balance: u128) -> FieldElement {
        self.commit(secret, &FieldElement::from_u128(balance))
    }

    /// Commitment held by every account that was never bootstrapped
    pub fn default_commitment(&self) -> FieldElement {
        self.commit(&FieldElement::ZERO, &FieldElement::ZERO)
    }

    /// Hash binding a Circuit B proof to the shifted amount
    pub fn amount_hash(&self, amount: u128) -> FieldElement {
        self.hash(&[Fr::from(AMOUNT_DOMAIN), FieldElement::from_u128(amount).to_fr()])
    }

    /// Absorb all inputs in order, squeeze one element
    pub(crate) fn hash(&self, inputs: &[Fr]) -> FieldElement {
        let mut sponge = PoseidonSponge::new(self.config);
        for input in inputs {
            sponge.absorb(input);
        }
        let result: Fr = sponge.squeeze_field_elements(1)[0];
        FieldElement::from_fr(result)
    }
}

impl Default for CommitmentScheme {
    fn default() -> Self {
        Self::new()
    }
}

/// Poseidon configuration for Shade
///
/// Field: BN254 Fr (254 bits)
/// Rate: 2, Capacity: 1
/// Security: 128 bits
fn poseidon_config() -> PoseidonConfig<Fr> {
    let prime_bits: u64 = 254;
    let rate: usize = 2;
    let capacity: usize = 1;
    let full_rounds: u64 = 8;
    let partial_rounds: u64 = 57;
    let alpha: u64 = 5;
    let skip_matrices: u64 = 0;

    let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
        prime_bits,
        rate,
        full_rounds,
        partial_rounds,
        skip_matrices,
    );

    PoseidonConfig::new(
        full_rounds as usize,
        partial_rounds as usize,
        alpha,
        mds,
        ark,
        rate,
        capacity,
    )
}
