//! Proof Verification
//!
//! The ledger only sees a verifier as an accept/reject capability over
//! (proof bytes, public inputs). One verifier is configured per circuit.

use anyhow::{Context, Result};
use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use shade_privacy::FieldElement;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Verifier Trait
// ============================================================================

pub trait ProofVerifier: Send + Sync {
    /// Accept or reject. Malformed proofs are a rejection, not an error.
    fn verify(&self, proof: &[u8], public_inputs: &[FieldElement]) -> Result<bool>;

    /// Hash of the verifying key (for status reporting)
    fn verification_key_hash(&self) -> [u8; 32];
}

// ============================================================================
// Dummy Verifier (test mode)
// ============================================================================

/// Accepts every proof
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyVerifier;

impl ProofVerifier for DummyVerifier {
    fn verify(&self, _proof: &[u8], _public_inputs: &[FieldElement]) -> Result<bool> {
        Ok(true)
    }

    fn verification_key_hash(&self) -> [u8; 32] {
        [0u8; 32]
    }
}

// ============================================================================
// Groth16 Verifier
// ============================================================================

/// Groth16 over BN254 using arkworks
pub struct Groth16Verifier {
    pvk: PreparedVerifyingKey<Bn254>,
    vk_hash: [u8; 32],
}

impl Groth16Verifier {
    pub fn new(vk: &VerifyingKey<Bn254>) -> Result<Self> {
        let vk_hash = compute_vk_hash(vk)?;
        let pvk = Groth16::<Bn254>::process_vk(vk)
            .map_err(|e| anyhow::anyhow!("Failed to prepare verifying key: {}", e))?;
        Ok(Self { pvk, vk_hash })
    }

    /// Verifying key in compressed arkworks encoding
    pub fn from_bytes(vk_bytes: &[u8]) -> Result<Self> {
        let vk = VerifyingKey::<Bn254>::deserialize_compressed(vk_bytes)
            .map_err(|e| anyhow::anyhow!("Failed to deserialize verifying key: {}", e))?;
        Self::new(&vk)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let vk_bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read verifying key from {}", path.display()))?;
        Self::from_bytes(&vk_bytes)
    }

    /// Number of public inputs the key expects
    pub fn input_count(&self) -> usize {
        self.pvk.vk.gamma_abc_g1.len().saturating_sub(1)
    }
}

impl ProofVerifier for Groth16Verifier {
    fn verify(&self, proof: &[u8], public_inputs: &[FieldElement]) -> Result<bool> {
        if public_inputs.len() != self.input_count() {
            debug!(
                "public input count {} does not match verifying key ({})",
                public_inputs.len(),
                self.input_count()
            );
            return Ok(false);
        }

        let proof = match Proof::<Bn254>::deserialize_compressed(proof) {
            Ok(p) => p,
            Err(e) => {
                debug!("malformed proof: {}", e);
                return Ok(false);
            }
        };

        let inputs: Vec<Fr> = public_inputs.iter().map(FieldElement::to_fr).collect();
        match Groth16::<Bn254>::verify_with_processed_vk(&self.pvk, &inputs, &proof) {
            Ok(valid) => Ok(valid),
            Err(e) => {
                debug!("verification error: {}", e);
                Ok(false)
            }
        }
    }

    fn verification_key_hash(&self) -> [u8; 32] {
        self.vk_hash
    }
}

fn compute_vk_hash(vk: &VerifyingKey<Bn254>) -> Result<[u8; 32]> {
    let mut vk_bytes = Vec::new();
    vk.serialize_compressed(&mut vk_bytes)
        .map_err(|e| anyhow::anyhow!("Failed to serialize VK: {}", e))?;
    Ok(*blake3::hash(&vk_bytes).as_bytes())
}

// ============================================================================
// Verifier Selection
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifierMode {
    /// Accept every proof
    #[default]
    Dummy,
    Groth16,
}

/// One verifier per circuit
#[derive(Clone)]
pub struct VerifierSet {
    pub balance_shift: Arc<dyn ProofVerifier>,
    pub commitment_transition: Arc<dyn ProofVerifier>,
}

impl VerifierSet {
    pub fn dummy() -> Self {
        Self {
            balance_shift: Arc::new(DummyVerifier),
            commitment_transition: Arc::new(DummyVerifier),
        }
    }

    pub fn groth16<P: AsRef<Path>>(balance_shift_vk: P, commitment_transition_vk: P) -> Result<Self> {
        let balance_shift = Groth16Verifier::from_file(balance_shift_vk)?;
        let commitment_transition = Groth16Verifier::from_file(commitment_transition_vk)?;
        info!(
            "Loaded Groth16 verifying keys (balance shift {}, commitment transition {})",
            hex::encode(&balance_shift.verification_key_hash()[..8]),
            hex::encode(&commitment_transition.verification_key_hash()[..8]),
        );
        Ok(Self {
            balance_shift: Arc::new(balance_shift),
            commitment_transition: Arc::new(commitment_transition),
        })
    }
}
