//! Field Elements
//!
//! Public signals, commitments and nullifiers all live in the BN254 scalar
//! field, the field circom/snarkjs Groth16 proofs are expressed over.
//!
//! ```text
//! FieldElement = 32 bytes, little-endian, always < r
//! r = 21888242871839275222246405745257275088548364400416034343698204186575808495617
//! ```
//!
//! The textual form is the decimal string snarkjs writes into `public.json`.

use ark_bn254::Fr;
use ark_ff::{BigInt, BigInteger, PrimeField};
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Malformed field input
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("value is not reduced modulo the BN254 scalar field")]
    NotReduced,

    #[error("invalid field element literal: {0:?}")]
    InvalidLiteral(String),

    #[error("public signal arity mismatch: expected {expected}, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("expected a {expected} proof bundle, got {got}")]
    WrongCircuit {
        expected: &'static str,
        got: &'static str,
    },
}

/// A canonical BN254 scalar
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FieldElement([u8; 32]);

impl FieldElement {
    pub const ZERO: Self = Self([0u8; 32]);

    /// Checked construction from little-endian bytes
    pub fn from_le_bytes(bytes: [u8; 32]) -> Result<Self, DomainError> {
        match fr_from_canonical(&bytes) {
            Some(_) => Ok(Self(bytes)),
            None => Err(DomainError::NotReduced),
        }
    }

    pub fn from_fr(f: Fr) -> Self {
        let bytes = f.into_bigint().to_bytes_le();
        let mut arr = [0u8; 32];
        arr[..bytes.len()].copy_from_slice(&bytes);
        Self(arr)
    }

    /// Bytes are canonical by construction, so no reduction happens here.
    pub fn to_fr(&self) -> Fr {
        Fr::from_le_bytes_mod_order(&self.0)
    }

    pub fn from_u128(value: u128) -> Self {
        let mut arr = [0u8; 32];
        arr[..16].copy_from_slice(&value.to_le_bytes());
        Self(arr)
    }

    pub fn from_u64(value: u64) -> Self {
        Self::from_u128(value as u128)
    }

    /// `None` when the element does not fit a balance-sized integer.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0[16..].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&self.0[..16]);
        Some(u128::from_le_bytes(low))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parses a decimal literal, or a `0x` prefixed big-endian hex literal.
    pub fn parse_literal(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        let value = if let Some(hex_digits) = s.strip_prefix("0x") {
            if hex_digits.is_empty() || !hex_digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(DomainError::InvalidLiteral(s.to_string()));
            }
            BigUint::parse_bytes(hex_digits.as_bytes(), 16)
        } else if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            BigUint::parse_bytes(s.as_bytes(), 10)
        } else {
            None
        }
        .ok_or_else(|| DomainError::InvalidLiteral(s.to_string()))?;

        if value >= modulus() {
            return Err(DomainError::NotReduced);
        }

        let bytes = value.to_bytes_le();
        let mut arr = [0u8; 32];
        arr[..bytes.len()].copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    pub fn to_decimal(&self) -> String {
        BigUint::from_bytes_le(&self.0).to_str_radix(10)
    }
}

fn modulus() -> BigUint {
    BigUint::from_bytes_le(&Fr::MODULUS.to_bytes_le())
}

fn fr_from_canonical(bytes: &[u8; 32]) -> Option<Fr> {
    let mut limbs = [0u64; 4];
    for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        *limb = u64::from_le_bytes(word);
    }
    Fr::from_bigint(BigInt::new(limbs))
}

impl From<Fr> for FieldElement {
    fn from(f: Fr) -> Self {
        Self::from_fr(f)
    }
}

impl From<u128> for FieldElement {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl FromStr for FieldElement {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_literal(s)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({})", self.to_decimal())
    }
}

impl AsRef<[u8]> for FieldElement {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_literal(&s).map_err(serde::de::Error::custom)
    }
}
