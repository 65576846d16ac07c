use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Externally issued account identity (address / public key bytes).
///
/// Shorter identities such as 20-byte EVM addresses are right-aligned into
/// the 32 bytes, the same way they would be left-padded in an ABI word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AccountId(pub [u8; 32]);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("invalid hex in account id: {0}")]
    InvalidHex(String),

    #[error("account id must be at most 32 bytes, got {0}")]
    TooLong(usize),
}

impl AccountId {
    pub const LEN: usize = 32;

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Builds an id from up to 32 raw bytes, right-aligned.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AccountIdError> {
        if bytes.len() > Self::LEN {
            return Err(AccountIdError::TooLong(bytes.len()));
        }
        let mut arr = [0u8; 32];
        arr[Self::LEN - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Lowercase hex, `0x` prefixed.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for AccountId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|e| AccountIdError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // trailing 4 bytes are enough to tell accounts apart in logs
        write!(f, "AccountId(0x{}..)", hex::encode(&self.0[28..]))
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
