use shade_privacy::Nullifier;
use std::collections::HashSet;

use crate::error::{LedgerError, LedgerResult};

/// Append-only set of consumed nullifiers
#[derive(Debug, Default)]
pub struct NullifierRegistry {
    spent: HashSet<Nullifier>,
}

impl NullifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, nullifier: &Nullifier) -> bool {
        self.spent.contains(nullifier)
    }

    /// Fails with `Replay` if already consumed
    pub fn ensure_unspent(&self, nullifier: &Nullifier) -> LedgerResult<()> {
        if self.contains(nullifier) {
            return Err(LedgerError::Replay(*nullifier));
        }
        Ok(())
    }

    pub fn insert(&mut self, nullifier: Nullifier) -> LedgerResult<()> {
        if !self.spent.insert(nullifier) {
            return Err(LedgerError::Replay(nullifier));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.spent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spent.is_empty()
    }
}

impl FromIterator<Nullifier> for NullifierRegistry {
    fn from_iter<I: IntoIterator<Item = Nullifier>>(iter: I) -> Self {
        Self {
            spent: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_privacy::FieldElement;

    #[test]
    fn second_insert_is_a_replay() {
        let mut registry = NullifierRegistry::new();
        let n = Nullifier(FieldElement::from_u64(42));

        registry.insert(n).unwrap();
        assert!(registry.contains(&n));
        assert!(matches!(registry.insert(n), Err(LedgerError::Replay(x)) if x == n));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reload_from_store() {
        let registry: NullifierRegistry = (0..3u64)
            .map(|i| Nullifier(FieldElement::from_u64(i)))
            .collect();
        assert_eq!(registry.len(), 3);
        assert!(
            registry
                .ensure_unspent(&Nullifier(FieldElement::from_u64(1)))
                .is_err()
        );
        assert!(
            registry
                .ensure_unspent(&Nullifier(FieldElement::from_u64(3)))
                .is_ok()
        );
    }
}
