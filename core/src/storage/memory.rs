use crate::ledger::access::ControllerRole;
use crate::storage::{AccountState, LedgerStore, LedgerWrite};
use anyhow::{Result, anyhow};
use shade_account::AccountId;
use shade_privacy::Nullifier;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, AccountState>,
    nullifiers: HashSet<Nullifier>,
    roles: HashMap<ControllerRole, AccountId>,
}

/// In-process store for tests and ephemeral nodes.
/// Nothing survives a restart.
#[derive(Default)]
pub struct MemStore {
    tables: Mutex<Tables>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl LedgerStore for MemStore {
    fn get_account(&self, id: &AccountId) -> Result<Option<AccountState>> {
        Ok(self.tables()?.accounts.get(id).copied())
    }

    fn commit(&self, write: &LedgerWrite) -> Result<()> {
        let mut tables = self.tables()?;
        tables.accounts.insert(write.account, write.state);
        if let Some(nullifier) = write.nullifier {
            tables.nullifiers.insert(nullifier);
        }
        Ok(())
    }

    fn nullifiers(&self) -> Result<Vec<Nullifier>> {
        Ok(self.tables()?.nullifiers.iter().copied().collect())
    }

    fn roles(&self) -> Result<Vec<(ControllerRole, AccountId)>> {
        Ok(self
            .tables()?
            .roles
            .iter()
            .map(|(role, holder)| (*role, *holder))
            .collect())
    }

    fn put_role(&self, role: ControllerRole, holder: Option<AccountId>) -> Result<()> {
        let mut tables = self.tables()?;
        match holder {
            Some(holder) => tables.roles.insert(role, holder),
            None => tables.roles.remove(&role),
        };
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_privacy::FieldElement;

    #[test]
    fn missing_account_is_none() {
        let store = MemStore::new();
        assert_eq!(store.get_account(&AccountId([1; 32])).unwrap(), None);
    }

    #[test]
    fn commit_writes_account_and_nullifier() {
        let store = MemStore::new();
        let state = AccountState {
            public_balance: 7,
            private_commitment: FieldElement::from_u64(3),
        };
        store
            .commit(&LedgerWrite {
                account: AccountId([1; 32]),
                state,
                nullifier: Some(Nullifier(FieldElement::from_u64(9))),
            })
            .unwrap();

        assert_eq!(store.get_account(&AccountId([1; 32])).unwrap(), Some(state));
        assert_eq!(
            store.nullifiers().unwrap(),
            vec![Nullifier(FieldElement::from_u64(9))]
        );
    }

    #[test]
    fn role_can_be_cleared() {
        let store = MemStore::new();
        store
            .put_role(ControllerRole::Burn, Some(AccountId([4; 32])))
            .unwrap();
        store.put_role(ControllerRole::Burn, None).unwrap();
        assert!(store.roles().unwrap().is_empty());
    }
}
