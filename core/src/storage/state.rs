use anyhow::Result;
use shade_account::AccountId;
use shade_privacy::{CommitmentScheme, FieldElement, Nullifier};

use crate::ledger::access::ControllerRole;

/// Public view of one account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountState {
    pub public_balance: u128,
    pub private_commitment: FieldElement,
}

impl AccountState {
    /// State reported for an account that was never written:
    /// zero public balance, `commit(0, 0)`.
    pub fn initial() -> Self {
        Self {
            public_balance: 0,
            private_commitment: CommitmentScheme::new().default_commitment(),
        }
    }
}

impl Default for AccountState {
    fn default() -> Self {
        Self::initial()
    }
}

/// One atomic ledger mutation
#[derive(Debug, Clone)]
pub struct LedgerWrite {
    pub account: AccountId,
    pub state: AccountState,
    /// Consumed alongside the account update, if any
    pub nullifier: Option<Nullifier>,
}

/// decoupling the ledger from the db
pub trait LedgerStore: Send + Sync {
    /// Retrieve an account. `None` if it was never written.
    fn get_account(&self, id: &AccountId) -> Result<Option<AccountState>>;

    /// Persist the account update and nullifier together, or neither.
    fn commit(&self, write: &LedgerWrite) -> Result<()>;

    /// Every consumed nullifier (for loading on startup)
    fn nullifiers(&self) -> Result<Vec<Nullifier>>;

    /// Persisted controller bindings
    fn roles(&self) -> Result<Vec<(ControllerRole, AccountId)>>;

    /// Bind (`Some`) or clear (`None`) a controller slot
    fn put_role(&self, role: ControllerRole, holder: Option<AccountId>) -> Result<()>;

    fn flush(&self) -> Result<()>;
}
