//! Shielded Ledger
//!
//! Caller-facing surface: every call passes the access controller before it
//! reaches the transition validator.
//!
//! ```text
//! caller ─▶ AccessController ─▶ TransitionValidator ─▶ LedgerStore
//!                                      │
//!                                      └─▶ NullifierRegistry
//! ```

pub mod access;
pub mod bundle;
pub mod nullifiers;
pub mod validator;
pub mod verifier;

pub use access::{AccessController, ControllerRole, Role, RoleSlot};
pub use bundle::{BalanceShiftProof, Circuit, CommitmentTransitionProof, ProofBundle};
pub use validator::TransitionValidator;
pub use verifier::{DummyVerifier, Groth16Verifier, ProofVerifier, VerifierMode, VerifierSet};

use log::info;
use shade_account::AccountId;
use shade_privacy::FieldElement;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{LedgerError, LedgerResult};
use crate::storage::{AccountState, LedgerStore};

pub struct ShieldedLedger {
    access: RwLock<AccessController>,
    validator: TransitionValidator,
    store: Arc<dyn LedgerStore>,
}

impl ShieldedLedger {
    /// Open the ledger over a store, reloading nullifiers and role bindings
    pub fn open(
        store: Arc<dyn LedgerStore>,
        owner: AccountId,
        verifiers: VerifierSet,
    ) -> LedgerResult<Self> {
        let mut access = AccessController::new(owner);
        for (role, holder) in store.roles()? {
            info!("Restored {} binding: {}", role, holder);
            access.restore(role, RoleSlot::Bound(holder));
        }

        let validator = TransitionValidator::new(Arc::clone(&store), verifiers)?;

        Ok(Self {
            access: RwLock::new(access),
            validator,
            store,
        })
    }

    fn access(&self) -> LedgerResult<RwLockReadGuard<'_, AccessController>> {
        self.access
            .read()
            .map_err(|_| LedgerError::Storage(anyhow::anyhow!("access controller lock poisoned")))
    }

    fn authorize(&self, caller: &AccountId, role: Role) -> LedgerResult<()> {
        let access = self.access()?;
        match role {
            Role::Owner => access.require_owner(caller),
            Role::Controller(role) => access.require(caller, role),
        }
    }

    fn access_mut(&self) -> LedgerResult<RwLockWriteGuard<'_, AccessController>> {
        self.access
            .write()
            .map_err(|_| LedgerError::Storage(anyhow::anyhow!("access controller lock poisoned")))
    }

    // ========================================================================
    // Role Management
    // ========================================================================

    pub fn owner(&self) -> LedgerResult<AccountId> {
        Ok(self.access()?.owner())
    }

    pub fn role(&self, role: ControllerRole) -> LedgerResult<RoleSlot> {
        Ok(self.access()?.slot(role))
    }

    pub fn bind_role(
        &self,
        caller: &AccountId,
        role: ControllerRole,
        holder: AccountId,
    ) -> LedgerResult<()> {
        let mut access = self.access_mut()?;
        access.bind(caller, role, holder)?;
        if let Err(e) = self.store.put_role(role, Some(holder)) {
            access.restore(role, RoleSlot::Unbound);
            return Err(e.into());
        }
        info!("Bound {} to {}", role, holder);
        Ok(())
    }

    pub fn unbind_role(&self, caller: &AccountId, role: ControllerRole) -> LedgerResult<()> {
        let mut access = self.access_mut()?;
        let previous = access.unbind(caller, role)?;
        if let Err(e) = self.store.put_role(role, None) {
            access.restore(role, previous);
            return Err(e.into());
        }
        info!("Unbound {}", role);
        Ok(())
    }

    // ========================================================================
    // Protocol Surface
    // ========================================================================

    /// Owner only, once per account
    pub async fn bootstrap(
        &self,
        caller: &AccountId,
        account: AccountId,
        public_balance: u128,
        initial_commitment: FieldElement,
    ) -> LedgerResult<AccountState> {
        self.authorize(caller, Role::Owner)?;
        self.validator
            .bootstrap(account, public_balance, initial_commitment)
            .await
    }

    /// Burn controller only
    pub async fn burn(
        &self,
        caller: &AccountId,
        account: AccountId,
        bundle: ProofBundle,
    ) -> LedgerResult<AccountState> {
        self.authorize(caller, ControllerRole::Burn.into())?;
        let proof = bundle.into_balance_shift()?;
        self.validator.burn(account, &proof).await
    }

    /// Mint controller only
    pub async fn mint(
        &self,
        caller: &AccountId,
        account: AccountId,
        balance_shift: ProofBundle,
        commitment_transition: ProofBundle,
    ) -> LedgerResult<AccountState> {
        self.authorize(caller, ControllerRole::Mint.into())?;
        let a = balance_shift.into_balance_shift()?;
        let b = commitment_transition.into_commitment_transition()?;
        self.validator.mint(account, &a, &b).await
    }

    /// Unrestricted read
    pub fn get_balance(&self, account: &AccountId) -> LedgerResult<AccountState> {
        self.validator.get(account)
    }

    pub fn nullifier_count(&self) -> LedgerResult<usize> {
        self.validator.nullifier_count()
    }

    pub fn verifiers(&self) -> &VerifierSet {
        self.validator.verifiers()
    }

    /// Persist everything before shutdown
    pub fn flush(&self) -> LedgerResult<()> {
        self.store.flush()?;
        Ok(())
    }
}
