//! Transition Validator
//!
//! Burn and Mint run in three phases per account:
//!
//! ```text
//!  ┌──────────── lock ────────────┐              ┌──────────── lock ────────────┐
//!  │ snapshot, nullifier check,   │  verify      │ re-check snapshot, nullifier │
//!  │ signal checks                │ ──(no lock)─▶│ check-and-insert, store write│
//!  └──────────────────────────────┘              └──────────────────────────────┘
//! ```
//!
//! Nothing is mutated before the final phase, and the final phase never
//! awaits once it holds the account lock, so a dropped future leaves no
//! trace.

use dashmap::DashMap;
use log::{debug, error, info, warn};
use shade_account::AccountId;
use shade_privacy::{
    CommitmentScheme, FieldElement, Nullifier, TransitionKind, balance_shift_public_inputs,
};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::bundle::{
    BalanceShiftProof, BalanceShiftSignals, Circuit, CommitmentTransitionProof,
};
use crate::ledger::nullifiers::NullifierRegistry;
use crate::ledger::verifier::{ProofVerifier, VerifierSet};
use crate::storage::{AccountState, LedgerStore, LedgerWrite};

type LockTable = DashMap<AccountId, Arc<tokio::sync::Mutex<()>>>;

pub struct TransitionValidator {
    store: Arc<dyn LedgerStore>,
    registry: Mutex<NullifierRegistry>,
    /// Only accounts with a transition in flight have an entry
    locks: LockTable,
    verifiers: VerifierSet,
    scheme: CommitmentScheme,
}

impl TransitionValidator {
    /// Reloads consumed nullifiers from the store
    pub fn new(store: Arc<dyn LedgerStore>, verifiers: VerifierSet) -> LedgerResult<Self> {
        let registry: NullifierRegistry = store.nullifiers()?.into_iter().collect();
        debug!("Loaded {} consumed nullifiers", registry.len());

        Ok(Self {
            store,
            registry: Mutex::new(registry),
            locks: DashMap::new(),
            verifiers,
            scheme: CommitmentScheme::new(),
        })
    }

    pub fn verifiers(&self) -> &VerifierSet {
        &self.verifiers
    }

    /// Unknown accounts read as [`AccountState::initial`]
    pub fn get(&self, account: &AccountId) -> LedgerResult<AccountState> {
        Ok(self.store.get_account(account)?.unwrap_or_default())
    }

    pub fn nullifier_count(&self) -> LedgerResult<usize> {
        Ok(self.registry()?.len())
    }

    fn registry(&self) -> LedgerResult<MutexGuard<'_, NullifierRegistry>> {
        self.registry
            .lock()
            .map_err(|_| LedgerError::Storage(anyhow::anyhow!("nullifier registry lock poisoned")))
    }

    fn ensure_unspent(&self, nullifier: &Nullifier) -> LedgerResult<()> {
        self.registry()?.ensure_unspent(nullifier)
    }

    fn account_lock(&self, account: &AccountId) -> AccountLock<'_> {
        AccountLock {
            locks: &self.locks,
            account: *account,
            mutex: Arc::clone(&self.locks.entry(*account).or_default()),
        }
    }

    /// Accounts currently holding a lock entry
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }

    // ========================================================================
    // Bootstrap
    // ========================================================================

    /// One-time initialization. Caller authorization happens one layer up.
    pub async fn bootstrap(
        &self,
        account: AccountId,
        public_balance: u128,
        private_commitment: FieldElement,
    ) -> LedgerResult<AccountState> {
        let lock = self.account_lock(&account);
        let _guard = lock.lock().await;

        if self.store.get_account(&account)?.is_some() {
            return Err(LedgerError::AlreadyInitialized(account));
        }

        let state = AccountState {
            public_balance,
            private_commitment,
        };
        self.store.commit(&LedgerWrite {
            account,
            state,
            nullifier: None,
        })?;

        info!("Bootstrapped {} with public balance {}", account, public_balance);
        Ok(state)
    }

    // ========================================================================
    // Burn (public -> private)
    // ========================================================================

    pub async fn burn(
        &self,
        account: AccountId,
        bundle: &BalanceShiftProof,
    ) -> LedgerResult<AccountState> {
        let signals = bundle.signals()?;
        let lock = self.account_lock(&account);

        let snapshot = {
            let _guard = lock.lock().await;
            let current = self.get(&account)?;
            self.ensure_unspent(&bundle.nullifier)?;
            check_current_public(&account, &current, &signals)?;

            if signals.new_public != signals.current_public {
                return Err(LedgerError::InvalidTransition {
                    kind: TransitionKind::Burn,
                    current: signals.current_public,
                    new: signals.new_public,
                });
            }

            let shift = positive_shift(TransitionKind::Burn, &signals)?;
            let grown = amount(TransitionKind::Burn, &signals, &signals.new_private)?
                .checked_sub(amount(TransitionKind::Burn, &signals, &signals.current_private)?);
            if grown != Some(shift) {
                return Err(invalid_amount(
                    TransitionKind::Burn,
                    &signals,
                    "private balance must grow by exactly the shift amount",
                ));
            }
            current
        };

        let inputs = balance_shift_public_inputs(
            &signals.to_array(),
            &snapshot.private_commitment,
            &bundle.new_commitment,
            &bundle.nullifier,
        );
        self.verify(
            Circuit::BalanceShift,
            &self.verifiers.balance_shift,
            bundle.proof.clone(),
            inputs,
        )
        .await?;

        let next = AccountState {
            public_balance: snapshot.public_balance,
            private_commitment: bundle.new_commitment,
        };

        let _guard = lock.lock().await;
        self.finalize(account, &snapshot, next, bundle.nullifier)?;

        info!("Burn accepted for {}: shifted {}", account, signals.shift_amount);
        Ok(next)
    }

    // ========================================================================
    // Mint (private -> public)
    // ========================================================================

    pub async fn mint(
        &self,
        account: AccountId,
        balance_shift: &BalanceShiftProof,
        commitment_transition: &CommitmentTransitionProof,
    ) -> LedgerResult<AccountState> {
        let signals = balance_shift.signals()?;
        let linked = commitment_transition.signals()?;
        let lock = self.account_lock(&account);

        let (snapshot, new_public) = {
            let _guard = lock.lock().await;
            let current = self.get(&account)?;
            self.ensure_unspent(&balance_shift.nullifier)?;
            check_current_public(&account, &current, &signals)?;

            let shift = positive_shift(TransitionKind::Mint, &signals)?;
            let new_public = current.public_balance.checked_add(shift).ok_or_else(|| {
                invalid_amount(TransitionKind::Mint, &signals, "public balance overflow")
            })?;
            if amount(TransitionKind::Mint, &signals, &signals.new_public)? != new_public {
                return Err(invalid_amount(
                    TransitionKind::Mint,
                    &signals,
                    "public balance must grow by exactly the shift amount",
                ));
            }
            let shrunk = amount(TransitionKind::Mint, &signals, &signals.current_private)?
                .checked_sub(amount(TransitionKind::Mint, &signals, &signals.new_private)?);
            if shrunk != Some(shift) {
                return Err(invalid_amount(
                    TransitionKind::Mint,
                    &signals,
                    "private balance must shrink by exactly the shift amount",
                ));
            }

            if linked.old_commitment != current.private_commitment {
                return Err(LedgerError::InconsistentProofs(
                    "old commitment does not match the stored commitment",
                ));
            }
            if linked.amount_hash != self.scheme.amount_hash(shift) {
                return Err(LedgerError::InconsistentProofs(
                    "amount hash does not match the shift amount",
                ));
            }
            if linked.new_commitment != balance_shift.new_commitment {
                return Err(LedgerError::InconsistentProofs(
                    "proofs attest different successor commitments",
                ));
            }
            (current, new_public)
        };

        let inputs = balance_shift_public_inputs(
            &signals.to_array(),
            &snapshot.private_commitment,
            &balance_shift.new_commitment,
            &balance_shift.nullifier,
        );
        self.verify(
            Circuit::BalanceShift,
            &self.verifiers.balance_shift,
            balance_shift.proof.clone(),
            inputs,
        )
        .await?;
        self.verify(
            Circuit::CommitmentTransition,
            &self.verifiers.commitment_transition,
            commitment_transition.proof.clone(),
            linked.to_array().to_vec(),
        )
        .await?;

        let next = AccountState {
            public_balance: new_public,
            private_commitment: linked.new_commitment,
        };

        let _guard = lock.lock().await;
        self.finalize(account, &snapshot, next, balance_shift.nullifier)?;

        info!("Mint accepted for {}: shifted {}", account, signals.shift_amount);
        Ok(next)
    }

    // ========================================================================
    // Shared Phases
    // ========================================================================

    /// Runs on the blocking pool, outside any account lock
    async fn verify(
        &self,
        circuit: Circuit,
        verifier: &Arc<dyn ProofVerifier>,
        proof: Vec<u8>,
        inputs: Vec<FieldElement>,
    ) -> LedgerResult<()> {
        let verifier = Arc::clone(verifier);
        let outcome = tokio::task::spawn_blocking(move || verifier.verify(&proof, &inputs)).await;

        match outcome {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => {
                warn!("{} proof rejected", circuit);
                Err(LedgerError::InvalidProof { circuit })
            }
            Ok(Err(e)) => {
                warn!("{} verifier failed: {:#}", circuit, e);
                Err(LedgerError::InvalidProof { circuit })
            }
            Err(e) => {
                error!("{} verification task aborted: {}", circuit, e);
                Err(LedgerError::InvalidProof { circuit })
            }
        }
    }

    /// Caller holds the account lock. The nullifier joins the registry
    /// only once the store write succeeded.
    fn finalize(
        &self,
        account: AccountId,
        snapshot: &AccountState,
        next: AccountState,
        nullifier: Nullifier,
    ) -> LedgerResult<()> {
        let mut registry = self.registry()?;
        registry.ensure_unspent(&nullifier)?;

        let current = self.get(&account)?;
        if current.public_balance != snapshot.public_balance {
            return Err(LedgerError::StaleState {
                account,
                stored: FieldElement::from_u128(current.public_balance),
                signalled: FieldElement::from_u128(snapshot.public_balance),
            });
        }
        if current.private_commitment != snapshot.private_commitment {
            return Err(LedgerError::StaleState {
                account,
                stored: current.private_commitment,
                signalled: snapshot.private_commitment,
            });
        }

        self.store.commit(&LedgerWrite {
            account,
            state: next,
            nullifier: Some(nullifier),
        })?;
        registry.insert(nullifier)
    }
}

/// Handle on one account's lock. Dropping the last handle removes the
/// table entry, so the table does not grow with every account ever seen.
struct AccountLock<'a> {
    locks: &'a LockTable,
    account: AccountId,
    mutex: Arc<tokio::sync::Mutex<()>>,
}

impl AccountLock<'_> {
    async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.mutex.lock().await
    }
}

impl Drop for AccountLock<'_> {
    fn drop(&mut self) {
        // One reference in the table, one in this handle
        self.locks
            .remove_if(&self.account, |_, mutex| Arc::strong_count(mutex) == 2);
    }
}

fn check_current_public(
    account: &AccountId,
    current: &AccountState,
    signals: &BalanceShiftSignals,
) -> LedgerResult<()> {
    let stored = FieldElement::from_u128(current.public_balance);
    if signals.current_public != stored {
        return Err(LedgerError::StaleState {
            account: *account,
            stored,
            signalled: signals.current_public,
        });
    }
    Ok(())
}

fn positive_shift(kind: TransitionKind, signals: &BalanceShiftSignals) -> LedgerResult<u128> {
    match amount(kind, signals, &signals.shift_amount)? {
        0 => Err(invalid_amount(kind, signals, "shift amount must be positive")),
        shift => Ok(shift),
    }
}

fn amount(
    kind: TransitionKind,
    signals: &BalanceShiftSignals,
    value: &FieldElement,
) -> LedgerResult<u128> {
    value
        .to_u128()
        .ok_or_else(|| invalid_amount(kind, signals, "signal exceeds the balance range"))
}

fn invalid_amount(
    kind: TransitionKind,
    signals: &BalanceShiftSignals,
    reason: &'static str,
) -> LedgerError {
    LedgerError::InvalidAmount {
        kind,
        shift: signals.shift_amount,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemStore;
    use shade_privacy::{PrivateState, burn_inputs};

    fn validator() -> TransitionValidator {
        TransitionValidator::new(Arc::new(MemStore::new()), VerifierSet::dummy()).unwrap()
    }

    fn burn_proof(account: AccountId, amount: u128) -> BalanceShiftProof {
        let state = PrivateState {
            account,
            secret: FieldElement::from_u64(7),
            private_balance: 0,
            public_balance: 10,
        };
        let inputs = burn_inputs(&CommitmentScheme::new(), &state, amount).unwrap();
        BalanceShiftProof::new(vec![1], &inputs)
    }

    #[tokio::test]
    async fn lock_entries_are_released_after_each_transition() {
        let validator = validator();
        let scheme = CommitmentScheme::new();

        for id in 1..=3u8 {
            let account = AccountId([id; 32]);
            validator
                .bootstrap(account, 10, scheme.commit_balance(&FieldElement::from_u64(7), 0))
                .await
                .unwrap();
            validator.burn(account, &burn_proof(account, 4)).await.unwrap();
        }

        // Rejected transitions release their entry too
        let account = AccountId([1; 32]);
        assert!(validator.burn(account, &burn_proof(account, 4)).await.is_err());

        assert_eq!(validator.active_locks(), 0);
    }

    #[tokio::test]
    async fn held_lock_is_shared_not_evicted() {
        let validator = validator();
        let account = AccountId([9; 32]);

        let first = validator.account_lock(&account);
        let second = validator.account_lock(&account);
        assert!(Arc::ptr_eq(&first.mutex, &second.mutex));

        drop(first);
        assert_eq!(validator.active_locks(), 1);
        drop(second);
        assert_eq!(validator.active_locks(), 0);
    }
}
