use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use shade_account::AccountId;
use shade_privacy::{
    CommitmentScheme, FieldElement, PrivateState, burn_inputs, mint_inputs,
};

use crate::ledger::{
    BalanceShiftProof, CommitmentTransitionProof, ControllerRole, DummyVerifier, ProofBundle,
    ProofVerifier, RoleSlot, ShieldedLedger, VerifierSet,
};
use crate::storage::{LedgerStore, MemStore};

mod concurrency;
mod db;

const OWNER: AccountId = AccountId([0xaa; 32]);
const BURNER: AccountId = AccountId([0xbb; 32]);
const MINTER: AccountId = AccountId([0xcc; 32]);

/// Placeholder proof bytes; the dummy verifier never looks at them
const PROOF: [u8; 4] = [0xde, 0xad, 0xbe, 0xef];

fn account(id: u8) -> AccountId {
    let mut b = [0u8; 32];
    b[0] = id;
    AccountId(b)
}

fn mem_store() -> Arc<dyn LedgerStore> {
    Arc::new(MemStore::new())
}

/// Open a ledger with both controllers bound
fn ledger_with(store: Arc<dyn LedgerStore>, verifiers: VerifierSet) -> ShieldedLedger {
    let ledger = ShieldedLedger::open(store, OWNER, verifiers).unwrap();
    if ledger.role(ControllerRole::Burn).unwrap() == RoleSlot::Unbound {
        ledger
            .bind_role(&OWNER, ControllerRole::Burn, BURNER)
            .unwrap();
    }
    if ledger.role(ControllerRole::Mint).unwrap() == RoleSlot::Unbound {
        ledger
            .bind_role(&OWNER, ControllerRole::Mint, MINTER)
            .unwrap();
    }
    ledger
}

fn dummy_ledger() -> ShieldedLedger {
    ledger_with(mem_store(), VerifierSet::dummy())
}

/// Rejects every proof
struct RejectingVerifier;

impl ProofVerifier for RejectingVerifier {
    fn verify(&self, _proof: &[u8], _public_inputs: &[FieldElement]) -> Result<bool> {
        Ok(false)
    }

    fn verification_key_hash(&self) -> [u8; 32] {
        [0xff; 32]
    }
}

/// Accepts after blocking the calling thread
struct SlowVerifier(Duration);

impl ProofVerifier for SlowVerifier {
    fn verify(&self, _proof: &[u8], _public_inputs: &[FieldElement]) -> Result<bool> {
        std::thread::sleep(self.0);
        Ok(true)
    }

    fn verification_key_hash(&self) -> [u8; 32] {
        [0u8; 32]
    }
}

/// Accepts once every party has reached verification
struct RendezvousVerifier(std::sync::Barrier);

impl ProofVerifier for RendezvousVerifier {
    fn verify(&self, _proof: &[u8], _public_inputs: &[FieldElement]) -> Result<bool> {
        self.0.wait();
        Ok(true)
    }

    fn verification_key_hash(&self) -> [u8; 32] {
        [0u8; 32]
    }
}

fn rejecting(circuit_a: bool, circuit_b: bool) -> VerifierSet {
    let pick = |reject: bool| -> Arc<dyn ProofVerifier> {
        if reject {
            Arc::new(RejectingVerifier)
        } else {
            Arc::new(DummyVerifier)
        }
    };
    VerifierSet {
        balance_shift: pick(circuit_a),
        commitment_transition: pick(circuit_b),
    }
}

/// Prover-side view of one account
#[derive(Clone)]
struct Wallet {
    state: PrivateState,
    scheme: CommitmentScheme,
}

impl Wallet {
    fn new(account: AccountId, secret: u64, public_balance: u128) -> Self {
        Self {
            state: PrivateState {
                account,
                secret: FieldElement::from_u64(secret),
                private_balance: 0,
                public_balance,
            },
            scheme: CommitmentScheme::new(),
        }
    }

    fn account(&self) -> AccountId {
        self.state.account
    }

    fn commitment(&self) -> FieldElement {
        self.state.commitment(&self.scheme)
    }

    fn burn_proof(&self, amount: u128) -> BalanceShiftProof {
        let inputs = burn_inputs(&self.scheme, &self.state, amount).unwrap();
        BalanceShiftProof::new(PROOF.to_vec(), &inputs)
    }

    fn burn(&self, amount: u128) -> ProofBundle {
        self.burn_proof(amount).into()
    }

    fn mint_proofs(&self, amount: u128) -> (BalanceShiftProof, CommitmentTransitionProof) {
        let (a, b) = mint_inputs(&self.scheme, &self.state, amount).unwrap();
        (
            BalanceShiftProof::new(PROOF.to_vec(), &a),
            CommitmentTransitionProof::new(PROOF.to_vec(), &b),
        )
    }

    fn mint(&self, amount: u128) -> (ProofBundle, ProofBundle) {
        let (a, b) = self.mint_proofs(amount);
        (a.into(), b.into())
    }

    fn burned(&mut self, amount: u128) {
        self.state.private_balance += amount;
    }

    fn minted(&mut self, amount: u128) {
        self.state.private_balance -= amount;
        self.state.public_balance += amount;
    }
}

/// Bootstrap `wallet`'s account with its current public balance and commitment
async fn bootstrap(ledger: &ShieldedLedger, wallet: &Wallet) {
    ledger
        .bootstrap(
            &OWNER,
            wallet.account(),
            wallet.state.public_balance,
            wallet.commitment(),
        )
        .await
        .unwrap();
}
