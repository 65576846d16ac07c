use tempfile::TempDir;

use super::*;
use crate::storage::{AccountState, LedgerWrite, RocksDbStore};
use shade_privacy::Nullifier;

/// Create a temporary DB for each test; the dir must outlive the store
fn temp_db() -> (TempDir, RocksDbStore) {
    let dir = TempDir::new().unwrap();
    let db = RocksDbStore::open(dir.path()).unwrap();
    (dir, db)
}

fn write(id: u8, public_balance: u128, nullifier: Option<u64>) -> LedgerWrite {
    LedgerWrite {
        account: account(id),
        state: AccountState {
            public_balance,
            private_commitment: FieldElement::from_u64(public_balance as u64 + 1),
        },
        nullifier: nullifier.map(|n| Nullifier(FieldElement::from_u64(n))),
    }
}

#[test]
fn commit_and_get_account_state() {
    let (_dir, db) = temp_db();
    let w = write(1, 100, Some(7));

    db.commit(&w).unwrap();

    assert_eq!(db.get_account(&account(1)).unwrap(), Some(w.state));
    assert_eq!(db.nullifiers().unwrap(), vec![Nullifier(FieldElement::from_u64(7))]);
}

#[test]
fn missing_account_returns_none() {
    let (_dir, db) = temp_db();
    assert_eq!(db.get_account(&account(42)).unwrap(), None);
    assert!(db.nullifiers().unwrap().is_empty());
}

#[test]
fn account_state_overwrite_works() {
    let (_dir, db) = temp_db();
    db.commit(&write(1, 10, None)).unwrap();
    db.commit(&write(1, 50, Some(1))).unwrap();

    let st = db.get_account(&account(1)).unwrap().unwrap();
    assert_eq!(st.public_balance, 50);
    assert_eq!(st.private_commitment, FieldElement::from_u64(51));
}

#[test]
fn nullifiers_accumulate() {
    let (_dir, db) = temp_db();
    db.commit(&write(1, 10, Some(1))).unwrap();
    db.commit(&write(2, 20, Some(2))).unwrap();
    db.commit(&write(1, 30, None)).unwrap();

    let mut all = db.nullifiers().unwrap();
    all.sort();
    assert_eq!(
        all,
        vec![
            Nullifier(FieldElement::from_u64(1)),
            Nullifier(FieldElement::from_u64(2)),
        ]
    );
}

#[test]
fn role_bindings_roundtrip() {
    let (_dir, db) = temp_db();
    db.put_role(ControllerRole::Burn, Some(BURNER)).unwrap();
    db.put_role(ControllerRole::Mint, Some(MINTER)).unwrap();
    db.put_role(ControllerRole::Mint, None).unwrap();

    assert_eq!(db.roles().unwrap(), vec![(ControllerRole::Burn, BURNER)]);
}

#[test]
fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let db = RocksDbStore::open(dir.path()).unwrap();
        db.commit(&write(3, 99, Some(5))).unwrap();
        db.put_role(ControllerRole::Mint, Some(MINTER)).unwrap();
        db.flush().unwrap();
    }

    let db = RocksDbStore::open(dir.path()).unwrap();
    assert_eq!(
        db.get_account(&account(3)).unwrap().map(|s| s.public_balance),
        Some(99)
    );
    assert_eq!(db.nullifiers().unwrap().len(), 1);
    assert_eq!(db.roles().unwrap(), vec![(ControllerRole::Mint, MINTER)]);
}

#[tokio::test]
async fn ledger_reloads_from_disk() {
    let dir = TempDir::new().unwrap();
    let mut wallet = Wallet::new(account(1), 4242, 100);
    let burn = wallet.burn(30);

    {
        let store: Arc<dyn LedgerStore> = Arc::new(RocksDbStore::open(dir.path()).unwrap());
        let ledger = ledger_with(store, VerifierSet::dummy());
        bootstrap(&ledger, &wallet).await;
        ledger
            .burn(&BURNER, wallet.account(), burn.clone())
            .await
            .unwrap();
        wallet.burned(30);
        ledger.flush().unwrap();
    }

    let store: Arc<dyn LedgerStore> = Arc::new(RocksDbStore::open(dir.path()).unwrap());
    let ledger = ShieldedLedger::open(store, OWNER, VerifierSet::dummy()).unwrap();

    assert_eq!(ledger.role(ControllerRole::Burn).unwrap(), RoleSlot::Bound(BURNER));
    assert_eq!(ledger.nullifier_count().unwrap(), 1);
    let state = ledger.get_balance(&wallet.account()).unwrap();
    assert_eq!(state.public_balance, 100);
    assert_eq!(state.private_commitment, wallet.commitment());

    let err = ledger
        .burn(&BURNER, wallet.account(), burn)
        .await
        .unwrap_err();
    assert!(matches!(err, crate::error::LedgerError::Replay(_)));
}
