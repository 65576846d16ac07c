use std::time::Instant;

use super::*;
use crate::error::LedgerError;

fn slow(delay: Duration) -> VerifierSet {
    VerifierSet {
        balance_shift: Arc::new(SlowVerifier(delay)),
        commitment_transition: Arc::new(SlowVerifier(delay)),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shared_nullifier_is_consumed_once() {
    let ledger = Arc::new(ledger_with(mem_store(), slow(Duration::from_millis(50))));
    let first = Wallet::new(account(1), 11, 100);
    let second = Wallet::new(account(2), 22, 100);
    bootstrap(&ledger, &first).await;
    bootstrap(&ledger, &second).await;

    let a = first.burn_proof(10);
    let mut b = second.burn_proof(10);
    b.nullifier = a.nullifier;

    let h1 = tokio::spawn({
        let ledger = Arc::clone(&ledger);
        async move { ledger.burn(&BURNER, account(1), a.into()).await }
    });
    let h2 = tokio::spawn({
        let ledger = Arc::clone(&ledger);
        async move { ledger.burn(&BURNER, account(2), b.into()).await }
    });

    let results = [h1.await.unwrap(), h2.await.unwrap()];
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let replays = results
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::Replay(_))))
        .count();
    assert_eq!((ok, replays), (1, 1), "{results:?}");
    assert_eq!(ledger.nullifier_count().unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_burns_on_one_account_apply_once() {
    let ledger = Arc::new(ledger_with(mem_store(), slow(Duration::from_millis(50))));
    let wallet = Wallet::new(account(1), 99999, 100);
    bootstrap(&ledger, &wallet).await;

    let handles: Vec<_> = [40u128, 30]
        .into_iter()
        .map(|amount| {
            let ledger = Arc::clone(&ledger);
            let bundle = wallet.burn(amount);
            tokio::spawn(async move { ledger.burn(&BURNER, account(1), bundle).await })
        })
        .collect();

    let mut accepted = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(state) => accepted.push(state),
            Err(LedgerError::Replay(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(accepted.len(), 1);
    assert_eq!(ledger.get_balance(&account(1)).unwrap(), accepted[0]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn burn_and_mint_from_one_snapshot_commit_once() {
    // Both transitions pass their first phase before either verifies
    let verifiers = VerifierSet {
        balance_shift: Arc::new(RendezvousVerifier(std::sync::Barrier::new(2))),
        commitment_transition: Arc::new(DummyVerifier),
    };
    let ledger = Arc::new(ledger_with(mem_store(), verifiers));
    let mut wallet = Wallet::new(account(1), 99999, 100);
    wallet.state.private_balance = 40;
    bootstrap(&ledger, &wallet).await;

    let burn = wallet.burn(5);
    let (a, b) = wallet.mint(25);
    assert_ne!(
        burn.clone().into_balance_shift().unwrap().nullifier,
        a.clone().into_balance_shift().unwrap().nullifier
    );

    let burn = tokio::spawn({
        let ledger = Arc::clone(&ledger);
        async move { ledger.burn(&BURNER, account(1), burn).await }
    });
    let mint = tokio::spawn({
        let ledger = Arc::clone(&ledger);
        async move { ledger.mint(&MINTER, account(1), a, b).await }
    });

    let results = [burn.await.unwrap(), mint.await.unwrap()];
    let accepted: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    let stale = results
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::StaleState { .. })))
        .count();
    assert_eq!((accepted.len(), stale), (1, 1), "{results:?}");
    assert_eq!(ledger.get_balance(&account(1)).unwrap(), *accepted[0]);
    assert_eq!(ledger.nullifier_count().unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancelled_transition_leaves_no_state() {
    let store = mem_store();
    let wallet = Wallet::new(account(1), 99999, 100);
    let bundle = wallet.burn(40);

    {
        let ledger = ledger_with(Arc::clone(&store), slow(Duration::from_millis(300)));
        bootstrap(&ledger, &wallet).await;

        let outcome = tokio::time::timeout(
            Duration::from_millis(30),
            ledger.burn(&BURNER, wallet.account(), bundle.clone()),
        )
        .await;
        assert!(outcome.is_err(), "burn should still be verifying");

        // Let the orphaned verification finish
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(ledger.nullifier_count().unwrap(), 0);
        assert_eq!(
            ledger.get_balance(&wallet.account()).unwrap().private_commitment,
            wallet.commitment()
        );
    }

    let ledger = ledger_with(store, VerifierSet::dummy());
    ledger
        .burn(&BURNER, wallet.account(), bundle)
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn independent_accounts_verify_in_parallel() {
    let delay = Duration::from_millis(300);
    let ledger = Arc::new(ledger_with(mem_store(), slow(delay)));
    let wallets: Vec<Wallet> = (1..=4)
        .map(|i| Wallet::new(account(i), 1000 + i as u64, 50))
        .collect();
    for wallet in &wallets {
        bootstrap(&ledger, wallet).await;
    }

    let started = Instant::now();
    let handles: Vec<_> = wallets
        .iter()
        .map(|wallet| {
            let ledger = Arc::clone(&ledger);
            let id = wallet.account();
            let bundle = wallet.burn(5);
            tokio::spawn(async move { ledger.burn(&BURNER, id, bundle).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert!(
        started.elapsed() < delay * 3,
        "took {:?}",
        started.elapsed()
    );
    assert_eq!(ledger.nullifier_count().unwrap(), 4);
}
