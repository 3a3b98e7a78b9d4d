//! Integration test: batched expiration purge against an instrumented store
//!
//! Verifies round counting, termination, idempotence, batch atomicity under
//! injected commit failures, and the optional time budget.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{seed, FixedClock, ProbeStore};
use zbin_store::{
    DocumentStore, ExpiredQuery, PurgeError, PurgeOptions, PurgeReport, Purger, StoreError,
};

const NOW: i64 = 1_700_000_000_000;

fn purger(store: &ProbeStore, options: PurgeOptions) -> Purger {
    Purger::new(Arc::new(store.clone()), options).with_clock(Arc::new(FixedClock(NOW)))
}

async fn expired_left(store: &ProbeStore) -> usize {
    store
        .inner
        .query_expired(ExpiredQuery {
            before_ms: NOW,
            limit: usize::MAX,
        })
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn purge_rounds_are_ceil_n_over_page() {
    for (expired, rounds) in [(0usize, 0usize), (1, 1), (99, 1), (100, 1), (101, 2), (250, 3), (1000, 10)] {
        let store = ProbeStore::new();
        seed(&store.inner, "x", expired, NOW - 1).await;
        seed(&store.inner, "l", 5, NOW + 1).await;

        let report = purger(&store, PurgeOptions::default()).purge().await.unwrap();

        assert_eq!(report, PurgeReport { rounds, deleted: expired }, "N = {expired}");
        assert_eq!(store.commits(), rounds, "one batch commit per round");
        assert_eq!(store.queries(), rounds + 1, "plus one terminal empty query");
        assert_eq!(expired_left(&store).await, 0);
        assert_eq!(store.inner.len().await, 5, "live documents untouched");
    }
}

#[tokio::test]
async fn purge_expiry_is_strict() {
    let store = ProbeStore::new();
    seed(&store.inner, "edge", 3, NOW).await;

    let report = purger(&store, PurgeOptions::default()).purge().await.unwrap();
    assert_eq!(report.deleted, 0, "expires == now is not yet expired");
    assert_eq!(store.inner.len().await, 3);
}

#[tokio::test]
async fn purge_is_idempotent() {
    let store = ProbeStore::new();
    seed(&store.inner, "x", 150, NOW - 10).await;
    seed(&store.inner, "l", 20, NOW + 10).await;
    let purger = purger(&store, PurgeOptions::default());

    let first = purger.purge().await.unwrap();
    assert_eq!(first.deleted, 150);
    let commits_after_first = store.commits();

    let second = purger.purge().await.unwrap();
    assert_eq!(second, PurgeReport::default());
    assert_eq!(store.commits(), commits_after_first, "no batch on the second run");
    assert_eq!(store.inner.len().await, 20);
}

#[tokio::test]
async fn purge_custom_page_size() {
    let store = ProbeStore::new();
    seed(&store.inner, "x", 25, NOW - 1).await;

    let report = purger(
        &store,
        PurgeOptions {
            page_size: 10,
            timeout: None,
        },
    )
    .purge()
    .await
    .unwrap();

    assert_eq!(report, PurgeReport { rounds: 3, deleted: 25 });
}

#[tokio::test]
async fn failed_commit_aborts_and_keeps_earlier_batches() {
    let store = ProbeStore {
        fail_commit: Some(2),
        ..ProbeStore::new()
    };
    seed(&store.inner, "x", 250, NOW - 1).await;

    let err = purger(&store, PurgeOptions::default())
        .purge()
        .await
        .unwrap_err();
    assert!(
        matches!(err, PurgeError::Store(StoreError::Unavailable(_))),
        "store error must surface: {err}"
    );

    // round 1 committed, round 2 rejected as a unit, round 3 never ran
    assert_eq!(store.commits(), 2);
    assert_eq!(store.inner.len().await, 150);
    assert!(store.inner.get("x000000").await.unwrap().is_none());
    assert!(store.inner.get("x000100").await.unwrap().is_some());
    assert!(store.inner.get("x000199").await.unwrap().is_some());

    // re-running on a healthy store finishes the job
    let healthy = ProbeStore {
        inner: store.inner.clone(),
        ..ProbeStore::new()
    };
    let report = purger(&healthy, PurgeOptions::default()).purge().await.unwrap();
    assert_eq!(report, PurgeReport { rounds: 2, deleted: 150 });
    assert!(store.inner.is_empty().await);
}

#[tokio::test]
async fn failed_query_aborts() {
    let store = ProbeStore {
        fail_query: true,
        ..ProbeStore::new()
    };
    seed(&store.inner, "x", 10, NOW - 1).await;

    let err = purger(&store, PurgeOptions::default())
        .purge()
        .await
        .unwrap_err();
    assert!(matches!(err, PurgeError::Store(_)));
    assert_eq!(store.commits(), 0);
    assert_eq!(store.inner.len().await, 10);
}

#[tokio::test]
async fn timeout_budget_stops_slow_purge() {
    let store = ProbeStore {
        query_delay: Some(Duration::from_millis(200)),
        ..ProbeStore::new()
    };
    seed(&store.inner, "x", 10, NOW - 1).await;

    let err = purger(
        &store,
        PurgeOptions {
            page_size: 100,
            timeout: Some(Duration::from_millis(20)),
        },
    )
    .purge()
    .await
    .unwrap_err();

    match err {
        PurgeError::TimedOut(report) => assert_eq!(report, PurgeReport::default()),
        other => panic!("expected timeout, got {other}"),
    }
    assert_eq!(store.commits(), 0);
    assert_eq!(store.inner.len().await, 10);
}

#[tokio::test]
async fn concurrent_purges_are_safe() {
    let store = ProbeStore::new();
    seed(&store.inner, "x", 500, NOW - 1).await;

    let a = purger(&store, PurgeOptions::default());
    let b = purger(&store, PurgeOptions::default());
    let (ra, rb) = tokio::join!(a.purge(), b.purge());

    let (ra, rb) = (ra.unwrap(), rb.unwrap());
    assert!(ra.deleted + rb.deleted >= 500);
    assert_eq!(expired_left(&store).await, 0);
    assert!(store.inner.is_empty().await);
}
