//! Unit tests for the connection pool.
//!
//! Run with: cargo test --test pool_unit_test

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use weather_db::db::DbPool;

fn mock_connections(n: usize) -> Vec<DatabaseConnection> {
    (0..n)
        .map(|_| MockDatabase::new(DatabaseBackend::Postgres).into_connection())
        .collect()
}

#[tokio::test]
async fn handles_never_exceed_pool_size() {
    const POOL_SIZE: usize = 2;
    const WORKERS: usize = 8;

    let pool = Arc::new(DbPool::new(mock_connections(POOL_SIZE)));
    let in_use = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::with_capacity(WORKERS);
    for _ in 0..WORKERS {
        let pool = Arc::clone(&pool);
        let in_use = Arc::clone(&in_use);
        let peak = Arc::clone(&peak);
        handles.push(tokio::spawn(async move {
            let conn = pool.acquire().await;
            let now = in_use.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            in_use.fetch_sub(1, Ordering::SeqCst);
            drop(conn);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) <= POOL_SIZE);
    assert_eq!(in_use.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn no_waiter_starves_under_contention() {
    const POOL_SIZE: usize = 1;
    const WORKERS: usize = 16;

    let pool = Arc::new(DbPool::new(mock_connections(POOL_SIZE)));
    let served = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::with_capacity(WORKERS);
    for _ in 0..WORKERS {
        let pool = Arc::clone(&pool);
        let served = Arc::clone(&served);
        handles.push(tokio::spawn(async move {
            let _conn = pool.acquire().await;
            served.fetch_add(1, Ordering::SeqCst);
        }));
    }

    // Every worker must complete; a lost wakeup would hang the join and
    // trip the timeout.
    tokio::time::timeout(Duration::from_secs(5), async {
        for handle in handles {
            handle.await.unwrap();
        }
    })
    .await
    .expect("acquirers starved");

    assert_eq!(served.load(Ordering::SeqCst), WORKERS);
}

#[tokio::test]
async fn released_slots_are_reusable() {
    let pool = DbPool::new(mock_connections(2));
    assert_eq!(pool.size(), 2);

    let first = pool.acquire().await;
    let second = pool.acquire().await;
    drop(first);
    drop(second);

    // Both slots must be back; two more acquisitions complete immediately.
    let _third = pool.acquire().await;
    let _fourth = pool.acquire().await;
}
