//! Concurrent redemption tests.
//!
//! The one real concurrency hazard in the subsystem: the capacity check
//! and the redemption insert must be one atomic unit per grant. These
//! tests hammer a single grant from many tasks and assert the exact
//! success/failure split on both backends.

use grantkit::{GrantService, GrantServiceConfig, ServiceError};
use grantkit_core::GrantSpec;
use grantkit_store::{GrantStore, MemoryStore, SqliteStore};

async fn redeem_race<S: GrantStore + 'static>(
    service: GrantService<S>,
    code: &str,
    users: Vec<String>,
) -> (u32, u32, u32) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let mut handles = Vec::new();
    for user in users {
        let service = service.clone();
        let code = code.to_string();
        handles.push(tokio::spawn(async move {
            service.redeem_grant(&code, user).await
        }));
    }

    let (mut ok, mut capacity, mut duplicate) = (0u32, 0u32, 0u32);
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => ok += 1,
            Err(ServiceError::CapacityExceeded { .. }) => capacity += 1,
            Err(ServiceError::AlreadyRedeemed) => duplicate += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    (ok, capacity, duplicate)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn capacity_holds_under_concurrent_redeemers_memory() {
    let service = GrantService::new(MemoryStore::new(), GrantServiceConfig::default());
    let grant = service
        .create_grant(GrantSpec::organizational("admin", "Acme Care").with_max_redemptions(2))
        .await
        .unwrap();

    let users = (0..8).map(|i| format!("user-{i}")).collect();
    let (ok, capacity, duplicate) = redeem_race(service.clone(), &grant.code, users).await;

    assert_eq!(ok, 2);
    assert_eq!(capacity, 6);
    assert_eq!(duplicate, 0);
    assert_eq!(
        service
            .store()
            .count_active_redemptions(&grant.id)
            .await
            .unwrap(),
        2
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn capacity_holds_under_concurrent_redeemers_sqlite() {
    let service = GrantService::new(
        SqliteStore::open_memory().unwrap(),
        GrantServiceConfig::default(),
    );
    let grant = service
        .create_grant(GrantSpec::organizational("admin", "Acme Care").with_max_redemptions(3))
        .await
        .unwrap();

    let users = (0..12).map(|i| format!("user-{i}")).collect();
    let (ok, capacity, duplicate) = redeem_race(service.clone(), &grant.code, users).await;

    assert_eq!(ok, 3);
    assert_eq!(capacity, 9);
    assert_eq!(duplicate, 0);
    assert_eq!(
        service
            .store()
            .count_active_redemptions(&grant.id)
            .await
            .unwrap(),
        3
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn same_user_concurrent_redeem_yields_one_seat() {
    let service = GrantService::new(
        SqliteStore::open_memory().unwrap(),
        GrantServiceConfig::default(),
    );
    let grant = service
        .create_grant(GrantSpec::organizational("admin", "Acme Care"))
        .await
        .unwrap();

    let users = vec!["same-user".to_string(); 4];
    let (ok, capacity, duplicate) = redeem_race(service.clone(), &grant.code, users).await;

    assert_eq!(ok, 1);
    assert_eq!(duplicate, 3);
    assert_eq!(capacity, 0);
    assert_eq!(
        service
            .store()
            .count_active_redemptions(&grant.id)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn unlimited_grant_accepts_all_concurrent_redeemers() {
    let service = GrantService::new(MemoryStore::new(), GrantServiceConfig::default());
    let grant = service
        .create_grant(GrantSpec::organizational("admin", "Acme Care"))
        .await
        .unwrap();

    let users = (0..100).map(|i| format!("user-{i}")).collect();
    let (ok, capacity, duplicate) = redeem_race(service.clone(), &grant.code, users).await;

    assert_eq!(ok, 100);
    assert_eq!(capacity, 0);
    assert_eq!(duplicate, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn personal_grant_single_seat_under_race() {
    let service = GrantService::new(
        SqliteStore::open_memory().unwrap(),
        GrantServiceConfig::default(),
    );
    let grant = service
        .create_grant(GrantSpec::personal(
            "carer",
            "recipient",
            ["view_progress".to_string()],
        ))
        .await
        .unwrap();

    let users = (0..4).map(|i| format!("claimant-{i}")).collect();
    let (ok, capacity, duplicate) = redeem_race(service.clone(), &grant.code, users).await;

    assert_eq!(ok, 1);
    assert_eq!(capacity, 3);
    assert_eq!(duplicate, 0);
}
