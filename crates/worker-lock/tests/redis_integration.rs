//! Redis 集成测试
//!
//! 需要可用的 Redis 实例，默认 127.0.0.1:6379，可通过 TEST_REDIS_ADDR 覆盖。
//! 运行方式：`cargo test -p worker-lock --test redis_integration -- --ignored`

use std::time::Duration;

use uuid::Uuid;
use worker_lock::{LockError, LockManager, LockStore, RedisLockStore, expires_in};
use worker_lock::lock::parse_addresses;

fn redis_addr() -> String {
    std::env::var("TEST_REDIS_ADDR").unwrap_or_else(|_| "127.0.0.1:6379".to_string())
}

fn test_key() -> String {
    format!("test:lock:{}", Uuid::new_v4())
}

fn manager(retries: i32) -> LockManager {
    LockManager::new(None, vec![redis_addr()], 1, retries).expect("valid redis config")
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_redis_lock_contention() {
    let key = test_key();
    let first = manager(1);
    let second = manager(1);
    let expires_at = expires_in(Duration::from_secs(5));

    first.lock(&key, expires_at).await.expect("first lock");

    match second.lock(&key, expires_at).await {
        Err(LockError::Contended { ttl, .. }) => {
            let ttl = ttl.expect("lock key has a ttl");
            assert!(ttl <= Duration::from_secs(5));
        }
        other => panic!("expected contention, got {other:?}"),
    }
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_redis_lock_expires() {
    let key = test_key();
    let manager = manager(1);

    manager
        .lock(&key, expires_in(Duration::from_millis(200)))
        .await
        .expect("first lock");

    tokio::time::sleep(Duration::from_millis(400)).await;

    manager
        .lock(&key, expires_in(Duration::from_secs(1)))
        .await
        .expect("lock should be free after expiry");
}

#[tokio::test]
#[ignore = "requires a running Redis"]
async fn test_redis_store_primitives() {
    let key = test_key();
    let store = RedisLockStore::new(parse_addresses(vec![redis_addr()]), 1, None)
        .expect("redis store");

    assert_eq!(store.time_to_live(&key).await.expect("pttl"), None);
    assert!(store.set_if_absent(&key, 42, Duration::from_secs(5)).await.expect("set nx"));
    assert!(!store.set_if_absent(&key, 43, Duration::from_secs(5)).await.expect("set nx"));

    let ttl = store.time_to_live(&key).await.expect("pttl").expect("ttl set");
    assert!(ttl <= Duration::from_secs(5));
}
