//! 进程内锁存储
//!
//! 与 Redis 存储相同的原子性与过期语义，用于测试和单进程部署。
//! 过期时间基于 tokio 时钟，因此可以在暂停时间的测试中推进。

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use worker_lock_shared::error::Result;

use super::store::LockStore;

struct Entry {
    value: i64,
    expires_at: Instant,
}

/// 进程内锁存储
#[derive(Default)]
pub struct MemoryLockStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取未过期 key 的值
    pub fn value(&self, key: &str) -> Option<i64> {
        let now = Instant::now();
        self.entries
            .lock()
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value)
    }

    /// 未过期 key 的数量
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LockStore for MemoryLockStore {
    async fn set_if_absent(&self, key: &str, value: i64, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        // 顺带清理所有已过期的 key，内存只随存活的锁增长
        entries.retain(|_, entry| entry.expires_at > now);
        if entries.contains_key(key) {
            return Ok(false);
        }

        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn time_to_live(&self, key: &str) -> Result<Option<Duration>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.expires_at - now)),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_set_if_absent_is_exclusive() {
        let store = MemoryLockStore::new();

        assert!(store.set_if_absent("job:1", 7, Duration::from_secs(5)).await.unwrap());
        assert!(!store.set_if_absent("job:1", 8, Duration::from_secs(5)).await.unwrap());
        assert_eq!(store.value("job:1"), Some(7));
        assert!(store.set_if_absent("job:2", 9, Duration::from_secs(5)).await.unwrap());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires() {
        let store = MemoryLockStore::new();
        store.set_if_absent("job:1", 1, Duration::from_secs(2)).await.unwrap();

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(
            store.time_to_live("job:1").await.unwrap(),
            Some(Duration::from_secs(1))
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.time_to_live("job:1").await.unwrap(), None);
        assert!(store.is_empty());
        assert!(store.set_if_absent("job:1", 2, Duration::from_secs(2)).await.unwrap());
        assert_eq!(store.value("job:1"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entries_are_pruned_on_insert() {
        let store = MemoryLockStore::new();
        for i in 0..1000 {
            let key = format!("job:{}", i);
            store.set_if_absent(&key, i, Duration::from_millis(10)).await.unwrap();
        }
        assert_eq!(store.entries.lock().len(), 1000);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store.set_if_absent("job:next", 1, Duration::from_secs(5)).await.unwrap());

        assert_eq!(store.entries.lock().len(), 1);
        assert_eq!(store.value("job:next"), Some(1));
    }

    #[tokio::test]
    async fn test_time_to_live_missing_key() {
        let store = MemoryLockStore::new();
        assert_eq!(store.time_to_live("missing").await.unwrap(), None);
    }
}
