//! 分布式锁模块
//!
//! 以共享键值存储中的一个 key 表示一把锁。
//!
//! ## 设计理念
//!
//! - **原子获取**: `SET key value NX PX ttl`，存储的原子性是唯一的同步点
//! - **过期释放**: 不提供解锁，持有者崩溃后锁在 TTL 到期时自动消失
//! - **随机退避**: 竞争失败后随机等待 0 到 4 秒再重试
//!
//! ## 使用示例
//!
//! ```ignore
//! let manager = LockManager::new(None, vec!["secret@127.0.0.1:6379".into()], 0, 3)?;
//!
//! // 锁的有效期到 30 秒后
//! let expires_at = expires_in(Duration::from_secs(30));
//! manager.lock_with_retries("job:42", expires_at).await?;
//!
//! // 临界区必须在过期前完成，锁不会续期
//! do_critical_work().await?;
//! ```

mod address;
mod backoff;
mod clock;
mod lock_manager;
mod memory_store;
mod redis_store;
mod store;

pub use address::{StoreAddresses, connection_url, parse_addresses};
pub use backoff::{BACKOFF_SECS_EXCLUSIVE, random_backoff};
pub use clock::{expires_in, now_nanos, ttl_until};
pub use lock_manager::LockManager;
pub use memory_store::MemoryLockStore;
pub use redis_store::RedisLockStore;
pub use store::LockStore;
