//! 基于共享键值存储的分布式互斥锁
//!
//! 多个工作进程通过同一个 Redis 协调对命名资源的访问，不需要中心协调进程。
//!
//! ## 核心功能
//!
//! - **单次获取**：`LockManager::lock`，原子地写入锁 key，失败时报告竞争
//! - **重试获取**：`LockManager::lock_with_retries`，最多尝试 `retries + 1` 次
//! - **过期释放**：锁没有显式释放，由存储在 TTL 到期时删除
//!
//! ## 已知限制
//!
//! 没有续期和心跳：临界区执行时间超过锁的 TTL 时，锁会静默丢失，
//! 其他调用方可以再次获取。
//!
//! ## 模块结构
//!
//! - `lock`: 锁管理器与存储实现

pub mod lock;

pub use lock::{
    LockManager, LockStore, MemoryLockStore, RedisLockStore, expires_in, now_nanos,
};
pub use worker_lock_shared::error::{FailureKind, LockError, Result};
