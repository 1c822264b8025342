//! 锁存储接口
//!
//! 锁管理器只依赖这两个原语，互斥性完全由存储的原子性保证。

use async_trait::async_trait;
use std::time::Duration;
use worker_lock_shared::error::Result;

/// 锁存储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LockStore: Send + Sync {
    /// 仅当 key 不存在时写入 value 并设置过期时间
    ///
    /// 返回 true 表示写入成功，false 表示 key 已存在。
    async fn set_if_absent(&self, key: &str, value: i64, ttl: Duration) -> Result<bool>;

    /// 读取 key 的剩余存活时间
    ///
    /// key 不存在或没有过期时间时返回 None。
    async fn time_to_live(&self, key: &str) -> Result<Option<Duration>>;
}
