//! 分布式锁管理器
//!
//! 基于共享存储的原子 SET NX 实现互斥，锁只通过 TTL 过期释放。

use std::sync::Arc;
use tracing::{debug, instrument, warn};
use worker_lock_shared::config::{AppConfig, RedisConfig};
use worker_lock_shared::error::{FailureKind, LockError, Result};
use worker_lock_shared::observability::metrics::{
    OUTCOME_ACQUIRED, OUTCOME_CONTENDED, OUTCOME_ERROR, record_attempt, record_exhausted,
};

use super::address::parse_addresses;
use super::backoff::random_backoff;
use super::clock::{now_nanos, ttl_until};
use super::redis_store::RedisLockStore;
use super::store::LockStore;

/// 分布式锁管理器
///
/// 持有一个共享的存储句柄，可以被多个任务并发使用；
/// 互斥性完全由存储的原子操作保证，管理器本身没有锁。
///
/// 不提供续期：临界区执行时间超过 TTL 时锁会静默丢失。
#[derive(Clone)]
pub struct LockManager {
    /// 为 None 时管理器处于未启用状态
    store: Option<Arc<dyn LockStore>>,
    retries: u32,
}

impl LockManager {
    /// 创建基于 Redis 的锁管理器
    ///
    /// # Arguments
    /// - `redis`: Redis 配置（可选，只读取其中的主节点名称）
    /// - `addrs`: Redis 地址列表，第一个地址可携带 `password@` 凭证
    /// - `db`: 逻辑数据库编号
    /// - `max_retries`: 最大重试次数，必须大于 0
    pub fn new(
        redis: Option<&RedisConfig>,
        addrs: Vec<String>,
        db: i64,
        max_retries: i32,
    ) -> Result<Self> {
        let retries = validate_retries(max_retries)?;
        let master_name = redis.and_then(RedisConfig::master_name);
        let store = RedisLockStore::new(parse_addresses(addrs), db, master_name)?;

        Ok(Self {
            store: Some(Arc::new(store)),
            retries,
        })
    }

    /// 创建锁管理器，配置不可用时返回未启用的管理器
    ///
    /// 未启用的管理器所有获取操作都立即返回 `LockError::Disabled`。
    /// 依赖互斥性的调用方应使用 [`LockManager::new`]。
    pub fn new_or_inert(
        redis: Option<&RedisConfig>,
        addrs: Vec<String>,
        db: i64,
        max_retries: i32,
    ) -> Self {
        match Self::new(redis, addrs, db, max_retries) {
            Ok(manager) => manager,
            Err(e) => {
                warn!(error = %e, "Lock manager disabled, acquisitions will always fail");
                Self::inert()
            }
        }
    }

    /// 从应用配置创建锁管理器
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            Some(&config.redis),
            config.redis.addrs.clone(),
            config.redis.db,
            config.lock.max_retries,
        )
    }

    /// 使用任意存储实现创建锁管理器
    pub fn with_store(store: Arc<dyn LockStore>, max_retries: i32) -> Result<Self> {
        Ok(Self {
            store: Some(store),
            retries: validate_retries(max_retries)?,
        })
    }

    /// 未启用的锁管理器
    pub fn inert() -> Self {
        Self {
            store: None,
            retries: 0,
        }
    }

    /// 是否绑定了存储
    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// 最大重试次数
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// 单次尝试获取锁
    ///
    /// # Arguments
    /// - `key`: 锁的唯一标识
    /// - `expires_at_nanos`: 锁的过期时间戳（Unix 纳秒），同时作为锁的值写入
    ///
    /// 锁已被持有时返回 `LockError::Contended`，存储错误原样返回。
    #[instrument(skip(self))]
    pub async fn lock(&self, key: &str, expires_at_nanos: i64) -> Result<()> {
        let store = self.store.as_deref().ok_or(LockError::Disabled)?;
        try_lock(store, key, expires_at_nanos).await
    }

    /// 带重试的获取锁
    ///
    /// 最多尝试 `retries + 1` 次，两次尝试之间随机等待 0 到 4 秒。
    /// 全部失败后返回 `LockError::RetriesExhausted`，只保留最后一次失败的类别。
    /// 调用时过期时间已过返回 `LockError::InvalidExpiration`；
    /// 过期时间在重试期间到达时提前结束，`attempts` 为实际执行的次数。
    #[instrument(skip(self), fields(retries = self.retries))]
    pub async fn lock_with_retries(&self, key: &str, expires_at_nanos: i64) -> Result<()> {
        let store = self.store.as_deref().ok_or(LockError::Disabled)?;
        let mut last_failure = FailureKind::Contention;
        let mut attempts = 0;

        for attempt in 0..=self.retries {
            match try_lock(store, key, expires_at_nanos).await {
                Ok(()) => {
                    if attempt > 0 {
                        debug!(key = %key, attempt, "Lock acquired after retries");
                    }
                    return Ok(());
                }
                Err(e) if e.is_retryable() => {
                    debug!(key = %key, attempt, error = %e, "Lock attempt failed");
                    if let Some(kind) = e.failure_kind() {
                        last_failure = kind;
                    }
                    attempts = attempt + 1;
                }
                // 调用时过期时间已过，重试没有意义
                Err(e) if attempt == 0 => return Err(e),
                // 退避期间过期时间已过，按已执行的尝试次数结束
                Err(e) => {
                    debug!(key = %key, attempt, error = %e, "Lock expired while retrying");
                    break;
                }
            }

            if attempt < self.retries {
                let delay = random_backoff();
                debug!(key = %key, attempt, delay_secs = delay.as_secs(), "Retrying lock");
                tokio::time::sleep(delay).await;
            }
        }

        record_exhausted();
        warn!(
            key = %key,
            attempts,
            last_failure = %last_failure,
            "Failed to acquire lock"
        );
        Err(LockError::RetriesExhausted {
            key: key.to_string(),
            attempts,
            last_failure,
        })
    }
}

fn validate_retries(max_retries: i32) -> Result<u32> {
    u32::try_from(max_retries)
        .ok()
        .filter(|retries| *retries > 0)
        .ok_or_else(|| {
            LockError::InvalidConfig(format!(
                "max_retries must be positive, got {}",
                max_retries
            ))
        })
}

async fn try_lock(store: &dyn LockStore, key: &str, expires_at_nanos: i64) -> Result<()> {
    let ttl = ttl_until(expires_at_nanos, now_nanos()).ok_or_else(|| {
        LockError::InvalidExpiration {
            key: key.to_string(),
            expires_at_nanos,
        }
    })?;

    let acquired = match store.set_if_absent(key, expires_at_nanos, ttl).await {
        Ok(acquired) => acquired,
        Err(e) => {
            record_attempt(OUTCOME_ERROR);
            return Err(e);
        }
    };

    if acquired {
        record_attempt(OUTCOME_ACQUIRED);
        debug!(key = %key, ttl = ?ttl, "Lock acquired");
        return Ok(());
    }

    record_attempt(OUTCOME_CONTENDED);
    let remaining = store.time_to_live(key).await?;
    debug!(
        key = %key,
        ttl = ?remaining,
        "Lock held by another owner"
    );

    Err(LockError::Contended {
        key: key.to_string(),
        ttl: remaining,
    })
}
