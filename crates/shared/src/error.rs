//! 统一错误处理模块
//!
//! 定义锁获取流程中所有共享的错误类型，使用 thiserror 提供良好的错误信息。

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// 单次获取失败的类别
///
/// 重试耗尽时只保留最后一次失败的类别，不保留原始错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 锁被其他调用方持有
    Contention,
    /// 与存储通信失败
    Store,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contention => f.write_str("contention"),
            Self::Store => f.write_str("store"),
        }
    }
}

/// 锁错误类型
#[derive(Debug, Error)]
pub enum LockError {
    // ==================== 存储错误 ====================
    #[error("Redis 错误: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("存储错误: {0}")]
    Store(String),

    // ==================== 锁竞争错误 ====================
    #[error("锁已被持有: key={key}, ttl={ttl:?}")]
    Contended { key: String, ttl: Option<Duration> },

    #[error("获取锁失败: key={key}, 共尝试 {attempts} 次, 最后一次失败类型={last_failure}")]
    RetriesExhausted {
        key: String,
        attempts: u32,
        last_failure: FailureKind,
    },

    #[error("锁过期时间不在未来: key={key}, expires_at_nanos={expires_at_nanos}")]
    InvalidExpiration { key: String, expires_at_nanos: i64 },

    // ==================== 配置错误 ====================
    #[error("无效的锁配置: {0}")]
    InvalidConfig(String),

    #[error("锁管理器未启用")]
    Disabled,

    #[error("配置加载失败: {0}")]
    Config(#[from] config::ConfigError),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, LockError>;

impl LockError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Redis(_) => "REDIS_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::Contended { .. } => "LOCK_CONTENDED",
            Self::RetriesExhausted { .. } => "LOCK_FAILED",
            Self::InvalidExpiration { .. } => "INVALID_EXPIRATION",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Disabled => "LOCK_DISABLED",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// 是否为可重试错误
    ///
    /// 存储通信失败和锁竞争都可能在下一次尝试时消失。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Redis(_) | Self::Store(_) | Self::Contended { .. }
        )
    }

    /// 单次获取失败的类别，非单次获取错误返回 None
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Contended { .. } => Some(FailureKind::Contention),
            Self::Redis(_) | Self::Store(_) => Some(FailureKind::Store),
            _ => None,
        }
    }

    /// 是否为锁竞争错误
    pub fn is_contended(&self) -> bool {
        matches!(self, Self::Contended { .. })
    }
}
