//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "WORKER_LOCK";

/// Redis 配置
///
/// `addrs` 的第一个地址可以携带 `password@host:port` 形式的凭证；
/// 配置了 `master_name` 时，地址列表被视为哨兵地址。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub addrs: Vec<String>,
    pub db: i64,
    pub master_name: Option<String>,
}

impl RedisConfig {
    /// 配置的主节点名称，空字符串视为未配置
    pub fn master_name(&self) -> Option<&str> {
        self.master_name.as_deref().filter(|name| !name.is_empty())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            addrs: vec!["127.0.0.1:6379".to_string()],
            db: 0,
            master_name: None,
        }
    }
}

/// 锁配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// 最大重试次数（不含首次尝试），小于等于 0 时锁不可用
    pub max_retries: i32,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// 是否输出 JSON 格式日志
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub redis: RedisConfig,
    pub lock: LockConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（WORKER_LOCK_ 前缀，`__` 分隔层级，
    ///    如 WORKER_LOCK_LOCK__MAX_RETRIES -> lock.max_retries）
    pub fn load(service_name: &str) -> Result<Self> {
        let env = std::env::var("WORKER_LOCK_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            // WORKER_LOCK_REDIS__ADDRS=a:6379,b:6379 -> redis.addrs
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("redis.addrs")
                    .try_parsing(true),
            );

        Ok(builder.build()?.try_deserialize()?)
    }
}
