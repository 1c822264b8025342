//! 统一可观测性模块
//!
//! 提供 logging 与 metrics 的统一初始化。锁库本身只通过 `tracing` 和
//! `metrics` 宏输出，宿主进程通过本模块安装订阅者。

pub mod metrics;
pub mod tracing;

use crate::config::ObservabilityConfig;
use ::tracing::info;
use anyhow::Result;

/// 统一初始化可观测性
///
/// # Example
///
/// ```ignore
/// use worker_lock_shared::config::AppConfig;
/// use worker_lock_shared::observability;
///
/// let config = AppConfig::load("report-worker")?;
/// observability::init(&config.service_name, &config.observability)?;
/// ```
pub fn init(service_name: &str, config: &ObservabilityConfig) -> Result<()> {
    tracing::init(config)?;
    metrics::describe_lock_metrics();

    info!(
        service = %service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Observability initialized"
    );

    Ok(())
}
