//! 锁指标定义
//!
//! 基于 metrics crate 记录。宿主未安装 recorder 时所有记录都是空操作。

/// 单次获取尝试计数，按 outcome 标签区分结果
pub const LOCK_ATTEMPTS_TOTAL: &str = "lock_attempts_total";

/// 重试耗尽次数
pub const LOCK_RETRIES_EXHAUSTED_TOTAL: &str = "lock_retries_exhausted_total";

/// 获取成功
pub const OUTCOME_ACQUIRED: &str = "acquired";
/// 锁已被持有
pub const OUTCOME_CONTENDED: &str = "contended";
/// 存储通信失败
pub const OUTCOME_ERROR: &str = "error";

/// 注册锁指标的描述信息
///
/// 这些描述会出现在导出端点的 HELP 注释中。
pub fn describe_lock_metrics() {
    metrics::describe_counter!(
        LOCK_ATTEMPTS_TOTAL,
        "Total number of single lock acquisition attempts"
    );
    metrics::describe_counter!(
        LOCK_RETRIES_EXHAUSTED_TOTAL,
        "Total number of retrying acquisitions that gave up"
    );
}

/// 记录一次获取尝试
pub fn record_attempt(outcome: &'static str) {
    metrics::counter!(LOCK_ATTEMPTS_TOTAL, "outcome" => outcome).increment(1);
}

/// 记录一次重试耗尽
pub fn record_exhausted() {
    metrics::counter!(LOCK_RETRIES_EXHAUSTED_TOTAL).increment(1);
}
