//! 纳秒时间戳工具

use chrono::Utc;
use std::time::Duration;

/// 当前时间（自 Unix 纪元起的纳秒数）
///
/// 超出 i64 可表示范围（2262 年之后）时饱和为 `i64::MAX`。
pub fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// 计算从现在起经过 `ttl` 后的过期时间戳
pub fn expires_in(ttl: Duration) -> i64 {
    let ttl_nanos = i64::try_from(ttl.as_nanos()).unwrap_or(i64::MAX);
    now_nanos().saturating_add(ttl_nanos)
}

/// 锁 key 的存活时间：`expires_at_nanos + 1 - now_nanos`
///
/// 多出的 1 纳秒保证 key 至少存活到调用方给出的过期时刻。
/// 结果小于等于 0 时返回 None。
pub fn ttl_until(expires_at_nanos: i64, now_nanos: i64) -> Option<Duration> {
    let ttl_nanos = expires_at_nanos.saturating_add(1).saturating_sub(now_nanos);
    u64::try_from(ttl_nanos)
        .ok()
        .filter(|nanos| *nanos > 0)
        .map(Duration::from_nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_adds_one_nanosecond_margin() {
        assert_eq!(ttl_until(1_000, 1_000), Some(Duration::from_nanos(1)));
        assert_eq!(
            ttl_until(5_000_000_000, 0),
            Some(Duration::from_nanos(5_000_000_001))
        );
    }

    #[test]
    fn test_ttl_not_positive() {
        // expires_at + 1 == now
        assert_eq!(ttl_until(999, 1_000), None);
        assert_eq!(ttl_until(0, 1_000_000), None);
        assert_eq!(ttl_until(i64::MIN, i64::MAX), None);
    }

    #[test]
    fn test_expires_in_is_in_the_future() {
        let before = now_nanos();
        let expires_at = expires_in(Duration::from_secs(5));
        assert!(expires_at >= before + 5_000_000_000);
    }

    #[test]
    fn test_expires_in_saturates() {
        assert_eq!(expires_in(Duration::MAX), i64::MAX);
    }
}
