//! 重试退避
//!
//! 每次失败后等待 0 到 4 秒之间的随机整数秒，不做指数增长。

use rand::Rng;
use std::time::Duration;

/// 退避秒数上限（不含）
pub const BACKOFF_SECS_EXCLUSIVE: u64 = 5;

/// 随机生成一次退避时长
pub fn random_backoff() -> Duration {
    let secs = rand::rng().random_range(0..BACKOFF_SECS_EXCLUSIVE);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_range() {
        for _ in 0..200 {
            let delay = random_backoff();
            assert!(delay <= Duration::from_secs(4));
            assert_eq!(delay.subsec_nanos(), 0);
        }
    }

    #[test]
    fn test_backoff_is_not_constant() {
        let first = random_backoff();
        // 200 次全部相同的概率可以忽略
        assert!((0..200).any(|_| random_backoff() != first));
    }
}
