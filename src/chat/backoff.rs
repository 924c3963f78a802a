//! Reconnection backoff policy
//!
//! delay = min(base * 2^attempt, cap), ceasing entirely after the
//! configured attempt count. A close initiated by the client itself never
//! consults this policy.

use std::time::Duration;

/// Exponential backoff parameters for channel reconnection
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    /// First retry delay
    pub base: Duration,
    /// Upper bound on any retry delay
    pub cap: Duration,
    /// Retries allowed before giving up
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (zero-based), or `None` once
    /// attempts are exhausted.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let doubled = self
            .base
            .checked_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
            .unwrap_or(self.cap);
        Some(doubled.min(self.cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_double_up_to_cap() {
        let policy = ReconnectPolicy {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
            max_attempts: 8,
        };

        assert_eq!(policy.delay(0), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay(1), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay(2), Some(Duration::from_secs(4)));
        assert_eq!(policy.delay(4), Some(Duration::from_secs(16)));
        // 2^5 = 32 exceeds the cap
        assert_eq!(policy.delay(5), Some(Duration::from_secs(30)));
        assert_eq!(policy.delay(7), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_ceases_after_max_attempts() {
        let policy = ReconnectPolicy::default();
        assert!(policy.delay(4).is_some());
        assert_eq!(policy.delay(5), None);
        assert_eq!(policy.delay(100), None);
    }

    #[test]
    fn test_huge_attempt_does_not_overflow() {
        let policy = ReconnectPolicy {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(30),
            max_attempts: u32::MAX,
        };
        assert_eq!(policy.delay(40), Some(Duration::from_secs(30)));
    }
}
