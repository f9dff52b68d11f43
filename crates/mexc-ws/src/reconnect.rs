//! Reconnection schedule
//!
//! MEXC drops idle or overloaded sockets routinely, so the client retries on a
//! two-step schedule: a short wait before the first attempt, then a constant
//! wait between every later one.

use std::time::Duration;

/// When and how often the driver retries a lost connection
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Wait before the first attempt after a loss
    pub first_delay: Duration,
    /// Wait before every later attempt
    pub retry_delay: Duration,
    /// Fraction of the delay randomised in either direction, 0.0 to 1.0
    pub jitter: f64,
    /// Give up after this many failed attempts; `None` retries forever
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            first_delay: Duration::from_secs(1),
            retry_delay: Duration::from_secs(3),
            jitter: 0.0,
            max_attempts: None,
        }
    }
}

impl ReconnectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same delay before every attempt
    pub fn fixed(delay: Duration) -> Self {
        Self {
            first_delay: delay,
            retry_delay: delay,
            ..Self::default()
        }
    }

    /// Never reconnect
    pub fn disabled() -> Self {
        Self {
            max_attempts: Some(0),
            ..Self::default()
        }
    }

    pub fn with_first_delay(mut self, delay: Duration) -> Self {
        self.first_delay = delay;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Randomise each delay by up to `jitter` of its length
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max);
        self
    }

    /// Delay before attempt number `attempt` (1-indexed), without jitter
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            self.first_delay
        } else {
            self.retry_delay
        }
    }

    /// Delay before attempt number `attempt`, jitter applied
    pub fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let base = self.delay_for_attempt(attempt);
        if self.jitter == 0.0 {
            return base;
        }

        let spread = base.as_secs_f64() * self.jitter;
        let offset = (rand::random::<f64>() * 2.0 - 1.0) * spread;
        Duration::from_secs_f64((base.as_secs_f64() + offset).max(0.0))
    }

    /// True if another attempt is allowed after `attempt` failures
    pub fn should_reconnect(&self, attempt: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let config = ReconnectConfig::default();
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(3));
        assert_eq!(config.delay_for_attempt(50), Duration::from_secs(3));
        assert!(config.max_attempts.is_none());
    }

    #[test]
    fn test_custom_delays() {
        let config = ReconnectConfig::new()
            .with_first_delay(Duration::from_millis(100))
            .with_retry_delay(Duration::from_secs(10));

        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(10));
    }

    #[test]
    fn test_fixed() {
        let config = ReconnectConfig::fixed(Duration::from_millis(50));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(50));
        assert_eq!(config.delay_for_attempt(9), Duration::from_millis(50));
        assert_eq!(config.delay_with_jitter(9), Duration::from_millis(50));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let config = ReconnectConfig::fixed(Duration::from_millis(1000)).with_jitter(0.2);
        for _ in 0..100 {
            let delay = config.delay_with_jitter(1);
            assert!(delay >= Duration::from_millis(799) && delay <= Duration::from_millis(1201));
        }
        assert_eq!(ReconnectConfig::new().with_jitter(7.0).jitter, 1.0);
    }

    #[test]
    fn test_should_reconnect() {
        assert!(ReconnectConfig::default().should_reconnect(100));

        let limited = ReconnectConfig::default().with_max_attempts(3);
        assert!(limited.should_reconnect(2));
        assert!(!limited.should_reconnect(3));

        assert!(!ReconnectConfig::disabled().should_reconnect(0));
    }
}
