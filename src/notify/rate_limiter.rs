use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// Sliding one-minute window that caps how many reports are pushed
#[derive(Debug)]
pub struct RateLimiter {
    max_per_minute: usize,
    /// Send times inside the current window, oldest first
    recent_sends: VecDeque<DateTime<Utc>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(3)
    }
}

impl RateLimiter {
    /// Create a limiter allowing `max_per_minute` sends in any 60 second window
    pub fn new(max_per_minute: usize) -> Self {
        Self {
            max_per_minute,
            recent_sends: VecDeque::new(),
        }
    }

    /// Whether another report may be sent now
    pub fn can_send(&mut self) -> bool {
        self.can_send_at(Utc::now())
    }

    /// Whether another report may be sent at `now`
    pub fn can_send_at(&mut self, now: DateTime<Utc>) -> bool {
        self.expire(now);
        self.recent_sends.len() < self.max_per_minute
    }

    /// Record a report sent now
    pub fn record_send(&mut self) {
        self.record_send_at(Utc::now());
    }

    /// Record a report sent at `timestamp`
    pub fn record_send_at(&mut self, timestamp: DateTime<Utc>) {
        self.recent_sends.push_back(timestamp);
    }

    /// Number of sends inside the window ending at `now`
    pub fn count_at(&mut self, now: DateTime<Utc>) -> usize {
        self.expire(now);
        self.recent_sends.len()
    }

    fn expire(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::minutes(1);
        self.recent_sends.retain(|&sent| sent > cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let mut limiter = RateLimiter::new(3);
        let now = Utc::now();

        for _ in 0..3 {
            assert!(limiter.can_send_at(now));
            limiter.record_send_at(now);
        }
        assert!(!limiter.can_send_at(now));
    }

    #[test]
    fn test_window_slides() {
        let mut limiter = RateLimiter::new(2);
        let now = Utc::now();

        limiter.record_send_at(now - Duration::seconds(50));
        limiter.record_send_at(now - Duration::seconds(10));
        assert!(!limiter.can_send_at(now));

        // 15 seconds later the first send has left the window
        assert!(limiter.can_send_at(now + Duration::seconds(15)));
        assert_eq!(limiter.count_at(now + Duration::seconds(15)), 1);
    }

    #[test]
    fn test_old_sends_do_not_count() {
        let mut limiter = RateLimiter::new(1);
        let now = Utc::now();

        limiter.record_send_at(now - Duration::minutes(5));
        assert_eq!(limiter.count_at(now), 0);
        assert!(limiter.can_send_at(now));
    }

    #[test]
    fn test_wall_clock_helpers() {
        let mut limiter = RateLimiter::new(1);
        assert!(limiter.can_send());
        limiter.record_send();
        assert!(!limiter.can_send());
    }
}
