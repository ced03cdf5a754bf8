use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
    time::Duration,
};

use chrono::{DateTime, Utc};
use folio_models::rate_limit::RateLimitDecision;
use folio_shared_contracts::{rate_limit::RateLimitService, time::TimeService};
use tokio::sync::Mutex;
use tracing::trace;

/// In-memory sliding window rate limiter.
///
/// Remembers the time of every accepted request per key for the length of
/// one window. Suitable for a single instance only; multiple instances need
/// a shared counter behind the same trait.
#[derive(Debug, Clone)]
pub struct RateLimitServiceImpl<Time> {
    time: Time,
    config: RateLimitServiceConfig,
    state: Arc<Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>>,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitServiceConfig {
    pub max_requests: u64,
    pub window: Duration,
}

impl<Time> RateLimitServiceImpl<Time>
where
    Time: TimeService,
{
    pub fn new(time: Time, config: RateLimitServiceConfig) -> Self {
        Self {
            time,
            config,
            state: Default::default(),
        }
    }

    /// Forgets all keys without requests in the current window.
    ///
    /// Returns the number of keys removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.time.now();
        let mut state = self.state.lock().await;
        let before = state.len();
        state.retain(|_, log| {
            log.back()
                .is_some_and(|&timestamp| timestamp + self.config.window > now)
        });
        before - state.len()
    }

    async fn check_and_consume_at(&self, key: &str, now: DateTime<Utc>) -> RateLimitDecision {
        let RateLimitServiceConfig {
            max_requests,
            window,
        } = self.config;

        let mut state = self.state.lock().await;
        let log = state.entry(key.to_owned()).or_default();

        while log
            .front()
            .is_some_and(|&timestamp| timestamp + window <= now)
        {
            log.pop_front();
        }

        let allowed = (log.len() as u64) < max_requests;
        if allowed {
            log.push_back(now);
        }

        let remaining = max_requests.saturating_sub(log.len() as u64);
        let reset = log
            .front()
            .and_then(|&oldest| (oldest + window - now).to_std().ok())
            .unwrap_or(window);

        trace!(key, allowed, remaining, ?reset, "rate limit checked");

        RateLimitDecision {
            allowed,
            limit: max_requests,
            remaining,
            reset,
        }
    }
}

impl<Time> RateLimitService for RateLimitServiceImpl<Time>
where
    Time: TimeService,
{
    async fn check_and_consume(&self, key: &str) -> anyhow::Result<RateLimitDecision> {
        let now = self.time.now();
        Ok(self.check_and_consume_at(key, now).await)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use folio_shared_contracts::time::MockTimeService;
    use pretty_assertions::assert_eq;

    use super::*;

    const WINDOW: Duration = Duration::from_secs(10 * 60);

    fn config() -> RateLimitServiceConfig {
        RateLimitServiceConfig {
            max_requests: 5,
            window: WINDOW,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[tokio::test]
    async fn sixth_request_is_rejected() {
        // Arrange
        let sut = RateLimitServiceImpl::new(MockTimeService::new(), config());

        // Act
        let mut results = Vec::new();
        for i in 0..6 {
            results.push(sut.check_and_consume_at("1.2.3.4", t0() + secs(i * 60)).await);
        }

        // Assert
        let allowed = results.iter().map(|r| r.allowed).collect::<Vec<_>>();
        assert_eq!(allowed, [true, true, true, true, true, false]);
        let remaining = results.iter().map(|r| r.remaining).collect::<Vec<_>>();
        assert_eq!(remaining, [4, 3, 2, 1, 0, 0]);
        assert_eq!(
            results[5],
            RateLimitDecision {
                allowed: false,
                limit: 5,
                remaining: 0,
                // the first request leaves the window ten minutes after t0
                reset: secs(5 * 60),
            }
        );
    }

    #[tokio::test]
    async fn window_slides() {
        // Arrange
        let sut = RateLimitServiceImpl::new(MockTimeService::new(), config());
        for i in 0..5 {
            assert!(sut.check_and_consume_at("k", t0() + secs(i * 60)).await.allowed);
        }

        // Act
        let just_before = sut.check_and_consume_at("k", t0() + WINDOW - secs(1)).await;
        let at_expiry = sut.check_and_consume_at("k", t0() + WINDOW).await;
        let again = sut.check_and_consume_at("k", t0() + WINDOW + secs(1)).await;
        let later = sut.check_and_consume_at("k", t0() + WINDOW + secs(60)).await;

        // Assert
        assert!(!just_before.allowed);
        assert!(at_expiry.allowed);
        assert_eq!(at_expiry.remaining, 0);
        assert!(!again.allowed);
        assert!(later.allowed);
    }

    #[tokio::test]
    async fn rejected_requests_are_not_counted() {
        // Arrange
        let sut = RateLimitServiceImpl::new(MockTimeService::new(), config());
        for _ in 0..5 {
            sut.check_and_consume_at("k", t0()).await;
        }
        for i in 1..100 {
            assert!(!sut.check_and_consume_at("k", t0() + secs(i)).await.allowed);
        }

        // Act
        let result = sut.check_and_consume_at("k", t0() + WINDOW).await;

        // Assert
        assert!(result.allowed);
        assert_eq!(result.remaining, 4);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        // Arrange
        let sut = RateLimitServiceImpl::new(MockTimeService::new(), config());
        for _ in 0..5 {
            sut.check_and_consume_at("1.1.1.1", t0()).await;
        }

        // Act
        let other = sut.check_and_consume_at("2.2.2.2", t0()).await;
        let same = sut.check_and_consume_at("1.1.1.1", t0()).await;

        // Assert
        assert!(other.allowed);
        assert_eq!(other.remaining, 4);
        assert_eq!(other.reset, WINDOW);
        assert!(!same.allowed);
    }

    #[tokio::test]
    async fn zero_limit_rejects_everything() {
        let sut = RateLimitServiceImpl::new(
            MockTimeService::new(),
            RateLimitServiceConfig {
                max_requests: 0,
                window: WINDOW,
            },
        );

        let result = sut.check_and_consume_at("k", t0()).await;

        assert_eq!(
            result,
            RateLimitDecision {
                allowed: false,
                limit: 0,
                remaining: 0,
                reset: WINDOW,
            }
        );
    }

    #[tokio::test]
    async fn check_and_consume_uses_current_time() {
        // Arrange
        let time = MockTimeService::new().with_now(t0());
        let sut = RateLimitServiceImpl::new(time, config());

        // Act
        let result = sut.check_and_consume("k").await.unwrap();

        // Assert
        assert_eq!(
            result,
            RateLimitDecision {
                allowed: true,
                limit: 5,
                remaining: 4,
                reset: WINDOW,
            }
        );
    }

    #[tokio::test]
    async fn purge_expired() {
        // Arrange
        let time = MockTimeService::new().with_now(t0() + WINDOW + secs(30));
        let sut = RateLimitServiceImpl::new(time, config());
        sut.check_and_consume_at("old", t0()).await;
        sut.check_and_consume_at("recent", t0() + secs(60)).await;

        // Act
        let removed = sut.purge_expired().await;

        // Assert
        assert_eq!(removed, 1);
        let state = sut.state.lock().await;
        assert!(!state.contains_key("old"));
        assert!(state.contains_key("recent"));
    }
}
