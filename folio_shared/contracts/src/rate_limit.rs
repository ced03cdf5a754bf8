use std::future::Future;

use folio_models::rate_limit::RateLimitDecision;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RateLimitService: Send + Sync + 'static {
    /// Counts one request for `key` against the limit, unless the limit has
    /// already been reached.
    ///
    /// Rejected requests are not counted.
    fn check_and_consume(
        &self,
        key: &str,
    ) -> impl Future<Output = anyhow::Result<RateLimitDecision>> + Send;
}

#[cfg(feature = "mock")]
impl MockRateLimitService {
    pub fn with_check_and_consume(mut self, key: String, result: RateLimitDecision) -> Self {
        self.expect_check_and_consume()
            .once()
            .with(mockall::predicate::eq(key))
            .return_once(move |_| Box::pin(std::future::ready(Ok(result))));
        self
    }
}
