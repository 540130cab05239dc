//! Global outbound rate limiting.
//!
//! One token bucket gates every page fetch the process makes, no matter
//! how many extraction calls are in flight or which hosts they target.
//! This bounds aggregate outbound request rate and protects the
//! service's reputation with downstream hosts.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{Quota, RateLimiter};

use crate::error::ExtractError;

type DirectLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Shared token-bucket gate for outbound page fetches.
///
/// Cloning shares the same bucket; the service hands clones to anything
/// that needs to consume capacity.
#[derive(Clone)]
pub struct FetchGate {
    limiter: Arc<DirectLimiter>,
}

impl FetchGate {
    /// `refill_per_sec` tokens replenish each second; at most `burst`
    /// tokens ever accumulate.
    pub fn new(refill_per_sec: u32, burst: u32) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(refill_per_sec).expect("refill_per_sec must be > 0"),
        )
        .allow_burst(NonZeroU32::new(burst).expect("burst must be > 0"));

        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Consume one token, waiting up to `wait_budget` for one to appear.
    ///
    /// On timeout the token is *not* consumed and the request has done no
    /// network work.
    pub async fn acquire(&self, wait_budget: Duration) -> Result<(), ExtractError> {
        tokio::time::timeout(wait_budget, self.limiter.until_ready())
            .await
            .map_err(|_| ExtractError::RateLimitTimeout {
                waited_secs: wait_budget.as_secs(),
            })
    }
}
