//! Service configuration.

use std::time::Duration;

/// Identifying agent string sent with every outbound request and matched
/// against robots.txt groups.
pub const DEFAULT_USER_AGENT: &str = "ClipperBot/0.3 (+https://github.com/clipper-rs/clipper)";

/// Tunables for the extraction service.
///
/// `Default` carries the production values; tests shrink the durations.
#[derive(Debug, Clone)]
pub struct ClipperConfig {
    /// User-Agent header and robots.txt identity.
    pub user_agent: String,

    /// Overall timeout for a page fetch.
    pub fetch_timeout: Duration,

    /// Hard ceiling on a page body.
    pub max_body_bytes: u64,

    /// Overall timeout for a robots.txt fetch.
    pub robots_timeout: Duration,

    /// Hard ceiling on a robots.txt body.
    pub robots_max_bytes: u64,

    /// Token-bucket refill rate (tokens/second).
    pub rate_per_sec: u32,

    /// Token-bucket capacity.
    pub rate_burst: u32,

    /// How long one request may wait for a rate-limit token.
    pub rate_wait_budget: Duration,

    /// Concurrent in-flight page fetches.
    pub max_concurrent_fetches: usize,

    /// Per-host spacing when robots.txt advertises no Crawl-delay.
    pub default_host_spacing: Duration,

    /// Lifetime of a cached extraction result.
    pub cache_ttl: Duration,

    /// Interval of the proactive cache sweep.
    pub cache_sweep_interval: Duration,
}

impl Default for ClipperConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout: Duration::from_secs(60),
            max_body_bytes: 10 * 1024 * 1024,
            robots_timeout: Duration::from_secs(10),
            robots_max_bytes: 1024 * 1024,
            rate_per_sec: 10,
            rate_burst: 20,
            rate_wait_budget: Duration::from_secs(60),
            max_concurrent_fetches: 10,
            default_host_spacing: Duration::from_millis(500),
            cache_ttl: Duration::from_secs(60 * 60),
            cache_sweep_interval: Duration::from_secs(10 * 60),
        }
    }
}

impl ClipperConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_rate(mut self, per_sec: u32, burst: u32) -> Self {
        self.rate_per_sec = per_sec;
        self.rate_burst = burst;
        self
    }

    pub fn with_rate_wait_budget(mut self, budget: Duration) -> Self {
        self.rate_wait_budget = budget;
        self
    }

    pub fn with_default_host_spacing(mut self, spacing: Duration) -> Self {
        self.default_host_spacing = spacing;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_cache_sweep_interval(mut self, interval: Duration) -> Self {
        self.cache_sweep_interval = interval;
        self
    }

    /// Product token half of the user agent, matched against robots.txt
    /// `User-agent:` groups.
    pub fn agent_token(&self) -> &str {
        self.user_agent
            .split(['/', ' '])
            .next()
            .unwrap_or(&self.user_agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_production_values() {
        let config = ClipperConfig::default();
        assert_eq!(config.rate_per_sec, 10);
        assert_eq!(config.rate_burst, 20);
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.cache_sweep_interval, Duration::from_secs(600));
        assert_eq!(config.max_body_bytes, 10 * 1024 * 1024);
        assert_eq!(config.robots_max_bytes, 1024 * 1024);
        assert_eq!(config.fetch_timeout, Duration::from_secs(60));
        assert_eq!(config.robots_timeout, Duration::from_secs(10));
    }

    #[test]
    fn agent_token_is_the_product_half() {
        let config = ClipperConfig::default();
        assert_eq!(config.agent_token(), "ClipperBot");

        let custom = ClipperConfig::default().with_user_agent("MyBot/2.0 (+https://my.example)");
        assert_eq!(custom.agent_token(), "MyBot");

        let bare = ClipperConfig::default().with_user_agent("plainagent");
        assert_eq!(bare.agent_token(), "plainagent");
    }
}
