//! Per-host spacing between page fetches.
//!
//! The global token bucket bounds aggregate outbound rate; this keeps any
//! single host from being hit in rapid succession, honoring a
//! Crawl-delay advertised by the host's robots.txt when one exists.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use url::Url;

/// Tracks the last fetch time per host and sleeps before a new fetch if
/// the required spacing hasn't elapsed. Thread-safe: concurrent tasks
/// are spaced per host while different hosts proceed independently.
#[derive(Clone)]
pub struct HostThrottle {
    default_spacing: Duration,
    last_fetch: Arc<Mutex<HashMap<String, Instant>>>,
}

impl HostThrottle {
    /// `default_spacing` applies when robots.txt advertises no
    /// Crawl-delay for the host.
    pub fn new(default_spacing: Duration) -> Self {
        Self {
            default_spacing,
            last_fetch: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Key: scheme://host:port, so the same name over http and https is
    /// spaced independently.
    fn host_key(url: &Url) -> Option<String> {
        let host = url.host_str()?;
        let port = url
            .port_or_known_default()
            .map(|p| format!(":{p}"))
            .unwrap_or_default();
        Some(format!("{}://{}{}", url.scheme(), host, port))
    }

    /// Wait until `spacing` (or the default when `None`) has passed since
    /// the previous fetch to this URL's host, then stamp the clock.
    pub async fn wait(&self, url: &Url, spacing: Option<Duration>) {
        let Some(key) = Self::host_key(url) else {
            return;
        };
        let required = spacing.unwrap_or(self.default_spacing);

        let mut map = self.last_fetch.lock().await;
        if let Some(&last) = map.get(&key) {
            let elapsed = last.elapsed();
            if elapsed < required {
                let sleep_for = required - elapsed;
                // Drop the lock while sleeping so other hosts aren't blocked.
                drop(map);
                tracing::debug!(
                    host = %key,
                    sleep_ms = %sleep_for.as_millis(),
                    "Spacing out fetch"
                );
                tokio::time::sleep(sleep_for).await;
                let mut map = self.last_fetch.lock().await;
                map.insert(key, Instant::now());
                return;
            }
        }
        map.insert(key, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn host_key_extracts_correctly() {
        assert_eq!(
            HostThrottle::host_key(&parse("https://example.com/path?q=1")),
            Some("https://example.com:443".to_string())
        );
        assert_eq!(
            HostThrottle::host_key(&parse("http://example.com:8080/page")),
            Some("http://example.com:8080".to_string())
        );
        assert_eq!(
            HostThrottle::host_key(&parse("http://example.com")),
            Some("http://example.com:80".to_string())
        );
    }

    #[tokio::test]
    async fn same_host_is_spaced_by_default() {
        let throttle = HostThrottle::new(Duration::from_millis(100));
        let url = parse("http://example.com/page");

        let start = Instant::now();
        throttle.wait(&url, None).await;
        throttle.wait(&url, None).await;
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(100),
            "second fetch should have been spaced by at least 100ms, elapsed: {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn different_hosts_are_not_spaced_against_each_other() {
        let throttle = HostThrottle::new(Duration::from_millis(200));

        let start = Instant::now();
        throttle.wait(&parse("http://example.com/a"), None).await;
        throttle.wait(&parse("http://other.com/a"), None).await;
        let elapsed = start.elapsed();

        assert!(
            elapsed < Duration::from_millis(150),
            "different hosts should not be spaced against each other, elapsed: {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn crawl_delay_overrides_the_default() {
        let throttle = HostThrottle::new(Duration::from_millis(1));
        let url = parse("http://example.com/page");

        let start = Instant::now();
        throttle.wait(&url, Some(Duration::from_millis(120))).await;
        throttle.wait(&url, Some(Duration::from_millis(120))).await;
        let elapsed = start.elapsed();

        assert!(
            elapsed >= Duration::from_millis(120),
            "crawl delay spacing not honored, elapsed: {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn zero_spacing_does_not_sleep() {
        let throttle = HostThrottle::new(Duration::ZERO);
        let url = parse("http://example.com/page");

        let start = Instant::now();
        for _ in 0..5 {
            throttle.wait(&url, None).await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
