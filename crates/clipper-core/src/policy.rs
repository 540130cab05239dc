//! robots.txt compliance checking.
//!
//! The policy document is fetched fresh for every request and evaluated
//! against our agent token. Every failure mode on the way to a parsed
//! document (unreachable origin, non-200 status, undecodable body)
//! resolves to *allow*: a missing or broken robots.txt must never block
//! legitimate extraction.

use std::time::Duration;

use robotstxt::DefaultMatcher;
use url::Url;

use crate::traits::Fetcher;

/// Upper bound on an honored Crawl-delay.
const MAX_CRAWL_DELAY: Duration = Duration::from_secs(10);

/// Outcome of a robots.txt evaluation for one target URL.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyVerdict {
    pub allowed: bool,
    /// Crawl-delay advertised for our agent (or the wildcard group),
    /// capped at [`MAX_CRAWL_DELAY`].
    pub crawl_delay: Option<Duration>,
}

impl PolicyVerdict {
    fn allow_all() -> Self {
        Self {
            allowed: true,
            crawl_delay: None,
        }
    }
}

/// Fetches and evaluates robots.txt for target URLs.
#[derive(Clone)]
pub struct PolicyChecker<F> {
    fetcher: F,
    agent: String,
}

impl<F: Fetcher> PolicyChecker<F> {
    /// `fetcher` should carry the tight robots profile (short timeout,
    /// small body ceiling); `agent` is the product token matched against
    /// `User-agent:` groups.
    pub fn new(fetcher: F, agent: impl Into<String>) -> Self {
        Self {
            fetcher,
            agent: agent.into(),
        }
    }

    /// Evaluate whether `url` may be fetched.
    ///
    /// Infallible by design: failure to obtain or parse the policy
    /// document resolves to allow.
    pub async fn check(&self, url: &Url) -> PolicyVerdict {
        let robots_url = robots_url_for(url);

        let body = match self.fetcher.fetch(robots_url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(url = %robots_url, error = %e, "robots.txt unavailable, allowing");
                return PolicyVerdict::allow_all();
            }
        };

        let mut matcher = DefaultMatcher::default();
        let allowed = matcher.one_agent_allowed_by_robots(&body, &self.agent, &match_target(url));

        if !allowed {
            tracing::info!(url = %url, agent = %self.agent, "robots.txt disallows fetch");
        }

        PolicyVerdict {
            allowed,
            crawl_delay: crawl_delay_for(&body, &self.agent),
        }
    }
}

/// `scheme://host[:port]/robots.txt` for the target's origin.
fn robots_url_for(url: &Url) -> Url {
    let mut robots = url.clone();
    robots.set_path("/robots.txt");
    robots.set_query(None);
    robots.set_fragment(None);
    robots
}

/// The URL form rules are matched against: query string and fragment are
/// stripped so only the path participates in matching.
fn match_target(url: &Url) -> String {
    let mut target = url.clone();
    target.set_query(None);
    target.set_fragment(None);
    target.into()
}

/// Extract the Crawl-delay for `agent` (falling back to the wildcard
/// group), capped at [`MAX_CRAWL_DELAY`].
///
/// The matcher doesn't surface Crawl-delay, so this is a small scan over
/// the same grammar: consecutive `User-agent` lines open a group, and
/// directives apply to every agent named in the open group.
fn crawl_delay_for(body: &str, agent: &str) -> Option<Duration> {
    let agent = agent.to_ascii_lowercase();
    let mut in_agent_group = false;
    let mut in_wildcard_group = false;
    let mut group_closed = true;
    let mut agent_delay: Option<f64> = None;
    let mut wildcard_delay: Option<f64> = None;

    for line in body.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "user-agent" => {
                if group_closed {
                    in_agent_group = false;
                    in_wildcard_group = false;
                    group_closed = false;
                }
                let token = value.to_ascii_lowercase();
                if token == "*" {
                    in_wildcard_group = true;
                } else if !token.is_empty() && agent.contains(token.as_str()) {
                    in_agent_group = true;
                }
            }
            "crawl-delay" => {
                group_closed = true;
                if let Ok(secs) = value.parse::<f64>() {
                    if in_agent_group && agent_delay.is_none() {
                        agent_delay = Some(secs);
                    } else if in_wildcard_group && wildcard_delay.is_none() {
                        wildcard_delay = Some(secs);
                    }
                }
            }
            _ => {
                group_closed = true;
            }
        }
    }

    let secs = agent_delay.or(wildcard_delay)?;
    if secs <= 0.0 {
        return None;
    }
    Some(Duration::from_secs_f64(secs).min(MAX_CRAWL_DELAY))
}
