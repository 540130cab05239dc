//! Outbound target safety checks (SSRF protection).
//!
//! Every candidate URL is vetted before any network activity:
//!
//! 1. Only `http` and `https` schemes.
//! 2. Blocked-hostname list (localhost, cloud metadata aliases).
//! 3. IP literals classified against private/reserved ranges.
//! 4. Hostnames resolved via DNS, with **every** resolved address
//!    classified: a hostname that looks public but resolves into a
//!    private range is rejected (DNS rebinding).

use std::net::IpAddr;

use url::Url;

use crate::error::ExtractError;

/// Hostnames that are never fetched, regardless of what they resolve to.
const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "metadata.google.internal",
    "metadata.gke.internal",
    "instance-data",
];

/// Synchronous checks: scheme, blocked hostnames, IP-literal ranges.
///
/// Complete for URLs whose host is an IP literal; hostname targets also
/// need the DNS step in [`validate_target`].
pub fn check_literal(url: &Url) -> Result<(), ExtractError> {
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ExtractError::UnsafeTarget(format!(
                "URL scheme '{scheme}' is not allowed (only http/https)"
            )));
        }
    }

    match url.host() {
        None => Err(ExtractError::UnsafeTarget("URL has no host".into())),
        Some(url::Host::Ipv4(v4)) => {
            if is_private_ip(IpAddr::V4(v4)) {
                Err(ExtractError::UnsafeTarget(format!(
                    "{v4} is a private/reserved address"
                )))
            } else {
                Ok(())
            }
        }
        Some(url::Host::Ipv6(v6)) => {
            if is_private_ip(IpAddr::V6(v6)) {
                Err(ExtractError::UnsafeTarget(format!(
                    "{v6} is a private/reserved address"
                )))
            } else {
                Ok(())
            }
        }
        Some(url::Host::Domain(domain)) => {
            let lower = domain.to_ascii_lowercase();
            if BLOCKED_HOSTS.contains(&lower.as_str()) {
                Err(ExtractError::UnsafeTarget(format!(
                    "host '{domain}' is blocked"
                )))
            } else {
                Ok(())
            }
        }
    }
}

/// Fully vet a target URL, resolving hostnames and checking every
/// resolved address.
pub async fn validate_target(url: &Url) -> Result<(), ExtractError> {
    check_literal(url)?;

    // IP literals were already classified; only hostnames need resolving.
    let domain = match url.host() {
        Some(url::Host::Domain(domain)) => domain.to_string(),
        _ => return Ok(()),
    };

    let port = url.port_or_known_default().unwrap_or(80);
    let addrs: Vec<_> = tokio::net::lookup_host((domain.as_str(), port))
        .await
        .map_err(|e| ExtractError::Network(format!("DNS resolution failed for {domain}: {e}")))?
        .collect();

    if addrs.is_empty() {
        return Err(ExtractError::Network(format!(
            "DNS resolution returned no addresses for {domain}"
        )));
    }

    for socket_addr in &addrs {
        if is_private_ip(socket_addr.ip()) {
            return Err(ExtractError::UnsafeTarget(format!(
                "{domain} resolves to private/reserved IP {}",
                socket_addr.ip()
            )));
        }
    }

    Ok(())
}

/// Check if an IP address is in a private/reserved/link-local range.
fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()           // 127.0.0.0/8
                || v4.is_private()     // 10/8, 172.16/12, 192.168/16
                || v4.is_link_local()  // 169.254.0.0/16 (cloud metadata!)
                || v4.is_unspecified() // 0.0.0.0
                || v4.is_broadcast()   // 255.255.255.255
                || v4.is_documentation() // 192.0.2.0/24, 198.51.100.0/24, 203.0.113.0/24
                || v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64 // 100.64.0.0/10 (CGN)
        }
        IpAddr::V6(v6) => {
            v6.is_loopback()       // ::1
                || v6.is_unspecified() // ::
                // fe80::/10 (link-local)
                || (v6.segments()[0] & 0xFFC0) == 0xFE80
                // fc00::/7 (unique local)
                || (v6.segments()[0] & 0xFE00) == 0xFC00
                // IPv4-mapped IPv6 (::ffff:x.x.x.x) — check the embedded v4
                || match v6.to_ipv4_mapped() {
                    Some(v4) => is_private_ip(IpAddr::V4(v4)),
                    None => false,
                }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_private_ipv4() {
        assert!(is_private_ip("127.0.0.1".parse().unwrap()));
        assert!(is_private_ip("10.0.0.1".parse().unwrap()));
        assert!(is_private_ip("172.16.0.1".parse().unwrap()));
        assert!(is_private_ip("192.168.1.1".parse().unwrap()));
        assert!(is_private_ip("169.254.169.254".parse().unwrap())); // cloud metadata
        assert!(is_private_ip("0.0.0.0".parse().unwrap()));
        assert!(is_private_ip("100.64.0.1".parse().unwrap())); // CGN
    }

    #[test]
    fn test_public_ipv4() {
        assert!(!is_private_ip("8.8.8.8".parse().unwrap()));
        assert!(!is_private_ip("1.1.1.1".parse().unwrap()));
        assert!(!is_private_ip("93.184.216.34".parse().unwrap()));
    }

    #[test]
    fn test_private_ipv6() {
        assert!(is_private_ip("::1".parse().unwrap()));
        assert!(is_private_ip("::".parse().unwrap()));
        assert!(is_private_ip("fe80::1".parse().unwrap()));
        assert!(is_private_ip("fc00::1".parse().unwrap()));
        assert!(is_private_ip("::ffff:127.0.0.1".parse().unwrap())); // v4-mapped loopback
        assert!(is_private_ip("::ffff:169.254.169.254".parse().unwrap())); // v4-mapped metadata
    }

    #[test]
    fn test_public_ipv6() {
        assert!(!is_private_ip("2001:4860:4860::8888".parse().unwrap()));
    }

    #[test]
    fn rejects_bad_schemes() {
        assert!(check_literal(&parse("file:///etc/passwd")).is_err());
        assert!(check_literal(&parse("ftp://example.com/")).is_err());
    }

    #[test]
    fn rejects_blocked_hostnames() {
        assert!(check_literal(&parse("http://localhost/")).is_err());
        assert!(check_literal(&parse("http://LOCALHOST/")).is_err());
        assert!(check_literal(&parse("http://metadata.google.internal/")).is_err());
    }

    #[test]
    fn rejects_private_ip_literals() {
        assert!(check_literal(&parse("http://127.0.0.1/admin")).is_err());
        assert!(check_literal(&parse("http://10.1.2.3/")).is_err());
        assert!(check_literal(&parse("http://[::1]/")).is_err());
        assert!(check_literal(&parse("http://169.254.169.254/latest/meta-data/")).is_err());
    }

    #[test]
    fn accepts_public_looking_urls() {
        assert!(check_literal(&parse("https://example.com/article")).is_ok());
        assert!(check_literal(&parse("http://8.8.8.8/")).is_ok());
    }

    #[tokio::test]
    async fn validate_target_rejects_metadata_ip_without_dns() {
        let err = validate_target(&parse("http://169.254.169.254/latest/meta-data/"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::UnsafeTarget(_)));
    }

    #[tokio::test]
    async fn validate_target_accepts_public_ip_literal() {
        assert!(validate_target(&parse("http://8.8.8.8/")).await.is_ok());
    }
}
