//! Origin IP resolution from the incoming request.

use reqwest::header::HeaderMap;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use tracing::debug;

/// Remote address variable.
pub const REMOTE_ADDR: &str = "REMOTE_ADDR";

/// Variables scanned for a client address, in priority order.
const IP_VARS: [&str; 7] = [
    "HTTP_CLIENT_IP",
    "HTTP_X_FORWARDED_FOR",
    "HTTP_X_FORWARDED",
    "HTTP_X_CLUSTER_CLIENT_IP",
    "HTTP_FORWARDED_FOR",
    "HTTP_FORWARDED",
    REMOTE_ADDR,
];

/// Request metadata as CGI-style variables.
///
/// Headers are stored as `HTTP_<NAME>` with the name upper-cased and
/// `-` replaced by `_`, so `X-Forwarded-For` becomes `HTTP_X_FORWARDED_FOR`.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    vars: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from request headers and the peer address.
    pub fn from_headers(headers: &HeaderMap, remote_addr: Option<IpAddr>) -> Self {
        let mut context = Self::new();
        for (name, value) in headers {
            if let Ok(value) = value.to_str() {
                context = context.header(name.as_str(), value);
            }
        }
        if let Some(addr) = remote_addr {
            context = context.remote_addr(addr.to_string());
        }
        context
    }

    /// Build from the process environment, as a CGI script sees it.
    pub fn from_env() -> Self {
        let vars = std::env::vars()
            .filter(|(key, _)| key.starts_with("HTTP_") || key == REMOTE_ADDR)
            .collect();
        Self { vars }
    }

    /// Add a request header. Repeated headers are joined with `", "`.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        let key = format!("HTTP_{}", name.to_ascii_uppercase().replace('-', "_"));
        let value = value.into();
        match self.vars.get_mut(&key) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                self.vars.insert(key, value);
            }
        }
        self
    }

    /// Add a raw variable.
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Set the peer address.
    pub fn remote_addr(self, addr: impl Into<String>) -> Self {
        self.var(REMOTE_ADDR, addr)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Best-effort origin IP.
    ///
    /// Keeps the last public IPv4 candidate found while scanning the
    /// forwarding headers, then replaces it with the raw `REMOTE_ADDR`
    /// whenever that is present.
    pub fn origin_ip(&self) -> Option<String> {
        let mut resolved = None;

        for key in IP_VARS {
            let Some(value) = self.get(key) else {
                continue;
            };
            for candidate in value.split(',').map(str::trim) {
                if is_public_ipv4(candidate) {
                    resolved = Some(candidate.to_string());
                }
            }
        }

        if let Some(remote) = self.get(REMOTE_ADDR) {
            resolved = Some(remote.to_string());
        }

        debug!(origin_ip = ?resolved, "resolved origin ip");
        resolved
    }
}

/// Valid IPv4 outside the private and reserved ranges.
pub fn is_public_ipv4(candidate: &str) -> bool {
    let Ok(ip) = candidate.parse::<Ipv4Addr>() else {
        return false;
    };
    let [first, ..] = ip.octets();

    !(ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || first == 0
        || first >= 240)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_remote_addr_overrides_forwarded_candidate() {
        let context = RequestContext::new()
            .var("REMOTE_ADDR", "8.8.8.8")
            .var("HTTP_X_FORWARDED_FOR", "10.0.0.1, 1.2.3.4");

        assert_eq!(context.origin_ip().as_deref(), Some("8.8.8.8"));
    }

    #[test]
    fn test_remote_addr_kept_even_when_private() {
        let context = RequestContext::new()
            .remote_addr("10.1.2.3")
            .header("Client-IP", "1.2.3.4");

        assert_eq!(context.origin_ip().as_deref(), Some("10.1.2.3"));
    }

    #[test]
    fn test_scan_used_without_remote_addr() {
        let context = RequestContext::new()
            .header("Client-IP", "5.6.7.8")
            .header("X-Forwarded-For", "1.2.3.4, 192.168.0.1, 9.9.9.9, 127.0.0.1");

        // last valid candidate in the last header that has one
        assert_eq!(context.origin_ip().as_deref(), Some("9.9.9.9"));
    }

    #[test]
    fn test_no_valid_candidate() {
        let context = RequestContext::new().header("X-Forwarded-For", "unknown, 10.0.0.1, ::1");
        assert!(context.origin_ip().is_none());
        assert!(RequestContext::new().origin_ip().is_none());
    }

    #[test]
    fn test_is_public_ipv4() {
        assert!(is_public_ipv4("8.8.8.8"));
        assert!(is_public_ipv4("1.2.3.4"));

        assert!(!is_public_ipv4("10.0.0.1"));
        assert!(!is_public_ipv4("172.16.5.4"));
        assert!(!is_public_ipv4("192.168.1.1"));
        assert!(!is_public_ipv4("127.0.0.1"));
        assert!(!is_public_ipv4("169.254.0.1"));
        assert!(!is_public_ipv4("0.1.2.3"));
        assert!(!is_public_ipv4("240.0.0.1"));
        assert!(!is_public_ipv4("255.255.255.255"));
        assert!(!is_public_ipv4("2001:4860::8888"));
        assert!(!is_public_ipv4("not-an-ip"));
    }

    #[test]
    fn test_repeated_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("x-forwarded-for", HeaderValue::from_static("1.2.3.4"));
        headers.append("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));

        let context = RequestContext::from_headers(&headers, None);
        assert_eq!(context.get("HTTP_X_FORWARDED_FOR"), Some("1.2.3.4, 10.0.0.1"));
        assert_eq!(context.origin_ip().as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn test_from_headers_normalizes_names() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4"));

        let context = RequestContext::from_headers(&headers, None);
        assert_eq!(context.get("HTTP_X_FORWARDED_FOR"), Some("1.2.3.4"));
        assert_eq!(context.origin_ip().as_deref(), Some("1.2.3.4"));

        let context = RequestContext::from_headers(&headers, Some("8.8.4.4".parse().unwrap()));
        assert_eq!(context.origin_ip().as_deref(), Some("8.8.4.4"));
    }
}
