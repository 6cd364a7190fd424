//! Client configuration.

use crate::origin_ip::RequestContext;
use std::time::Duration;

/// Production API base URL.
pub const PRODUCTION_API_URL: &str = "https://api.reventic.com";

/// Demo API base URL.
pub const DEMO_API_URL: &str = "https://demo.reventic.com/";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Reventic client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
}

impl Config {
    /// Get the API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for a [`Tracker`](crate::Tracker).
#[derive(Debug, Default)]
pub struct TrackerBuilder {
    pub(crate) api_key: Option<String>,
    pub(crate) request_context: RequestContext,
    demo: bool,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl TrackerBuilder {
    /// Create a new builder with no API key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key. It can also be supplied later with `set_api_key`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Target the demo environment instead of production.
    pub fn demo(mut self, demo: bool) -> Self {
        self.demo = demo;
        self
    }

    /// Override the API base URL. Takes precedence over `demo`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the incoming request the origin IP is resolved from.
    pub fn request_context(mut self, context: RequestContext) -> Self {
        self.request_context = context;
        self
    }

    /// Build the configuration.
    pub(crate) fn build_config(&self) -> Result<Config, crate::Error> {
        let base_url = match &self.base_url {
            Some(url) => url.clone(),
            None if self.demo => DEMO_API_URL.into(),
            None => PRODUCTION_API_URL.into(),
        };

        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| crate::Error::Config(format!("invalid base_url {base_url:?}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(crate::Error::Config(format!(
                "base_url {base_url:?} cannot be used as a base"
            )));
        }

        Ok(Config {
            base_url,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = TrackerBuilder::new().build_config().unwrap();

        assert_eq!(config.base_url(), PRODUCTION_API_URL);
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_demo_selects_demo_url() {
        let config = TrackerBuilder::new().demo(true).build_config().unwrap();

        assert_eq!(config.base_url(), "https://demo.reventic.com/");
    }

    #[test]
    fn test_explicit_base_url_wins_over_demo() {
        let config = TrackerBuilder::new()
            .demo(true)
            .base_url("http://127.0.0.1:8080")
            .timeout(Duration::from_millis(500))
            .build_config()
            .unwrap();

        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
        assert_eq!(config.timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_base_url_fails() {
        let result = TrackerBuilder::new().base_url("not a url").build_config();
        assert!(matches!(result, Err(crate::Error::Config(_))));

        let result = TrackerBuilder::new().base_url("mailto:ops@reventic.com").build_config();
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_builder_accepts_string_and_str() {
        let _ = TrackerBuilder::new().api_key("key");
        let _ = TrackerBuilder::new().api_key(String::from("key"));
        let _ = TrackerBuilder::new().base_url("https://example.com");
        let _ = TrackerBuilder::new().base_url(String::from("https://example.com"));
    }
}
