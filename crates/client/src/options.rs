// ABOUTME: Configuration options for the cssweep client and the fluent ClientBuilder.
// ABOUTME: Covers HTTP settings (timeout, user agent, headers, SSRF policy) and analysis tuning.

use std::collections::HashMap;
use std::time::Duration;

use cssweep_engine::AnalyzeOptions;

use crate::client::Client;

/// Default User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("cssweep/", env!("CARGO_PKG_VERSION"));

/// Configuration options for the cssweep client.
#[derive(Debug, Clone)]
pub struct Options {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Deadline for a whole analysis; `None` disables it.
    pub analysis_timeout: Option<Duration>,
    pub user_agent: String,
    pub allow_private_networks: bool,
    pub max_concurrent_fetches: usize,
    pub http_client: Option<reqwest::Client>,
    pub headers: HashMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        let analyze = AnalyzeOptions::default();
        Self {
            timeout: Duration::from_secs(30),
            analysis_timeout: analyze.timeout,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            allow_private_networks: false,
            max_concurrent_fetches: analyze.max_concurrent_fetches,
            http_client: None,
            headers: HashMap::new(),
        }
    }
}

impl Options {
    pub(crate) fn analyze_options(&self) -> AnalyzeOptions {
        AnalyzeOptions {
            max_concurrent_fetches: self.max_concurrent_fetches,
            timeout: self.analysis_timeout,
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the deadline for a whole analysis, or disable it with `None`.
    pub fn analysis_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.opts.analysis_timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Allow or disallow requests to private networks.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    /// Cap the number of stylesheet downloads in flight. 1 fetches sequentially.
    pub fn max_concurrent_fetches(mut self, max: usize) -> Self {
        self.opts.max_concurrent_fetches = max.max(1);
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Result<Client, reqwest::Error> {
        Client::new(self.opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let opts = Options::default();
        assert_eq!(opts.timeout, Duration::from_secs(30));
        assert_eq!(opts.analysis_timeout, Some(Duration::from_secs(60)));
        assert_eq!(opts.max_concurrent_fetches, 8);
        assert!(!opts.allow_private_networks);
        assert!(opts.user_agent.starts_with("cssweep/"));
    }

    #[test]
    fn builder_sets_fields() {
        let builder = ClientBuilder::new()
            .timeout(Duration::from_secs(5))
            .analysis_timeout(None)
            .user_agent("probe/1.0")
            .allow_private_networks(true)
            .max_concurrent_fetches(0)
            .header("x-a", "1");

        let opts = &builder.opts;
        assert_eq!(opts.timeout, Duration::from_secs(5));
        assert_eq!(opts.analysis_timeout, None);
        assert_eq!(opts.user_agent, "probe/1.0");
        assert!(opts.allow_private_networks);
        assert_eq!(opts.max_concurrent_fetches, 1);
        assert_eq!(opts.headers.get("x-a").map(String::as_str), Some("1"));

        let analyze = opts.analyze_options();
        assert_eq!(analyze.max_concurrent_fetches, 1);
        assert_eq!(analyze.timeout, None);
    }
}
