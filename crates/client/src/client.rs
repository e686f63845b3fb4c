// ABOUTME: The cssweep Client: a configured reqwest client wired into the analysis engine.
// ABOUTME: Implements TextFetcher over HTTP and exposes analyze() for URLs and analyze_html() for local markup.

use std::net::ToSocketAddrs;

use cssweep_engine::{
    analyze, analyze_document, AnalysisReport, AnalyzeError, FetchError, TextFetcher,
};

use crate::options::{ClientBuilder, Options};
use crate::resource::{fetch, is_private_ip, FetchOptions};

/// Fetches pages and stylesheets over HTTP and analyzes them.
#[derive(Debug, Clone)]
pub struct Client {
    opts: Options,
    http_client: reqwest::Client,
}

fn redirect_policy(allow_private: bool) -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= 10 {
            return attempt.error("too many redirects");
        }
        if allow_private {
            return attempt.follow();
        }

        let next = attempt.url().clone();
        let Some(host) = next.host_str() else {
            return attempt.follow();
        };
        let host = host.trim_matches(|c| c == '[' || c == ']');
        if let Ok(ip) = host.parse::<std::net::IpAddr>() {
            if is_private_ip(&ip) {
                return attempt.error("redirect to private IP blocked");
            }
            return attempt.follow();
        }

        // synchronous DNS resolution to avoid async in redirect policy
        let port = next.port_or_known_default().unwrap_or(80);
        match (host, port).to_socket_addrs() {
            Ok(addrs) => {
                for sa in addrs {
                    if is_private_ip(&sa.ip()) {
                        return attempt.error("redirect to private IP blocked");
                    }
                }
                attempt.follow()
            }
            Err(_) => attempt.error("DNS lookup failed during redirect"),
        }
    })
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    pub fn new(opts: Options) -> Result<Self, reqwest::Error> {
        let http_client = match opts.http_client.clone() {
            Some(client) => client,
            None => reqwest::Client::builder()
                .redirect(redirect_policy(opts.allow_private_networks))
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .cookie_store(true)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()?,
        };

        Ok(Self { opts, http_client })
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            headers: self.opts.headers.clone(),
            allow_private_networks: self.opts.allow_private_networks,
        }
    }

    /// Fetch the page at `url` and classify the selectors of every stylesheet it uses.
    ///
    /// Stylesheets that fail to download are left out of the report rather
    /// than failing the call.
    pub async fn analyze(&self, url: &str) -> Result<AnalysisReport, AnalyzeError> {
        analyze(url, self, &self.opts.analyze_options()).await
    }

    /// Analyze markup the caller already has; `url` resolves relative stylesheet links.
    pub async fn analyze_html(&self, html: &str, url: &str) -> Result<AnalysisReport, AnalyzeError> {
        analyze_document(url, html, self, &self.opts.analyze_options()).await
    }
}

impl TextFetcher for Client {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let result = fetch(&self.http_client, url, &self.fetch_options()).await?;
        Ok(result.text())
    }
}
