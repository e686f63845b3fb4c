// ABOUTME: HTTP retrieval of pages and stylesheets for cssweep.
// ABOUTME: Handles SSRF protection, content-length limits, timeouts, and charset decoding.

use std::collections::HashMap;
use std::net::IpAddr;

use bytes::Bytes;
use cssweep_engine::FetchError;
use ipnet::{Ipv4Net, Ipv6Net};
use tracing::debug;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

const OP: &str = "Fetch";

/// Options for fetching a resource.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub allow_private_networks: bool,
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as text, using the charset from the content-type header when present.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Check if an IP address is in a private/reserved range.
pub(crate) fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => {
            const V4_BLOCKED: [&str; 5] = [
                "10.0.0.0/8",
                "172.16.0.0/12",
                "192.168.0.0/16",
                "127.0.0.0/8",
                "169.254.0.0/16",
            ];
            V4_BLOCKED
                .iter()
                .filter_map(|net| net.parse::<Ipv4Net>().ok())
                .any(|net| net.contains(ip))
        }
        IpAddr::V6(ip) => {
            if ip.is_loopback() {
                return true;
            }
            // Unique local fc00::/7 and link-local fe80::/10
            ["fc00::/7", "fe80::/10"]
                .iter()
                .filter_map(|net| net.parse::<Ipv6Net>().ok())
                .any(|net| net.contains(ip))
        }
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(charset) = content_type.and_then(extract_charset) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
            let (decoded, _, _) = encoding.decode(body);
            return decoded.into_owned();
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    lower.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|charset| charset.trim_matches('"').trim_matches('\'').to_string())
    })
}

/// Reject hosts that are, or resolve to, private addresses.
async fn check_host(url: &str, target: &url::Url, reason: &'static str) -> Result<(), FetchError> {
    let Some(host) = target.host_str() else {
        return Ok(());
    };

    if let Ok(ip) = host.trim_matches(|c| c == '[' || c == ']').parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(FetchError::ssrf(
                url,
                OP,
                Some(anyhow::anyhow!(reason)),
            ));
        }
        return Ok(());
    }

    let port = target.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host((host, port)).await.map_err(|e| {
        FetchError::fetch(url, OP, Some(anyhow::anyhow!("DNS lookup failed: {}", e)))
    })?;

    for socket_addr in addrs {
        if is_private_ip(&socket_addr.ip()) {
            return Err(FetchError::ssrf(
                url,
                OP,
                Some(anyhow::anyhow!(reason)),
            ));
        }
    }
    Ok(())
}

fn request_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::timeout(url, OP, Some(anyhow::anyhow!("request timed out: {}", e)))
    } else {
        FetchError::fetch(url, OP, Some(anyhow::anyhow!("request failed: {}", e)))
    }
}

/// Fetch a resource from the given URL.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, FetchError> {
    if url.is_empty() {
        return Err(FetchError::invalid_url(url, OP, None));
    }

    let parsed_url = url::Url::parse(url).map_err(|e| {
        FetchError::invalid_url(url, OP, Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    let scheme = parsed_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(FetchError::invalid_url(
            url,
            OP,
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }

    if !opts.allow_private_networks {
        check_host(url, &parsed_url, "private IP addresses are not allowed").await?;
    }

    let mut request = client.get(url);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    debug!(url, "sending request");
    let response = request.send().await.map_err(|e| request_error(url, e))?;

    if !opts.allow_private_networks {
        let final_url = response.url().clone();
        check_host(url, &final_url, "redirect to private IP address is not allowed").await?;
    }

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(FetchError::fetch(
                url,
                OP,
                Some(anyhow::anyhow!("content too large")),
            ));
        }
    }

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    if status != 200 {
        return Err(FetchError::fetch(
            url,
            OP,
            Some(anyhow::anyhow!("HTTP status {}", status)),
        ));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response.bytes().await.map_err(|e| request_error(url, e))?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(FetchError::fetch(
            url,
            OP,
            Some(anyhow::anyhow!("content too large")),
        ));
    }

    debug!(url, %final_url, bytes = body.len(), "fetched");

    Ok(FetchResult { content_type, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    fn create_test_client() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent("test-agent")
            .build()
            .unwrap()
    }

    fn permissive() -> FetchOptions {
        FetchOptions {
            allow_private_networks: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fetch_ok_utf8() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/site.css");
            then.status(200)
                .header("content-type", "text/css; charset=utf-8")
                .body(".a { color: red }");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/site.css"), &permissive()).await;
        mock.assert();

        let result = result.expect("fetch should succeed");
        assert_eq!(result.text(), ".a { color: red }");
        assert_eq!(result.content_type.as_deref(), Some("text/css; charset=utf-8"));
    }

    #[tokio::test]
    async fn fetch_non_200_rejected() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing.css");
            then.status(404).body("not found");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/missing.css"), &permissive()).await;
        mock.assert();

        let err = result.expect_err("should fail on 404");
        assert!(err.is_fetch());
        assert!(err.to_string().contains("HTTP status 404"));
    }

    #[tokio::test]
    async fn fetch_redirect_is_followed() {
        let server = MockServer::start();
        let _old = server.mock(|when, then| {
            when.method(GET).path("/old.css");
            then.status(301).header("location", server.url("/new.css"));
        });
        let new = server.mock(|when, then| {
            when.method(GET).path("/new.css");
            then.status(200).body(".moved {}");
        });

        let client = create_test_client();
        let result = fetch(&client, &server.url("/old.css"), &permissive())
            .await
            .expect("redirect should be followed");
        new.assert();
        assert_eq!(result.text(), ".moved {}");
    }

    #[tokio::test]
    async fn fetch_sends_custom_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/page").header("x-token", "abc");
            then.status(200).body("<p></p>");
        });

        let client = create_test_client();
        let mut opts = permissive();
        opts.headers.insert("x-token".to_string(), "abc".to_string());
        let result = fetch(&client, &server.url("/page"), &opts).await;
        mock.assert();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn rejects_bad_urls() {
        let client = create_test_client();
        let opts = permissive();

        let err = fetch(&client, "", &opts).await.expect_err("empty URL");
        assert!(err.is_invalid_url());

        let err = fetch(&client, "not a url", &opts).await.expect_err("garbage URL");
        assert!(err.is_invalid_url());

        let err = fetch(&client, "file:///etc/passwd", &opts)
            .await
            .expect_err("file scheme");
        assert!(err.is_invalid_url());
    }

    #[tokio::test]
    async fn private_ip_blocked() {
        let server = MockServer::start();
        let client = create_test_client();
        let opts = FetchOptions::default();

        let url = format!("http://127.0.0.1:{}/test", server.port());
        let err = fetch(&client, &url, &opts).await.expect_err("private IP");
        assert!(err.is_ssrf());
    }

    #[tokio::test]
    async fn request_timeout_maps_to_timeout() {
        let server = MockServer::start();
        let _mock = server.mock(|when, then| {
            when.method(GET).path("/slow.css");
            then.status(200)
                .delay(std::time::Duration::from_millis(500))
                .body(".a{}");
        });

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(50))
            .build()
            .unwrap();
        let err = fetch(&client, &server.url("/slow.css"), &permissive())
            .await
            .expect_err("should time out");
        assert!(err.is_timeout());
    }

    #[test]
    fn max_content_length_constant() {
        assert_eq!(MAX_CONTENT_LENGTH, 10 * 1024 * 1024);
    }

    #[test]
    fn is_private_ip_v4() {
        assert!(is_private_ip(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_ip(&"172.16.0.1".parse().unwrap()));
        assert!(is_private_ip(&"172.31.255.255".parse().unwrap()));
        assert!(is_private_ip(&"192.168.1.1".parse().unwrap()));
        assert!(is_private_ip(&"127.0.0.1".parse().unwrap()));
        assert!(is_private_ip(&"169.254.0.1".parse().unwrap()));

        assert!(!is_private_ip(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_ip(&"172.32.0.1".parse().unwrap()));
    }

    #[test]
    fn is_private_ip_v6() {
        assert!(is_private_ip(&"::1".parse().unwrap()));
        assert!(is_private_ip(&"fd00::1".parse().unwrap()));
        assert!(is_private_ip(&"fe80::1".parse().unwrap()));
        assert!(!is_private_ip(&"2001:4860:4860::8888".parse().unwrap()));
    }

    #[test]
    fn charset_extraction() {
        assert_eq!(
            extract_charset("text/css; charset=ISO-8859-1"),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(
            extract_charset("text/html; charset=\"utf-8\""),
            Some("utf-8".to_string())
        );
        assert_eq!(extract_charset("text/css"), None);
    }

    #[test]
    fn decode_latin1_with_header() {
        let body: &[u8] = &[0x2e, 0x63, 0x61, 0x66, 0xe9, 0x7b, 0x7d];
        assert_eq!(decode_body(body, Some("text/css; charset=iso-8859-1")), ".café{}");
    }

    #[test]
    fn decode_utf8_without_header() {
        assert_eq!(decode_body(".a{}".as_bytes(), None), ".a{}");
    }
}
