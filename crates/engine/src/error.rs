// ABOUTME: Error types for cssweep: FetchError for a single retrieval and AnalyzeError for a whole run.
// ABOUTME: FetchError carries a category code, the failing URL, and the underlying cause.

use std::fmt;
use std::time::Duration;

/// Error codes representing different categories of fetch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorCode {
    InvalidUrl,
    Fetch,
    Timeout,
    Ssrf,
}

impl fmt::Display for FetchErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchErrorCode::InvalidUrl => "invalid URL",
            FetchErrorCode::Fetch => "fetch error",
            FetchErrorCode::Timeout => "timeout",
            FetchErrorCode::Ssrf => "SSRF blocked",
        };
        write!(f, "{}", s)
    }
}

/// A failure to retrieve text content for a URL.
#[derive(Debug, thiserror::Error)]
pub struct FetchError {
    pub code: FetchErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cssweep: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl FetchError {
    fn with_code(
        code: FetchErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(FetchErrorCode::InvalidUrl, url, op, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(FetchErrorCode::Fetch, url, op, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(FetchErrorCode::Timeout, url, op, source)
    }

    /// Create an SSRF error.
    pub fn ssrf(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(FetchErrorCode::Ssrf, url, op, source)
    }

    pub fn is_invalid_url(&self) -> bool {
        self.code == FetchErrorCode::InvalidUrl
    }

    pub fn is_fetch(&self) -> bool {
        self.code == FetchErrorCode::Fetch
    }

    pub fn is_timeout(&self) -> bool {
        self.code == FetchErrorCode::Timeout
    }

    pub fn is_ssrf(&self) -> bool {
        self.code == FetchErrorCode::Ssrf
    }
}

/// Errors that abort a whole analysis run.
///
/// A stylesheet that cannot be retrieved is not an `AnalyzeError`: it is
/// dropped from the report and logged, so a successful report may cover
/// fewer sources than the page references.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// The page URL is not an absolute http(s) URL.
    #[error("invalid page URL: {url}")]
    InvalidUrl { url: String },

    /// The page itself could not be retrieved.
    #[error("failed to fetch page: {0}")]
    PageFetch(#[source] FetchError),

    /// The overall analysis deadline expired before all fetches settled.
    #[error("analysis of {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },
}

impl AnalyzeError {
    pub fn is_page_fetch(&self) -> bool {
        matches!(self, AnalyzeError::PageFetch(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AnalyzeError::Timeout { .. })
    }
}
