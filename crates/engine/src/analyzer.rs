// ABOUTME: Orchestrates one analysis run: fetch the page, locate stylesheets, fetch them, classify selectors.
// ABOUTME: Network access goes through the TextFetcher trait; stylesheet failures are logged and dropped.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::error::{AnalyzeError, FetchError};
use crate::locator::locate;
use crate::report::{AnalysisReport, CssSourceResult, INLINE_CSS_LOCATOR};
use crate::vocabulary::{extract_vocabulary, HtmlVocabulary};

/// Retrieves text content by URL.
pub trait TextFetcher: Sync {
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Tuning for an analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Upper bound on stylesheet downloads in flight; 1 fetches sequentially.
    pub max_concurrent_fetches: usize,
    /// Deadline for the whole run, page fetch included.
    pub timeout: Option<Duration>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 8,
            timeout: Some(Duration::from_secs(60)),
        }
    }
}

async fn with_deadline<T>(
    url: &str,
    timeout: Option<Duration>,
    fut: impl Future<Output = Result<T, AnalyzeError>>,
) -> Result<T, AnalyzeError> {
    match timeout {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| AnalyzeError::Timeout {
                url: url.to_string(),
                after,
            })?,
        None => fut.await,
    }
}

/// Analyze the page at `page_url`, retrieving it and its stylesheets through `fetcher`.
///
/// Fails only when the page URL is invalid, the page cannot be fetched, or
/// the deadline in `opts` expires.
pub async fn analyze<F: TextFetcher>(
    page_url: &str,
    fetcher: &F,
    opts: &AnalyzeOptions,
) -> Result<AnalysisReport, AnalyzeError> {
    validate_page_url(page_url)?;

    with_deadline(page_url, opts.timeout, async {
        let html = fetcher
            .fetch_text(page_url)
            .await
            .map_err(AnalyzeError::PageFetch)?;
        Ok::<_, AnalyzeError>(run(page_url, &html, fetcher, opts).await)
    })
    .await
}

/// Analyze `html` already retrieved for `page_url`; only stylesheets are fetched.
pub async fn analyze_document<F: TextFetcher>(
    page_url: &str,
    html: &str,
    fetcher: &F,
    opts: &AnalyzeOptions,
) -> Result<AnalysisReport, AnalyzeError> {
    validate_page_url(page_url)?;

    with_deadline(page_url, opts.timeout, async {
        Ok::<_, AnalyzeError>(run(page_url, html, fetcher, opts).await)
    })
    .await
}

fn validate_page_url(page_url: &str) -> Result<(), AnalyzeError> {
    match url::Url::parse(page_url) {
        Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Ok(()),
        _ => Err(AnalyzeError::InvalidUrl {
            url: page_url.to_string(),
        }),
    }
}

async fn run<F: TextFetcher>(
    page_url: &str,
    html: &str,
    fetcher: &F,
    opts: &AnalyzeOptions,
) -> AnalysisReport {
    let located = locate(html, page_url);
    let vocabulary = extract_vocabulary(html);
    info!(
        page_url,
        stylesheets = located.css_locations.len(),
        inline_blocks = located.inline_blocks.len(),
        classes = vocabulary.classes.len(),
        ids = vocabulary.ids.len(),
        tags = vocabulary.tags.len(),
        "starting analysis"
    );

    let mut results =
        fetch_and_analyze(&located.css_locations, fetcher, &vocabulary, opts.max_concurrent_fetches)
            .await;

    if !located.inline_blocks.is_empty() {
        let inline_css = located.inline_blocks.join("\n");
        results.push(CssSourceResult::analyze(
            INLINE_CSS_LOCATOR,
            &inline_css,
            &vocabulary,
        ));
    }

    let css_sources: Vec<CssSourceResult> = results
        .into_iter()
        .filter(|result| match &result.fetch_error {
            Some(err) => {
                warn!(locator = %result.locator, error = %err, "dropping stylesheet that failed to load");
                false
            }
            None => true,
        })
        .collect();

    info!(page_url, sources = css_sources.len(), "analysis complete");

    AnalysisReport {
        page_url: page_url.to_string(),
        css_sources,
        vocabulary,
        generated_at: Utc::now(),
    }
}

/// Fetch every location with bounded concurrency and classify each sheet.
///
/// Results come back in the order of `locations`, whatever order the
/// downloads finish in.
async fn fetch_and_analyze<F: TextFetcher>(
    locations: &[String],
    fetcher: &F,
    vocabulary: &HtmlVocabulary,
    max_concurrent: usize,
) -> Vec<CssSourceResult> {
    stream::iter(locations)
        .map(move |location| async move {
            debug!(%location, "fetching stylesheet");
            match fetcher.fetch_text(location).await {
                Ok(css) => {
                    let result = CssSourceResult::analyze(location.as_str(), &css, vocabulary);
                    debug!(
                        %location,
                        total = result.total_selectors,
                        unused = result.unused_selectors.len(),
                        "analyzed stylesheet"
                    );
                    result
                }
                Err(err) => CssSourceResult::failed(location.as_str(), err),
            }
        })
        .buffered(max_concurrent.max(1))
        .collect::<Vec<_>>()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    struct MapFetcher(HashMap<&'static str, &'static str>);

    impl TextFetcher for MapFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
            self.0
                .get(url)
                .map(|body| body.to_string())
                .ok_or_else(|| FetchError::fetch(url, "Fetch", Some(anyhow::anyhow!("HTTP status 404"))))
        }
    }

    #[tokio::test]
    async fn analyze_document_classifies_inline_css() {
        let fetcher = MapFetcher(HashMap::new());
        let html = r#"<style>.card{} .missing{}</style><div class="card"></div>"#;
        let report = analyze_document("https://site.test/", html, &fetcher, &AnalyzeOptions::default())
            .await
            .expect("analysis should succeed");

        assert_eq!(report.css_sources.len(), 1);
        let inline = &report.css_sources[0];
        assert_eq!(inline.locator, INLINE_CSS_LOCATOR);
        assert_eq!(inline.used_selectors, vec![".card"]);
        assert_eq!(inline.unused_selectors, vec![".missing"]);
    }

    #[tokio::test]
    async fn rejects_non_http_page_url() {
        let fetcher = MapFetcher(HashMap::new());
        let err = analyze("ftp://site.test/", &fetcher, &AnalyzeOptions::default())
            .await
            .expect_err("ftp is not analyzable");
        assert!(matches!(err, AnalyzeError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn page_fetch_failure_is_fatal() {
        let fetcher = MapFetcher(HashMap::new());
        let err = analyze("https://site.test/", &fetcher, &AnalyzeOptions::default())
            .await
            .expect_err("missing page must fail");
        assert!(err.is_page_fetch());
    }

    #[tokio::test]
    async fn zero_concurrency_still_fetches() {
        let fetcher = MapFetcher(HashMap::from([
            ("https://site.test/", r#"<link rel="stylesheet" href="/a.css"><p></p>"#),
            ("https://site.test/a.css", "p{} .x{}"),
        ]));
        let opts = AnalyzeOptions {
            max_concurrent_fetches: 0,
            timeout: None,
        };
        let report = analyze("https://site.test/", &fetcher, &opts).await.unwrap();
        assert_eq!(report.css_sources.len(), 1);
        assert_eq!(report.css_sources[0].used_selectors, vec!["p"]);
    }
}
