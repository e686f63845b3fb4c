// ABOUTME: Result types for an analysis run: per-stylesheet CssSourceResult and the page-level AnalysisReport.
// ABOUTME: Also holds the read-only summary helpers (usage percentage, totals, size in KB).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::is_used;
use crate::tokenizer::tokenize;
use crate::vocabulary::HtmlVocabulary;

/// Locator used for the synthetic source built from a page's `<style>` blocks.
pub const INLINE_CSS_LOCATOR: &str = "Inline CSS";

/// Classification of the selectors in one stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssSourceResult {
    /// Stylesheet URL, or [`INLINE_CSS_LOCATOR`].
    pub locator: String,
    pub total_selectors: usize,
    pub used_selectors: Vec<String>,
    pub unused_selectors: Vec<String>,
    pub size_bytes: usize,
    /// Set when the stylesheet could not be retrieved; all other counts are then empty.
    pub fetch_error: Option<String>,
}

impl CssSourceResult {
    /// Tokenize `css` and partition its selectors against `vocabulary`.
    pub fn analyze(locator: impl Into<String>, css: &str, vocabulary: &HtmlVocabulary) -> Self {
        let selectors = tokenize(css);
        let total_selectors = selectors.len();
        let (used_selectors, unused_selectors): (Vec<String>, Vec<String>) = selectors
            .into_iter()
            .partition(|selector| is_used(selector, vocabulary));

        Self {
            locator: locator.into(),
            total_selectors,
            used_selectors,
            unused_selectors,
            size_bytes: css.len(),
            fetch_error: None,
        }
    }

    /// An entry for a stylesheet whose retrieval failed.
    pub fn failed(locator: impl Into<String>, error: impl ToString) -> Self {
        Self {
            locator: locator.into(),
            fetch_error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.fetch_error.is_some()
    }

    pub fn is_inline(&self) -> bool {
        self.locator == INLINE_CSS_LOCATOR
    }

    /// Share of used selectors as a rounded whole percentage; 0 for an empty sheet.
    pub fn usage_percentage(&self) -> u32 {
        percentage(self.used_selectors.len(), self.total_selectors)
    }

    /// Size rounded to the nearest KiB.
    pub fn size_kb(&self) -> u64 {
        (self.size_bytes as f64 / 1024.0).round() as u64
    }
}

pub(crate) fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Outcome of analyzing one page.
///
/// `css_sources` lists external stylesheets in discovery order followed by
/// the inline source. Stylesheets that failed to download are not included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub page_url: String,
    pub css_sources: Vec<CssSourceResult>,
    pub vocabulary: HtmlVocabulary,
    pub generated_at: DateTime<Utc>,
}

/// Aggregate counts over every source in a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub css_files_count: usize,
    pub total_selectors: usize,
    pub used_selectors: usize,
    pub unused_selectors: usize,
    pub usage_percentage: u32,
    pub html_classes: usize,
    pub html_ids: usize,
    pub html_tags: usize,
}

impl AnalysisReport {
    pub fn summary(&self) -> UsageSummary {
        let total_selectors: usize = self.css_sources.iter().map(|s| s.total_selectors).sum();
        let used_selectors: usize = self.css_sources.iter().map(|s| s.used_selectors.len()).sum();
        let unused_selectors: usize = self
            .css_sources
            .iter()
            .map(|s| s.unused_selectors.len())
            .sum();

        UsageSummary {
            css_files_count: self.css_sources.len(),
            total_selectors,
            used_selectors,
            unused_selectors,
            usage_percentage: percentage(used_selectors, total_selectors),
            html_classes: self.vocabulary.classes.len(),
            html_ids: self.vocabulary.ids.len(),
            html_tags: self.vocabulary.tags.len(),
        }
    }

    /// Look up a source by its locator.
    pub fn source(&self, locator: &str) -> Option<&CssSourceResult> {
        self.css_sources.iter().find(|s| s.locator == locator)
    }
}
