// ABOUTME: Locates the stylesheets a page references: linked files, inline @import targets, and style blocks.
// ABOUTME: Resolves every href against the page URL and deduplicates in first-occurrence order.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;
use url::Url;

static LINK_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<link\b[^>]*>").unwrap());
static REL_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\srel\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).unwrap());
static HREF_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\shref\s*=\s*["']([^"']+)["']"#).unwrap());
static STYLE_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").unwrap());
static IMPORT_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)@import\s+url\(["']?([^"')]+)["']?\);?"#).unwrap());
static IMPORT_STATEMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@import\s+url\([^)]+\);?").unwrap());

/// Stylesheet references found in one HTML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatedStyles {
    /// Absolute URLs of external stylesheets and `@import` targets, deduplicated.
    pub css_locations: Vec<String>,
    /// Non-empty `<style>` block contents with `@import` statements removed, in document order.
    pub inline_blocks: Vec<String>,
}

impl LocatedStyles {
    pub fn is_empty(&self) -> bool {
        self.css_locations.is_empty() && self.inline_blocks.is_empty()
    }
}

/// Resolve an href found in a page against the page URL.
///
/// `http(s)://` values pass through untouched; scheme-relative and
/// root-relative values inherit from the base; anything else goes through
/// standard URL joining. Returns `None` when the base cannot be parsed.
pub fn resolve_url(href: &str, base_url: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }

    let base = Url::parse(base_url).ok()?;
    if href.starts_with("//") {
        return Some(format!("{}:{}", base.scheme(), href));
    }
    if href.starts_with('/') {
        let host = base.host_str()?;
        return Some(match base.port() {
            Some(port) => format!("{}://{}:{}{}", base.scheme(), host, port, href),
            None => format!("{}://{}{}", base.scheme(), host, href),
        });
    }

    base.join(href).ok().map(String::from)
}

fn is_stylesheet_link(tag: &str) -> bool {
    REL_ATTR_RE
        .captures(tag)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|rel| {
            rel.as_str()
                .split_whitespace()
                .any(|token| token.eq_ignore_ascii_case("stylesheet"))
        })
        .unwrap_or(false)
}

/// Find every stylesheet location and inline style block in `html`.
pub fn locate(html: &str, base_url: &str) -> LocatedStyles {
    let mut hrefs: Vec<&str> = Vec::new();

    for tag in LINK_TAG_RE.find_iter(html) {
        let tag = tag.as_str();
        if !is_stylesheet_link(tag) {
            continue;
        }
        if let Some(caps) = HREF_ATTR_RE.captures(tag) {
            if let Some(href) = caps.get(1) {
                hrefs.push(href.as_str());
            }
        }
    }

    let mut inline_blocks = Vec::new();
    for caps in STYLE_BLOCK_RE.captures_iter(html) {
        let Some(body) = caps.get(1) else { continue };
        let body = body.as_str();

        for import in IMPORT_URL_RE.captures_iter(body) {
            if let Some(href) = import.get(1) {
                hrefs.push(href.as_str());
            }
        }

        let cleaned = IMPORT_STATEMENT_RE.replace_all(body.trim(), "");
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            inline_blocks.push(cleaned.to_string());
        }
    }

    let mut seen = HashSet::new();
    let mut css_locations = Vec::new();
    for href in hrefs {
        match resolve_url(href, base_url) {
            Some(location) => {
                if seen.insert(location.clone()) {
                    css_locations.push(location);
                }
            }
            None => warn!(href, base_url, "dropping stylesheet href that cannot be resolved"),
        }
    }

    LocatedStyles {
        css_locations,
        inline_blocks,
    }
}
