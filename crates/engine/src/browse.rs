// ABOUTME: Flattens a report into (selector, file) entries and filters them by text and selector kind.
// ABOUTME: Backs the CLI --list/--search/--kind options.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::report::AnalysisReport;

static TAG_SELECTOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z][a-z0-9]*($|[^-_a-z0-9])").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorUsage {
    Used,
    Unused,
}

impl FromStr for SelectorUsage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "used" => Ok(SelectorUsage::Used),
            "unused" => Ok(SelectorUsage::Unused),
            other => Err(format!("unknown selector usage: {}", other)),
        }
    }
}

/// Which selectors to keep when browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorKind {
    #[default]
    All,
    Class,
    Id,
    Tag,
}

impl SelectorKind {
    pub fn matches(self, selector: &str) -> bool {
        match self {
            SelectorKind::All => true,
            SelectorKind::Class => selector.starts_with('.'),
            SelectorKind::Id => selector.starts_with('#'),
            SelectorKind::Tag => TAG_SELECTOR_RE.is_match(selector),
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SelectorKind::All => "all",
            SelectorKind::Class => "class",
            SelectorKind::Id => "id",
            SelectorKind::Tag => "tag",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SelectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(SelectorKind::All),
            "class" => Ok(SelectorKind::Class),
            "id" => Ok(SelectorKind::Id),
            "tag" => Ok(SelectorKind::Tag),
            other => Err(format!("unknown selector kind: {}", other)),
        }
    }
}

/// One selector together with the stylesheet it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorEntry<'a> {
    pub selector: &'a str,
    pub file: &'a str,
}

impl AnalysisReport {
    /// Every used or unused selector across all sources, in source order.
    pub fn selectors(&self, usage: SelectorUsage) -> Vec<SelectorEntry<'_>> {
        self.css_sources
            .iter()
            .flat_map(|source| {
                let list = match usage {
                    SelectorUsage::Used => &source.used_selectors,
                    SelectorUsage::Unused => &source.unused_selectors,
                };
                list.iter().map(move |selector| SelectorEntry {
                    selector,
                    file: &source.locator,
                })
            })
            .collect()
    }
}

/// Keep entries whose selector or file contains `query` (case-insensitive) and whose selector is of `kind`.
pub fn filter_selectors<'a>(
    entries: &[SelectorEntry<'a>],
    query: &str,
    kind: SelectorKind,
) -> Vec<SelectorEntry<'a>> {
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            needle.is_empty()
                || entry.selector.to_lowercase().contains(&needle)
                || entry.file.to_lowercase().contains(&needle)
        })
        .filter(|entry| kind.matches(entry.selector))
        .cloned()
        .collect()
}
