// ABOUTME: Main library entry point for the cssweep engine.
// ABOUTME: Re-exports the extraction, classification, and orchestration API plus the report types.

//! cssweep engine - finds which CSS selectors a page actually uses.
//!
//! The engine scans HTML and CSS with regular expressions rather than
//! parsing them: it locates a page's stylesheets, harvests the class, id,
//! and tag names present in its markup, splits each stylesheet into
//! selectors, and classifies every selector as used or unused.
//!
//! Network access is left to the caller through [`TextFetcher`].
//!
//! # Example
//!
//! ```
//! use cssweep_engine::{extract_vocabulary, is_used, tokenize};
//!
//! let vocabulary = extract_vocabulary(r#"<div class="card"><p>Hi</p></div>"#);
//! let selectors = tokenize(".card { color: red } .missing { color: blue }");
//! let used: Vec<_> = selectors.iter().filter(|s| is_used(s, &vocabulary)).collect();
//! assert_eq!(used, vec![".card"]);
//! ```

pub mod analyzer;
pub mod browse;
pub mod classifier;
pub mod error;
pub mod export;
pub mod locator;
pub mod report;
pub mod tokenizer;
pub mod vocabulary;

pub use crate::analyzer::{analyze, analyze_document, AnalyzeOptions, TextFetcher};
pub use crate::browse::{filter_selectors, SelectorEntry, SelectorKind, SelectorUsage};
pub use crate::classifier::{is_used, simplify};
pub use crate::error::{AnalyzeError, FetchError, FetchErrorCode};
pub use crate::export::{export, export_file_name, ExportFormat};
pub use crate::locator::{locate, resolve_url, LocatedStyles};
pub use crate::report::{AnalysisReport, CssSourceResult, UsageSummary, INLINE_CSS_LOCATOR};
pub use crate::tokenizer::tokenize;
pub use crate::vocabulary::{extract_vocabulary, HtmlVocabulary};
