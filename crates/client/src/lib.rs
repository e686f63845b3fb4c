// ABOUTME: Library entry point for the cssweep HTTP client.
// ABOUTME: Re-exports Client, ClientBuilder, Options, and the engine types callers need.

//! cssweep client - analyze live pages for unused CSS.
//!
//! # Example
//!
//! ```no_run
//! use cssweep_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Client::builder().build()?;
//!     let report = client.analyze("https://example.com/").await?;
//!     for source in &report.css_sources {
//!         println!("{}: {} unused", source.locator, source.unused_selectors.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod options;
pub mod resource;

pub use crate::client::Client;
pub use crate::options::{ClientBuilder, Options, DEFAULT_USER_AGENT};
pub use cssweep_engine::{
    AnalysisReport, AnalyzeError, CssSourceResult, ExportFormat, FetchError, HtmlVocabulary,
    SelectorKind, SelectorUsage,
};
