// ABOUTME: JSON projections of an AnalysisReport: full, summary, unused-only, and used-only.
// ABOUTME: Pure functions over the finished report; nothing here touches the analysis itself.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::report::AnalysisReport;

/// Shape of an exported report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Full,
    #[default]
    Summary,
    UnusedOnly,
    UsedOnly,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportFormat::Full => "full",
            ExportFormat::Summary => "summary",
            ExportFormat::UnusedOnly => "unused-only",
            ExportFormat::UsedOnly => "used-only",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(ExportFormat::Full),
            "summary" => Ok(ExportFormat::Summary),
            "unused-only" | "unused" => Ok(ExportFormat::UnusedOnly),
            "used-only" | "used" => Ok(ExportFormat::UsedOnly),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// Project `report` into the JSON document for `format`.
pub fn export(report: &AnalysisReport, format: ExportFormat) -> Result<Value, serde_json::Error> {
    let value = match format {
        ExportFormat::Full => serde_json::to_value(report)?,
        ExportFormat::Summary => json!({
            "page_url": report.page_url,
            "summary": report.summary(),
            "generated_at": report.generated_at,
        }),
        ExportFormat::UnusedOnly => json!({
            "page_url": report.page_url,
            "unused_selectors": report
                .css_sources
                .iter()
                .map(|s| json!({ "file": s.locator, "selectors": s.unused_selectors }))
                .collect::<Vec<_>>(),
            "generated_at": report.generated_at,
        }),
        ExportFormat::UsedOnly => json!({
            "page_url": report.page_url,
            "used_selectors": report
                .css_sources
                .iter()
                .map(|s| json!({ "file": s.locator, "selectors": s.used_selectors }))
                .collect::<Vec<_>>(),
            "generated_at": report.generated_at,
        }),
    };
    Ok(value)
}

/// Suggested file name for an export, e.g. `css-analysis-summary-2024-06-15.json`.
pub fn export_file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!("css-analysis-{}-{}.json", format, date.format("%Y-%m-%d"))
}
