// ABOUTME: CLI binary for cssweep: reports which CSS selectors a page uses.
// ABOUTME: Analyzes a URL or a local HTML file and prints a JSON export or a filtered selector list.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use chrono::Local;
use clap::Parser;
use cssweep_client::{AnalysisReport, Client, ExportFormat, SelectorKind, SelectorUsage};
use cssweep_engine::{export, export_file_name, filter_selectors};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cssweep")]
#[command(about = "Find the CSS selectors a web page does not use", version)]
struct Args {
    /// Page URL to analyze (fetch mode)
    #[arg(conflicts_with = "html")]
    target: Option<String>,

    /// HTML file to analyze instead of fetching the page (requires --url)
    #[arg(long = "html", requires = "url")]
    html: Option<PathBuf>,

    /// Page URL used to resolve stylesheet links in --html mode
    #[arg(long = "url")]
    url: Option<String>,

    /// Export format: full, summary, unused-only, used-only
    #[arg(short = 'f', long = "format", default_value = "summary")]
    format: ExportFormat,

    /// Print used or unused selectors one per line instead of JSON
    #[arg(long = "list")]
    list: Option<SelectorUsage>,

    /// Only list selectors whose text or file contains this string
    #[arg(long = "search", default_value = "")]
    search: String,

    /// Only list selectors of this kind: all, class, id, tag
    #[arg(long = "kind", default_value = "all")]
    kind: SelectorKind,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Save the export as css-analysis-<format>-<date>.json in the current directory
    #[arg(long = "save", conflicts_with = "list")]
    save: bool,

    /// Emit compact JSON instead of pretty
    #[arg(long = "compact")]
    compact: bool,

    /// Overall analysis timeout in seconds
    #[arg(long = "timeout", default_value_t = 60)]
    timeout: u64,

    /// Maximum stylesheet downloads in flight
    #[arg(long = "concurrency", default_value_t = 8)]
    concurrency: usize,

    /// Allow fetching from private/local networks
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Log progress to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn render(report: &AnalysisReport, args: &Args) -> Result<String, serde_json::Error> {
    if let Some(usage) = args.list {
        let entries = report.selectors(usage);
        let lines: Vec<String> = filter_selectors(&entries, &args.search, args.kind)
            .into_iter()
            .map(|entry| format!("{}\t{}", entry.selector, entry.file))
            .collect();
        return Ok(lines.join("\n"));
    }

    let value = export(report, args.format)?;
    if args.compact {
        serde_json::to_string(&value)
    } else {
        serde_json::to_string_pretty(&value)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };
    init_logging(args.verbose);

    if args.html.is_none() && args.target.is_none() {
        eprintln!("error: a page URL is required, or use --html with --url");
        return ExitCode::from(1);
    }

    let client = match Client::builder()
        .allow_private_networks(args.allow_private_networks)
        .analysis_timeout(Some(Duration::from_secs(args.timeout)))
        .max_concurrent_fetches(args.concurrency)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: failed to build HTTP client: {}", e);
            return ExitCode::from(1);
        }
    };

    let start = Instant::now();

    let outcome = match (&args.html, &args.target) {
        (Some(html_path), _) => {
            let url = args.url.as_deref().unwrap_or_default();
            match fs::read_to_string(html_path) {
                Ok(html) => client.analyze_html(&html, url).await,
                Err(e) => {
                    eprintln!("error reading file {:?}: {}", html_path, e);
                    return ExitCode::from(1);
                }
            }
        }
        (None, Some(target)) => client.analyze(target).await,
        (None, None) => unreachable!("checked above"),
    };

    let elapsed = start.elapsed();

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    let output = match render(&report, &args) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("error: failed to serialize report: {}", e);
            return ExitCode::from(1);
        }
    };

    let output_path = match (&args.output, args.save) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(PathBuf::from(export_file_name(
            args.format,
            Local::now().date_naive(),
        ))),
        (None, false) => None,
    };

    if let Some(output_path) = &output_path {
        if let Err(e) = fs::write(output_path, &output) {
            eprintln!("error writing to {:?}: {}", output_path, e);
            return ExitCode::from(1);
        }
    } else {
        println!("{}", output);
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    ExitCode::SUCCESS
}
