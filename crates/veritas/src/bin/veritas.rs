// ABOUTME: CLI binary for the Veritas credibility pipeline.
// ABOUTME: Analyzes URLs or saved HTML files and prints a report per page, as text or JSON.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use veritas::{
    AnalysisReport, AnalyzerBuilder, BadgeSink, ExtractedContent, Mode, Options, PageInput,
    Presenter, Session, Status,
};

const PREVIEW_CHARS: usize = 160;

#[derive(Parser, Debug)]
#[command(name = "veritas")]
#[command(about = "Extract article text and score its credibility")]
struct Args {
    /// Scoring mode: local (default) or remote
    #[arg(short = 'm', long = "mode")]
    mode: Option<Mode>,

    /// Remote scoring endpoint (remote mode)
    #[arg(long = "endpoint")]
    endpoint: Option<String>,

    /// Minimum words before the local scorer runs
    #[arg(long = "min-words")]
    min_words: Option<usize>,

    /// Request timeout in seconds
    #[arg(long = "timeout")]
    timeout: Option<u64>,

    /// Output as JSON instead of a text report
    #[arg(long = "json")]
    json_output: bool,

    /// HTML file to analyze (requires --url)
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// URL context for HTML file analysis (required with --html)
    #[arg(long = "url")]
    url: Option<String>,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// URLs to analyze (fetch mode)
    #[arg()]
    urls: Vec<String>,
}

/// Terminal presenter: status and badge go to stderr, the report is kept for output.
#[derive(Default)]
struct TerminalPresenter {
    badge: Mutex<Option<String>>,
    extraction: Mutex<Option<ExtractedContent>>,
    report: Mutex<Option<AnalysisReport>>,
}

impl TerminalPresenter {
    fn take(&self) -> (Option<String>, Option<ExtractedContent>, Option<AnalysisReport>) {
        let badge = self.badge.lock().ok().and_then(|mut b| b.take());
        let extraction = self.extraction.lock().ok().and_then(|mut e| e.take());
        let report = self.report.lock().ok().and_then(|mut r| r.take());
        (badge, extraction, report)
    }
}

impl BadgeSink for TerminalPresenter {
    fn set_badge(&self, text: &str) {
        if let Ok(mut badge) = self.badge.lock() {
            *badge = Some(text.to_string());
        }
    }
}

impl Presenter for TerminalPresenter {
    fn set_status(&self, status: Status) {
        let _ = writeln!(io::stderr(), "status: {}", status);
    }

    fn set_trigger_enabled(&self, _enabled: bool) {}

    fn show_extraction(&self, content: &ExtractedContent) {
        tracing::debug!(
            paragraphs = content.paragraph_count,
            chars = content.char_count,
            preview = %content.preview(PREVIEW_CHARS),
            "extraction"
        );
        if let Ok(mut slot) = self.extraction.lock() {
            *slot = Some(content.clone());
        }
    }

    fn render_report(&self, report: &AnalysisReport) {
        if let Ok(mut slot) = self.report.lock() {
            *slot = Some(report.clone());
        }
    }
}

/// One page's result as printed by `--json`.
#[derive(Debug, Serialize)]
struct PageResult {
    url: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    badge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extraction: Option<ExtractedContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<AnalysisReport>,
}

impl PageResult {
    fn format_text(&self) -> String {
        match self.report {
            Some(ref report) => report.format_text(),
            None => format!("{}: {}", self.url, self.status),
        }
    }
}

fn format_output(results: &[PageResult], json_output: bool) -> anyhow::Result<String> {
    if json_output {
        let out = if results.len() == 1 {
            serde_json::to_string_pretty(&results[0])?
        } else {
            serde_json::to_string_pretty(results)?
        };
        Ok(out)
    } else {
        Ok(results
            .iter()
            .map(PageResult::format_text)
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

fn options_from(args: &Args) -> Options {
    let mut opts = Options::from_env();
    if let Some(mode) = args.mode {
        opts.mode = mode;
    }
    if let Some(ref endpoint) = args.endpoint {
        opts.endpoint = endpoint.clone();
    }
    if let Some(min_words) = args.min_words {
        opts.min_words = min_words;
    }
    if let Some(secs) = args.timeout {
        opts.timeout = Duration::from_secs(secs);
    }
    opts
}

fn inputs_from(args: &Args) -> anyhow::Result<Vec<(String, PageInput)>> {
    if let Some(ref html_path) = args.html {
        let url = args
            .url
            .clone()
            .context("--url is required when using --html")?;
        let html = fs::read_to_string(html_path)
            .with_context(|| format!("reading file {:?}", html_path))?;
        return Ok(vec![(url.clone(), PageInput::Html { html, url })]);
    }

    Ok(args
        .urls
        .iter()
        .map(|url| (url.clone(), PageInput::Url(url.clone())))
        .collect())
}

async fn run(args: Args) -> anyhow::Result<bool> {
    if args.html.is_none() && args.urls.is_empty() {
        anyhow::bail!("at least one URL is required, or use --html with --url");
    }
    if args.html.is_some() && !args.urls.is_empty() {
        anyhow::bail!("cannot use both --html and positional URLs");
    }

    let inputs = inputs_from(&args)?;
    let presenter = Arc::new(TerminalPresenter::default());
    let analyzer = AnalyzerBuilder::from_options(options_from(&args)).build();
    let session = Session::new(analyzer, Arc::clone(&presenter));

    let start = Instant::now();
    let mut results = Vec::new();
    let mut had_error = false;

    for (url, input) in inputs {
        let status = session.trigger(Some(input)).await.unwrap_or(Status::Error);
        had_error |= status == Status::Error;

        let (badge, extraction, report) = presenter.take();
        results.push(PageResult {
            url,
            status: status.to_string(),
            badge,
            extraction,
            report,
        });
    }

    let elapsed = start.elapsed();

    println!("{}", format_output(&results, args.json_output)?);

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    Ok(had_error)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(Args::parse()).await {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
