// ABOUTME: The Analyzer sequences extraction, the article gate and local or remote scoring.
// ABOUTME: Provides async analyze_html(), analyze_url() and analyze_extraction() entry points.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::claims::extract_claims;
use crate::coordinator::{CoordinatorHandle, ScorePayload};
use crate::error::AnalyzeError;
use crate::extract::{extract_page, Extraction};
use crate::options::{AnalyzerBuilder, Mode, Options};
use crate::present::BadgeSink;
use crate::remote::RemoteScorer;
use crate::report::AnalysisReport;
use crate::resource::fetch_page;
use crate::scoring::Verdict;

/// Result of one pipeline run that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The gate admitted the text and a verdict was produced.
    Scored {
        extraction: Extraction,
        report: AnalysisReport,
    },
    /// The gate rejected the text. Nothing was scored.
    NoText { extraction: Extraction },
}

impl Outcome {
    pub fn extraction(&self) -> &Extraction {
        match self {
            Outcome::Scored { extraction, .. } | Outcome::NoText { extraction } => extraction,
        }
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Outcome::Scored { report, .. } => Some(report),
            Outcome::NoText { .. } => None,
        }
    }
}

/// Runs the extraction and scoring pipeline.
pub struct Analyzer {
    opts: Options,
    http_client: reqwest::Client,
    remote: RemoteScorer,
    coordinator: OnceCell<CoordinatorHandle>,
    badge: Option<Arc<dyn BadgeSink>>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("opts", &self.opts)
            .field("coordinator", &self.coordinator.get())
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Create a new AnalyzerBuilder for configuring the analyzer.
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Create a new Analyzer with the given options.
    pub fn new(opts: Options) -> Self {
        let http_client = opts.http_client.clone().unwrap_or_else(|| {
            reqwest::Client::builder()
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .unwrap_or_else(|e| {
                    warn!(error = %e, "falling back to default HTTP client");
                    reqwest::Client::new()
                })
        });

        let remote = RemoteScorer::new(http_client.clone(), opts.endpoint.clone())
            .with_headers(opts.headers.clone());

        Self {
            opts,
            http_client,
            remote,
            coordinator: OnceCell::new(),
            badge: None,
        }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Route the coordinator's score badge to `badge`.
    ///
    /// A coordinator that is already running is dropped; the next local score
    /// starts a fresh one wired to the new sink.
    pub fn set_badge(&mut self, badge: Arc<dyn BadgeSink>) {
        self.badge = Some(badge);
        self.coordinator = OnceCell::new();
    }

    /// Fetch a page and analyze it.
    pub async fn analyze_url(&self, url: &str) -> Result<Outcome, AnalyzeError> {
        let extraction = self.capture_url(url).await?;
        self.analyze_extraction(extraction).await
    }

    /// Analyze already-rendered HTML.
    pub async fn analyze_html(&self, html: &str, url: &str) -> Result<Outcome, AnalyzeError> {
        self.analyze_extraction(extract_page(html, url)).await
    }

    /// Fetch a page and run only the extraction step.
    pub async fn capture_url(&self, url: &str) -> Result<Extraction, AnalyzeError> {
        let page = fetch_page(&self.http_client, url, &self.opts.headers).await?;
        Ok(extract_page(&page.html(), &page.final_url))
    }

    /// Gate and score an extraction.
    pub async fn analyze_extraction(&self, extraction: Extraction) -> Result<Outcome, AnalyzeError> {
        let gate = self.opts.gate();
        if !gate.admits(&extraction.content) {
            info!(url = %extraction.url, ?gate, "not article-like, skipping scoring");
            return Ok(Outcome::NoText { extraction });
        }

        let report = match self.opts.mode {
            Mode::Local => self.score_local(&extraction).await?,
            Mode::Remote => self.score_remote(&extraction).await?,
        };

        Ok(Outcome::Scored { extraction, report })
    }

    async fn coordinator(&self) -> &CoordinatorHandle {
        self.coordinator
            .get_or_init(|| async { CoordinatorHandle::spawn(self.badge.clone()) })
            .await
    }

    async fn score_local(&self, extraction: &Extraction) -> Result<AnalysisReport, AnalyzeError> {
        let payload = ScorePayload::new(
            extraction.content.text.clone(),
            extraction.url.clone(),
            extraction.title.clone(),
        );
        let response = self.coordinator().await.score_article(&payload).await?;

        if !response.ok {
            return Err(AnalyzeError::channel(
                "ScoreArticle",
                Some(anyhow::anyhow!(
                    "{}",
                    response.error.unwrap_or_else(|| "scoring failed".to_string())
                )),
            ));
        }

        let (Some(score), Some(label), Some(explanation)) =
            (response.score, response.label, response.explanation)
        else {
            return Err(AnalyzeError::decode(
                &extraction.url,
                "ScoreArticle",
                Some(anyhow::anyhow!("coordinator response missing verdict fields")),
            ));
        };
        let verdict = Verdict {
            score,
            label,
            explanation,
        };

        let claims = extract_claims(&extraction.content.text, &self.opts.claims);
        debug!(claims = claims.len(), "detected claims");

        Ok(AnalysisReport::from_local(extraction, &verdict, claims))
    }

    async fn score_remote(&self, extraction: &Extraction) -> Result<AnalysisReport, AnalyzeError> {
        let analysis = self.remote.score(extraction).await?;
        info!(
            url = %extraction.url,
            verdict = analysis.verdict.as_deref().unwrap_or("<none>"),
            "remote verdict received"
        );
        Ok(AnalysisReport::from_remote(extraction, analysis))
    }
}
