// ABOUTME: One user-triggered analysis session: status transitions, trigger gating and presenter updates.
// ABOUTME: A run in progress suppresses new triggers until it reaches Done, No text or Error.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::analyzer::{Analyzer, Outcome};
use crate::error::AnalyzeError;
use crate::extract::{extract_page, Extraction};
use crate::present::{BadgeSink, Presenter};

/// User-visible pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Idle,
    Analyzing,
    Done,
    NoText,
    Error,
}

impl Status {
    /// True once a run has ended, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Done | Status::NoText | Status::Error)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Idle => "Idle",
            Status::Analyzing => "Analyzing",
            Status::Done => "Done",
            Status::NoText => "No text",
            Status::Error => "Error",
        };
        write!(f, "{}", s)
    }
}

/// What a trigger should analyze: the active page's rendered HTML, or a URL to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageInput {
    Html { html: String, url: String },
    Url(String),
}

/// Routes badge updates from the coordinator to a shared presenter.
struct PresenterBadge<P>(Arc<P>);

impl<P: Presenter> BadgeSink for PresenterBadge<P> {
    fn set_badge(&self, text: &str) {
        self.0.set_badge(text);
    }
}

/// Holds the busy flag for one run. Dropping it re-enables the trigger, and a
/// run that never reached a terminal status (its future was dropped) ends in
/// `Error`.
struct RunGuard<'a, P: Presenter + 'static> {
    session: &'a Session<P>,
}

impl<P: Presenter + 'static> Drop for RunGuard<'_, P> {
    fn drop(&mut self) {
        if !self.session.status().is_terminal() {
            warn!("analysis cancelled before completion");
            self.session.set_status(Status::Error);
        }
        self.session.presenter.set_trigger_enabled(true);
        self.session.busy.store(false, Ordering::Release);
    }
}

/// Drives analyses for a single presenter.
pub struct Session<P: Presenter + 'static> {
    analyzer: Analyzer,
    presenter: Arc<P>,
    busy: AtomicBool,
    status: Mutex<Status>,
}

impl<P: Presenter + 'static> Session<P> {
    /// Wire `presenter` up as the badge for the analyzer's coordinator.
    pub fn new(mut analyzer: Analyzer, presenter: Arc<P>) -> Self {
        analyzer.set_badge(Arc::new(PresenterBadge(Arc::clone(&presenter))));
        presenter.set_status(Status::Idle);
        presenter.set_trigger_enabled(true);
        Self {
            analyzer,
            presenter,
            busy: AtomicBool::new(false),
            status: Mutex::new(Status::Idle),
        }
    }

    pub fn presenter(&self) -> &Arc<P> {
        &self.presenter
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Last status shown.
    pub fn status(&self) -> Status {
        self.status.lock().map(|s| *s).unwrap_or(Status::Error)
    }

    fn set_status(&self, status: Status) {
        if let Ok(mut current) = self.status.lock() {
            *current = status;
        }
        self.presenter.set_status(status);
    }

    /// Start one analysis run.
    ///
    /// Returns the terminal status, or `None` when a run was already in
    /// progress and this trigger was ignored. `None` input means there is no
    /// active page to analyze.
    pub async fn trigger(&self, input: Option<PageInput>) -> Option<Status> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("analysis already running, ignoring trigger");
            return None;
        }
        let _guard = RunGuard { session: self };

        self.presenter.set_trigger_enabled(false);
        self.set_status(Status::Analyzing);

        let status = match self.run(input).await {
            Ok(Outcome::Scored { report, .. }) => {
                self.presenter.render_report(&report);
                Status::Done
            }
            Ok(Outcome::NoText { .. }) => Status::NoText,
            Err(e) => {
                error!(error = %e, "analysis failed");
                Status::Error
            }
        };

        self.set_status(status);
        Some(status)
    }

    async fn run(&self, input: Option<PageInput>) -> Result<Outcome, AnalyzeError> {
        let extraction = self.capture(input).await?;
        self.presenter.show_extraction(&extraction.content);
        self.analyzer.analyze_extraction(extraction).await
    }

    async fn capture(&self, input: Option<PageInput>) -> Result<Extraction, AnalyzeError> {
        match input {
            None => Err(AnalyzeError::extract(
                "",
                "Capture",
                Some(anyhow::anyhow!("no active page")),
            )),
            Some(PageInput::Html { html, url }) => Ok(extract_page(&html, &url)),
            Some(PageInput::Url(url)) => self.analyzer.capture_url(&url).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractedContent;
    use crate::options::Mode;
    use crate::report::AnalysisReport;
    use httpmock::prelude::*;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Badge(String),
        Status(Status),
        Trigger(bool),
        Extraction(usize),
        Report(Option<u8>),
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Event>>);

    impl Recorder {
        fn events(&self) -> Vec<Event> {
            self.0.lock().unwrap().clone()
        }

        fn push(&self, event: Event) {
            self.0.lock().unwrap().push(event);
        }
    }

    impl BadgeSink for Recorder {
        fn set_badge(&self, text: &str) {
            self.push(Event::Badge(text.to_string()));
        }
    }

    impl Presenter for Recorder {
        fn set_status(&self, status: Status) {
            self.push(Event::Status(status));
        }

        fn set_trigger_enabled(&self, enabled: bool) {
            self.push(Event::Trigger(enabled));
        }

        fn show_extraction(&self, content: &ExtractedContent) {
            self.push(Event::Extraction(content.paragraph_count));
        }

        fn render_report(&self, report: &AnalysisReport) {
            self.push(Event::Report(report.score));
        }
    }

    fn article(words: usize) -> PageInput {
        PageInput::Html {
            html: format!(
                "<html><head><title>T</title></head><body><article><p>{}</p></article></body></html>",
                vec!["word"; words].join(" ")
            ),
            url: "https://news.example.com/a".to_string(),
        }
    }

    #[test]
    fn status_labels() {
        assert_eq!(Status::NoText.to_string(), "No text");
        assert_eq!(Status::Analyzing.to_string(), "Analyzing");
        assert!(Status::Error.is_terminal());
        assert!(!Status::Analyzing.is_terminal());
    }

    #[tokio::test]
    async fn scored_run_reports_and_reenables_trigger() {
        let recorder = Arc::new(Recorder::default());
        let session = Session::new(Analyzer::builder().build(), Arc::clone(&recorder));

        assert_eq!(session.trigger(Some(article(600))).await, Some(Status::Done));
        assert_eq!(session.status(), Status::Done);
        assert_eq!(
            recorder.events(),
            vec![
                Event::Status(Status::Idle),
                Event::Trigger(true),
                Event::Trigger(false),
                Event::Status(Status::Analyzing),
                Event::Extraction(1),
                Event::Badge("85".to_string()),
                Event::Report(Some(85)),
                Event::Status(Status::Done),
                Event::Trigger(true),
            ]
        );
    }

    #[tokio::test]
    async fn short_text_ends_with_no_text() {
        let recorder = Arc::new(Recorder::default());
        let session = Session::new(Analyzer::builder().build(), Arc::clone(&recorder));

        assert_eq!(session.trigger(Some(article(10))).await, Some(Status::NoText));
        let events = recorder.events();
        assert!(!events.iter().any(|e| matches!(e, Event::Badge(_) | Event::Report(_))));
        assert_eq!(events.last(), Some(&Event::Trigger(true)));
    }

    #[tokio::test]
    async fn missing_page_is_error() {
        let recorder = Arc::new(Recorder::default());
        let session = Session::new(Analyzer::builder().build(), Arc::clone(&recorder));

        assert_eq!(session.trigger(None).await, Some(Status::Error));
        let events = recorder.events();
        assert!(events.contains(&Event::Status(Status::Error)));
        assert!(!events.iter().any(|e| matches!(e, Event::Extraction(_))));
        assert_eq!(events.last(), Some(&Event::Trigger(true)));
    }

    #[tokio::test]
    async fn remote_failure_is_error_without_report() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/extract");
            then.status(500).body("boom");
        });

        let recorder = Arc::new(Recorder::default());
        let analyzer = Analyzer::builder()
            .mode(Mode::Remote)
            .endpoint(server.url("/extract"))
            .build();
        let session = Session::new(analyzer, Arc::clone(&recorder));

        assert_eq!(session.trigger(Some(article(30))).await, Some(Status::Error));
        assert!(!recorder
            .events()
            .iter()
            .any(|e| matches!(e, Event::Report(_))));
    }

    #[tokio::test]
    async fn trigger_while_busy_is_ignored() {
        let recorder = Arc::new(Recorder::default());
        let session = Session::new(Analyzer::builder().build(), Arc::clone(&recorder));

        session.busy.store(true, Ordering::Release);
        assert_eq!(session.trigger(Some(article(600))).await, None);
        assert_eq!(session.status(), Status::Idle);

        session.busy.store(false, Ordering::Release);
        assert_eq!(session.trigger(Some(article(600))).await, Some(Status::Done));
    }

    #[tokio::test]
    async fn dropped_run_ends_in_error_and_frees_trigger() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/extract");
            then.status(200)
                .delay(Duration::from_secs(2))
                .json_body(serde_json::json!({ "verdict": "High" }));
        });

        let recorder = Arc::new(Recorder::default());
        let analyzer = Analyzer::builder()
            .mode(Mode::Remote)
            .endpoint(server.url("/extract"))
            .build();
        let session = Session::new(analyzer, Arc::clone(&recorder));

        let cancelled =
            tokio::time::timeout(Duration::from_millis(200), session.trigger(Some(article(30))))
                .await;
        assert!(cancelled.is_err(), "slow scoring call should time out");

        assert_eq!(session.status(), Status::Error);
        let events = recorder.events();
        assert_eq!(
            events[events.len() - 2..].to_vec(),
            vec![Event::Status(Status::Error), Event::Trigger(true)]
        );

        assert_eq!(session.trigger(None).await, Some(Status::Error));
    }

    #[tokio::test]
    async fn used_analyzer_still_routes_badge() {
        let analyzer = Analyzer::builder().build();
        let warmup = format!(
            "<html><body><article><p>{}</p></article></body></html>",
            vec!["word"; 600].join(" ")
        );
        analyzer
            .analyze_html(&warmup, "https://news.example.com/warmup")
            .await
            .unwrap();

        let recorder = Arc::new(Recorder::default());
        let session = Session::new(analyzer, Arc::clone(&recorder));

        assert_eq!(session.trigger(Some(article(600))).await, Some(Status::Done));
        assert!(recorder.events().contains(&Event::Badge("85".to_string())));
    }
}
