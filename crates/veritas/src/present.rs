// ABOUTME: Presentation sinks the pipeline writes to: badge, status, trigger control and report views.
// ABOUTME: The core only emits values through these traits and never looks up UI elements itself.

use crate::extract::ExtractedContent;
use crate::report::AnalysisReport;
use crate::session::Status;

/// Where the numeric score badge is shown.
pub trait BadgeSink: Send + Sync {
    fn set_badge(&self, text: &str);
}

/// A user-facing surface for one analysis session.
pub trait Presenter: BadgeSink {
    /// Show the pipeline status.
    fn set_status(&self, status: Status);

    /// Enable or disable the control that starts an analysis.
    fn set_trigger_enabled(&self, enabled: bool);

    /// Extraction diagnostics: paragraph and character counts plus a preview.
    fn show_extraction(&self, content: &ExtractedContent);

    /// The finished report.
    fn render_report(&self, report: &AnalysisReport);
}
