// ABOUTME: Main library entry point for the Veritas article credibility pipeline.
// ABOUTME: Re-exports the public API: Analyzer, AnalyzerBuilder, Session, AnalysisReport, AnalyzeError, Options.

//! Veritas - article extraction and credibility scoring.
//!
//! A page's article region is located and normalized into paragraph text,
//! publication metadata is harvested, and the text is scored either by a
//! local heuristic behind an in-process coordinator or by a remote scoring
//! service.
//!
//! # Example
//!
//! ```no_run
//! use veritas::{AnalyzeError, Analyzer, Outcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AnalyzeError> {
//!     let analyzer = Analyzer::builder().build();
//!     match analyzer.analyze_url("https://example.com/article").await? {
//!         Outcome::Scored { report, .. } => println!("{}", report.format_text()),
//!         Outcome::NoText { .. } => println!("No text"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod claims;
pub mod coordinator;
pub mod dom;
pub mod error;
pub mod extract;
pub mod gate;
pub mod options;
pub mod present;
pub mod remote;
pub mod report;
pub mod resource;
pub mod scoring;
pub mod session;

pub use crate::analyzer::{Analyzer, Outcome};
pub use crate::claims::{extract_claims, ClaimConfig};
pub use crate::coordinator::{handle_message, CoordinatorHandle, Response, ScorePayload};
pub use crate::error::{AnalyzeError, ErrorCode};
pub use crate::extract::{extract_page, ExtractedContent, Extraction};
pub use crate::gate::GateMode;
pub use crate::options::{AnalyzerBuilder, Mode, Options};
pub use crate::present::{BadgeSink, Presenter};
pub use crate::report::AnalysisReport;
pub use crate::scoring::{score_text, Label, Verdict};
pub use crate::session::{PageInput, Session, Status};
