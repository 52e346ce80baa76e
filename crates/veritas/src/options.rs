// ABOUTME: Configuration options for the veritas analyzer including scoring Mode, Options, and AnalyzerBuilder.
// ABOUTME: Options load from the environment; AnalyzerBuilder provides a fluent API on top.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::analyzer::Analyzer;
use crate::claims::ClaimConfig;
use crate::gate::{GateMode, DEFAULT_MIN_WORDS};

pub const ENV_MODE: &str = "VERITAS_MODE";
pub const ENV_ENDPOINT: &str = "VERITAS_ENDPOINT";
pub const ENV_TIMEOUT_SECS: &str = "VERITAS_TIMEOUT_SECS";
pub const ENV_MIN_WORDS: &str = "VERITAS_MIN_WORDS";

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/extract";

/// Where verdicts come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Heuristic scorer behind the in-process coordinator.
    #[default]
    Local,
    /// External scoring service over HTTP.
    Remote,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mode::Local => "local",
            Mode::Remote => "remote",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Mode::Local),
            "remote" | "server" => Ok(Mode::Remote),
            other => Err(format!("unknown mode '{}', expected local or remote", other)),
        }
    }
}

/// Configuration options for the analyzer.
#[derive(Debug, Clone)]
pub struct Options {
    pub mode: Mode,
    pub endpoint: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub min_words: usize,
    pub claims: ClaimConfig,
    pub http_client: Option<reqwest::Client>,
    pub headers: HashMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: Mode::Local,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: "Veritas/0.1".to_string(),
            min_words: DEFAULT_MIN_WORDS,
            claims: ClaimConfig::default(),
            http_client: None,
            headers: HashMap::new(),
        }
    }
}

impl Options {
    /// Defaults overridden by `VERITAS_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut opts = Self::default();

        if let Some(raw) = lookup(ENV_MODE) {
            match raw.parse() {
                Ok(mode) => opts.mode = mode,
                Err(e) => tracing::warn!(var = ENV_MODE, "{}", e),
            }
        }
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            opts.endpoint = endpoint.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => opts.timeout = Duration::from_secs(secs),
                Err(e) => tracing::warn!(var = ENV_TIMEOUT_SECS, error = %e, "ignoring timeout"),
            }
        }
        if let Some(raw) = lookup(ENV_MIN_WORDS) {
            match raw.trim().parse::<usize>() {
                Ok(min) => opts.min_words = min,
                Err(e) => tracing::warn!(var = ENV_MIN_WORDS, error = %e, "ignoring min words"),
            }
        }

        opts
    }

    /// Gate applied before scoring: word minimum locally, non-empty remotely.
    pub fn gate(&self) -> GateMode {
        match self.mode {
            Mode::Local => GateMode::MinWords(self.min_words),
            Mode::Remote => GateMode::NonEmpty,
        }
    }
}

/// Builder for constructing Analyzer instances with custom configuration.
#[derive(Debug, Clone)]
pub struct AnalyzerBuilder {
    opts: Options,
}

impl AnalyzerBuilder {
    /// Create a new AnalyzerBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Start from existing options, e.g. [`Options::from_env`].
    pub fn from_options(opts: Options) -> Self {
        Self { opts }
    }

    /// Choose local or remote scoring.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.opts.mode = mode;
        self
    }

    /// Set the remote scoring endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.opts.endpoint = endpoint.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Minimum word count for the local gate.
    pub fn min_words(mut self, min_words: usize) -> Self {
        self.opts.min_words = min_words;
        self
    }

    /// Claim detection settings for local reports.
    pub fn claims(mut self, claims: ClaimConfig) -> Self {
        self.opts.claims = claims;
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Build the Analyzer with the configured options.
    pub fn build(self) -> Analyzer {
        Analyzer::new(self.opts)
    }
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
