//! End-to-end comparison pipeline.
//!
//! ```text
//! points → Batcher → chunks → RequestDescriptor → Fetcher → outcomes
//!        → assemble → elevations → summarize → ElevationSummary
//! ```
//!
//! # Example
//!
//! ```ignore
//! use elevdiff::{ElevationPipeline, FetchMode, PipelineConfig};
//!
//! let config = PipelineConfig::new("my-api-key")
//!     .with_batch_size(300)
//!     .with_mode(FetchMode::Concurrent);
//! let pipeline = ElevationPipeline::new(config)?;
//!
//! let points = elevdiff::point::load_points("locations.json")?;
//! let summary = pipeline.run(&points)?;
//! println!("Average difference: {:.2}m", summary.mean_difference());
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use reqwest::Url;

use crate::aggregate::{summarize, ElevationSummary};
use crate::assemble::assemble;
use crate::batch::{Batcher, DEFAULT_BATCH_SIZE};
use crate::error::{ElevationError, Result};
use crate::fetch::{ConcurrentFetcher, Fetcher, SequentialFetcher, DEFAULT_TIMEOUT_SECS};
use crate::point::Point;
use crate::request::{build_requests, parse_endpoint, RequestDescriptor, DEFAULT_ENDPOINT};

/// How chunk requests are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// One request at a time, in order.
    #[default]
    Sequential,
    /// All requests in flight at once, joined before assembly.
    Concurrent,
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMode::Sequential => write!(f, "sequential"),
            FetchMode::Concurrent => write!(f, "concurrent"),
        }
    }
}

impl FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" | "sync" => Ok(FetchMode::Sequential),
            "concurrent" | "async" => Ok(FetchMode::Concurrent),
            other => Err(format!(
                "unknown fetch mode '{}' (expected 'sequential' or 'concurrent')",
                other
            )),
        }
    }
}

/// Configuration for an [`ElevationPipeline`].
///
/// All defaults are set in [`PipelineConfig::new`].
#[derive(Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Elevation service endpoint, without query string.
    pub endpoint: String,
    /// API key sent as the `key` query parameter.
    pub api_key: String,
    /// Maximum number of locations per request.
    pub batch_size: usize,
    /// Sequential or concurrent request execution.
    pub mode: FetchMode,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl PipelineConfig {
    /// Create a configuration with default endpoint, batch size, mode and
    /// timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            mode: FetchMode::Sequential,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ELEVDIFF_API_KEY` | Elevation service API key | Required |
    /// | `ELEVDIFF_ENDPOINT` | Elevation service endpoint | Google Elevation API |
    /// | `ELEVDIFF_BATCH_SIZE` | Locations per request | 300 |
    /// | `ELEVDIFF_MODE` | `sequential` or `concurrent` | sequential |
    /// | `ELEVDIFF_TIMEOUT_SECS` | Per-request timeout | 300 |
    ///
    /// Unparseable optional values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ElevationError::MissingCredential`] if `ELEVDIFF_API_KEY`
    /// is not set.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("ELEVDIFF_API_KEY").map_err(|_| ElevationError::MissingCredential)?;

        let mut config = Self::new(api_key);

        if let Ok(endpoint) = std::env::var("ELEVDIFF_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(batch_size) = std::env::var("ELEVDIFF_BATCH_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.batch_size = batch_size;
        }
        if let Some(mode) = std::env::var("ELEVDIFF_MODE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.mode = mode;
        }
        if let Some(timeout_secs) = std::env::var("ELEVDIFF_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.timeout_secs = timeout_secs;
        }

        Ok(config)
    }

    /// Set the service endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the maximum number of locations per request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the fetch mode.
    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"REDACTED")
            .field("batch_size", &self.batch_size)
            .field("mode", &self.mode)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Compares reference elevations against an elevation service.
///
/// Configuration is validated on construction, so a pipeline that exists
/// never issues a request with a bad batch size, endpoint or key.
pub struct ElevationPipeline {
    batcher: Batcher,
    endpoint: Url,
    api_key: String,
    mode: FetchMode,
    fetcher: Box<dyn Fetcher>,
}

impl ElevationPipeline {
    /// Create a pipeline using the fetcher selected by `config.mode`.
    ///
    /// # Errors
    ///
    /// - [`ElevationError::InvalidBatchSize`] if `batch_size` is zero
    /// - [`ElevationError::InvalidTimeout`] if `timeout_secs` is zero
    /// - [`ElevationError::MissingCredential`] if the API key is blank
    /// - [`ElevationError::InvalidEndpoint`] if the endpoint is not an
    ///   absolute http(s) URL
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let fetcher: Box<dyn Fetcher> = match config.mode {
            FetchMode::Sequential => Box::new(SequentialFetcher::new(config.timeout())),
            FetchMode::Concurrent => Box::new(ConcurrentFetcher::new(config.timeout())),
        };
        Self::build(config, fetcher)
    }

    /// Create a pipeline with a caller-supplied fetcher.
    ///
    /// `config.mode` is kept for reporting only.
    pub fn with_fetcher(config: PipelineConfig, fetcher: impl Fetcher + 'static) -> Result<Self> {
        Self::build(config, Box::new(fetcher))
    }

    fn build(config: PipelineConfig, fetcher: Box<dyn Fetcher>) -> Result<Self> {
        let batcher = Batcher::new(config.batch_size)?;
        if config.timeout_secs == 0 {
            return Err(ElevationError::InvalidTimeout { secs: 0 });
        }
        if config.api_key.trim().is_empty() {
            return Err(ElevationError::MissingCredential);
        }
        let endpoint = parse_endpoint(&config.endpoint)?;

        Ok(Self {
            batcher,
            endpoint,
            api_key: config.api_key,
            mode: config.mode,
            fetcher,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batcher.batch_size()
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Request descriptors for `points`, in chunk order, without sending them.
    pub fn plan(&self, points: &[Point]) -> Vec<RequestDescriptor> {
        build_requests(points, &self.batcher, &self.endpoint, &self.api_key)
    }

    /// Fetch one service elevation per point, aligned with `points`.
    ///
    /// # Errors
    ///
    /// Returns [`ElevationError::IncompleteResult`] naming the expected and
    /// actual counts if any chunk failed; partial results are never returned.
    pub fn fetch_elevations(&self, points: &[Point]) -> Result<Vec<f64>> {
        if points.is_empty() {
            return Err(ElevationError::NoPoints);
        }
        for point in points {
            point.validate()?;
        }

        let start = Instant::now();
        let requests = self.plan(points);
        let outcomes = self.fetcher.fetch_all(&requests)?;
        let assembly = assemble(&requests, outcomes);

        tracing::info!(
            mode = self.fetcher.name(),
            points = points.len(),
            chunks = requests.len(),
            failed_chunks = assembly.failures.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Elevation requests complete"
        );

        assembly.into_complete()
    }

    /// Fetch service elevations and summarize them against the reference
    /// elevations of `points`.
    pub fn run(&self, points: &[Point]) -> Result<ElevationSummary> {
        let elevations = self.fetch_elevations(points)?;
        summarize(points, &elevations)
    }

    /// `mean(reference) - mean(service)` over `points`.
    pub fn average_difference(&self, points: &[Point]) -> Result<f64> {
        self.run(points).map(|s| s.mean_difference())
    }
}
