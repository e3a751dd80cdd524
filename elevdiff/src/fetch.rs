//! Executing request descriptors against the elevation service.
//!
//! Two strategies implement [`Fetcher`]:
//!
//! - [`SequentialFetcher`] issues one blocking request at a time, in order.
//! - [`ConcurrentFetcher`] spawns every request at once on a tokio runtime
//!   and joins them all before returning.
//!
//! Both return one [`ChunkOutcome`] per descriptor, at the descriptor's
//! position, so the caller never needs to know which strategy ran. A failed
//! chunk is an `Err` outcome; it never aborts its siblings.
//!
//! Neither strategy retries. Each request is bounded by the configured
//! timeout, and exceeding it fails that chunk only.

use std::time::{Duration, Instant};

use futures::future::join_all;

use crate::error::{ElevationError, Result};
use crate::request::RequestDescriptor;
use crate::response::{decode_response, ElevationResponse};

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Result of requesting one chunk.
pub type ChunkOutcome = Result<ElevationResponse>;

/// Executes request descriptors and returns outcomes in descriptor order.
pub trait Fetcher: Send + Sync {
    /// Issue every request and return one outcome per descriptor.
    ///
    /// `outcomes[i]` always belongs to `requests[i]`, whatever order the
    /// responses arrived in.
    ///
    /// # Errors
    ///
    /// Returns an error only if the fetcher cannot start at all (e.g. the
    /// HTTP client cannot be created). Per-chunk failures are reported as
    /// `Err` outcomes inside the returned vector.
    fn fetch_all(&self, requests: &[RequestDescriptor]) -> Result<Vec<ChunkOutcome>>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

fn request_error(chunk: usize, err: reqwest::Error) -> ElevationError {
    if err.is_timeout() {
        ElevationError::Timeout { chunk }
    } else {
        ElevationError::Transport {
            chunk,
            reason: err.to_string(),
        }
    }
}

fn client_error(err: impl std::fmt::Display) -> ElevationError {
    ElevationError::Client {
        reason: err.to_string(),
    }
}

/// Fetches chunks one at a time, waiting for each response before the next.
#[derive(Debug, Clone)]
pub struct SequentialFetcher {
    timeout: Duration,
}

impl SequentialFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn fetch_one(client: &reqwest::blocking::Client, request: &RequestDescriptor) -> ChunkOutcome {
        let start = Instant::now();
        let response = client
            .get(request.url())
            .send()
            .map_err(|e| request_error(request.chunk, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ElevationError::Status {
                chunk: request.chunk,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .map_err(|e| request_error(request.chunk, e))?;

        tracing::debug!(
            chunk = request.chunk,
            locations = request.point_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Chunk fetched"
        );

        decode_response(request.chunk, &body)
    }
}

impl Default for SequentialFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl Fetcher for SequentialFetcher {
    fn fetch_all(&self, requests: &[RequestDescriptor]) -> Result<Vec<ChunkOutcome>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(client_error)?;

        Ok(requests
            .iter()
            .map(|request| Self::fetch_one(&client, request))
            .collect())
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}

/// Fetches all chunks concurrently and joins them in submission order.
///
/// One HTTP client is created per run and shared by every in-flight
/// request; it is dropped once all requests have completed or failed.
///
/// # Example
///
/// ```ignore
/// use elevdiff::fetch::{ConcurrentFetcher, Fetcher};
///
/// let fetcher = ConcurrentFetcher::new(std::time::Duration::from_secs(30));
/// let outcomes = fetcher.fetch_all(&requests)?;
/// assert_eq!(outcomes.len(), requests.len());
/// ```
#[derive(Debug, Clone)]
pub struct ConcurrentFetcher {
    timeout: Duration,
}

impl ConcurrentFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Fetch all chunks from within an existing tokio runtime.
    ///
    /// Every request is spawned as its own task before any is awaited.
    /// A task that panics is reported as [`ElevationError::TaskFailed`] for
    /// its chunk.
    pub async fn fetch_all_async(
        &self,
        requests: &[RequestDescriptor],
    ) -> Result<Vec<ChunkOutcome>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(client_error)?;

        let handles: Vec<_> = requests
            .iter()
            .map(|request| {
                let client = client.clone();
                let request = request.clone();
                tokio::spawn(async move { Self::fetch_one(&client, &request).await })
            })
            .collect();

        // join_all yields results in the order of `handles`, not completion order.
        let joined = join_all(handles).await;

        Ok(joined
            .into_iter()
            .zip(requests)
            .map(|(joined, request)| match joined {
                Ok(outcome) => outcome,
                Err(e) => Err(ElevationError::TaskFailed {
                    chunk: request.chunk,
                    reason: e.to_string(),
                }),
            })
            .collect())
    }

    async fn fetch_one(client: &reqwest::Client, request: &RequestDescriptor) -> ChunkOutcome {
        let start = Instant::now();
        let response = client
            .get(request.url())
            .send()
            .await
            .map_err(|e| request_error(request.chunk, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ElevationError::Status {
                chunk: request.chunk,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| request_error(request.chunk, e))?;

        tracing::debug!(
            chunk = request.chunk,
            locations = request.point_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Chunk fetched"
        );

        decode_response(request.chunk, &body)
    }
}

impl Default for ConcurrentFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl Fetcher for ConcurrentFetcher {
    /// Runs [`ConcurrentFetcher::fetch_all_async`] on a runtime created for
    /// this call. Must not be called from inside another tokio runtime.
    fn fetch_all(&self, requests: &[RequestDescriptor]) -> Result<Vec<ChunkOutcome>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(client_error)?;

        runtime.block_on(self.fetch_all_async(requests))
    }

    fn name(&self) -> &'static str {
        "concurrent"
    }
}
