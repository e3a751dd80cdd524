//! Error types for the elevdiff library.

use thiserror::Error;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Configuration validation, before any request is issued.
    Config,
    /// Loading and parsing input points.
    Input,
    /// Issuing a request for one chunk.
    Fetch,
    /// Extracting elevations from a chunk's payload.
    Assembly,
    /// Combining reference and service elevations.
    Aggregation,
}

/// Errors that can occur while comparing reference and service elevations.
#[derive(Error, Debug)]
pub enum ElevationError {
    /// Batch size must be at least one point per request.
    #[error("Invalid batch size: {size} (must be at least 1)")]
    InvalidBatchSize { size: usize },

    /// Per-request timeout must be at least one second.
    #[error("Invalid timeout: {secs}s (must be at least 1)")]
    InvalidTimeout { secs: u64 },

    /// No API key was configured for the elevation service.
    #[error("Missing credential: an API key for the elevation service is required")]
    MissingCredential,

    /// The configured endpoint is not an absolute http(s) URL.
    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// IO error when reading input files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input document is not valid JSON or has the wrong shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input was parsed but contains unusable data.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// There are no points to compare.
    #[error("No points to compare")]
    NoPoints,

    /// The HTTP client or async runtime could not be created.
    #[error("Failed to create HTTP client: {reason}")]
    Client { reason: String },

    /// Network failure while requesting a chunk.
    #[error("Chunk {chunk}: transport error: {reason}")]
    Transport { chunk: usize, reason: String },

    /// The request for a chunk exceeded the configured timeout.
    #[error("Chunk {chunk}: request timed out")]
    Timeout { chunk: usize },

    /// The service answered with a non-success HTTP status.
    #[error("Chunk {chunk}: HTTP {status}")]
    Status { chunk: usize, status: u16 },

    /// The service answered 200 but reported an error status in the body.
    #[error("Chunk {chunk}: service status {status}: {message}")]
    ServiceStatus {
        chunk: usize,
        status: String,
        message: String,
    },

    /// The payload could not be decoded into elevation results.
    #[error("Chunk {chunk}: malformed payload: {reason}")]
    MalformedPayload { chunk: usize, reason: String },

    /// The payload holds a different number of results than locations sent.
    #[error("Chunk {chunk}: expected {expected} elevations, got {actual}")]
    CountMismatch {
        chunk: usize,
        expected: usize,
        actual: usize,
    },

    /// The task running a chunk's request panicked or was cancelled.
    #[error("Chunk {chunk}: request task failed: {reason}")]
    TaskFailed { chunk: usize, reason: String },

    /// Some chunks failed, so elevations no longer line up with the points.
    #[error(
        "Incomplete result: expected {expected} elevations, got {actual} (failed chunks: {failed_chunks:?})"
    )]
    IncompleteResult {
        expected: usize,
        actual: usize,
        failed_chunks: Vec<usize>,
    },
}

impl ElevationError {
    /// The pipeline stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            ElevationError::InvalidBatchSize { .. }
            | ElevationError::InvalidTimeout { .. }
            | ElevationError::MissingCredential
            | ElevationError::InvalidEndpoint { .. }
            | ElevationError::Client { .. } => Stage::Config,
            ElevationError::Io(_)
            | ElevationError::Json(_)
            | ElevationError::InvalidInput { .. }
            | ElevationError::NoPoints => Stage::Input,
            ElevationError::Transport { .. }
            | ElevationError::Timeout { .. }
            | ElevationError::Status { .. }
            | ElevationError::TaskFailed { .. } => Stage::Fetch,
            ElevationError::ServiceStatus { .. }
            | ElevationError::MalformedPayload { .. }
            | ElevationError::CountMismatch { .. } => Stage::Assembly,
            ElevationError::IncompleteResult { .. } => Stage::Aggregation,
        }
    }

    /// Index of the chunk that failed, for per-chunk errors.
    pub fn chunk(&self) -> Option<usize> {
        match self {
            ElevationError::Transport { chunk, .. }
            | ElevationError::Timeout { chunk }
            | ElevationError::Status { chunk, .. }
            | ElevationError::ServiceStatus { chunk, .. }
            | ElevationError::MalformedPayload { chunk, .. }
            | ElevationError::CountMismatch { chunk, .. }
            | ElevationError::TaskFailed { chunk, .. } => Some(*chunk),
            _ => None,
        }
    }
}

/// Result type alias using [`ElevationError`].
pub type Result<T> = std::result::Result<T, ElevationError>;
