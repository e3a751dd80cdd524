//! Reassembling per-chunk outcomes into one elevation sequence.
//!
//! Outcomes arrive in chunk order. Successful chunks contribute their
//! elevations in submission order; failed chunks contribute nothing and are
//! recorded in [`Assembly::failures`]. Gaps are never padded, so callers must
//! check [`Assembly::is_complete`] before pairing elevations with points.

use crate::error::{ElevationError, Result};
use crate::fetch::ChunkOutcome;
use crate::request::RequestDescriptor;
use crate::response::{ElevationResponse, STATUS_OK};

/// Flattened elevations plus the chunks that failed.
#[derive(Debug, Default)]
pub struct Assembly {
    /// Elevations in chunk order, then intra-chunk order.
    pub elevations: Vec<f64>,
    /// One error per failed chunk, in chunk order.
    pub failures: Vec<ElevationError>,
    /// Total number of locations that were requested.
    pub expected: usize,
}

impl Assembly {
    /// True when every chunk succeeded and every point has an elevation.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.elevations.len() == self.expected
    }

    /// Indices of the chunks that failed.
    pub fn failed_chunks(&self) -> Vec<usize> {
        self.failures.iter().filter_map(ElevationError::chunk).collect()
    }

    /// Return the elevations, or [`ElevationError::IncompleteResult`] if
    /// any chunk failed.
    pub fn into_complete(self) -> Result<Vec<f64>> {
        if self.is_complete() {
            Ok(self.elevations)
        } else {
            Err(ElevationError::IncompleteResult {
                expected: self.expected,
                actual: self.elevations.len(),
                failed_chunks: self.failed_chunks(),
            })
        }
    }
}

/// Extract the ordered elevations from one chunk's payload.
///
/// # Errors
///
/// - [`ElevationError::ServiceStatus`] if the payload reports a status other
///   than `OK`
/// - [`ElevationError::MalformedPayload`] if `results` is missing
/// - [`ElevationError::CountMismatch`] if the number of results differs from
///   the number of locations sent
pub fn extract_elevations(
    chunk: usize,
    expected: usize,
    response: &ElevationResponse,
) -> Result<Vec<f64>> {
    if let Some(status) = response.status.as_deref() {
        if status != STATUS_OK {
            return Err(ElevationError::ServiceStatus {
                chunk,
                status: status.to_string(),
                message: response.error_message.clone().unwrap_or_default(),
            });
        }
    }

    let results = response
        .results
        .as_ref()
        .ok_or_else(|| ElevationError::MalformedPayload {
            chunk,
            reason: "missing 'results' array".to_string(),
        })?;

    if results.len() != expected {
        return Err(ElevationError::CountMismatch {
            chunk,
            expected,
            actual: results.len(),
        });
    }

    Ok(results.iter().map(|r| r.elevation).collect())
}

/// Concatenate the elevations of every successful chunk.
///
/// `outcomes[i]` must belong to `requests[i]`. A request without a matching
/// outcome counts as a failed chunk.
pub fn assemble(requests: &[RequestDescriptor], outcomes: Vec<ChunkOutcome>) -> Assembly {
    let mut assembly = Assembly {
        elevations: Vec::with_capacity(requests.iter().map(|r| r.point_count).sum()),
        failures: Vec::new(),
        expected: requests.iter().map(|r| r.point_count).sum(),
    };

    let mut outcomes = outcomes.into_iter();
    for request in requests {
        let extracted = match outcomes.next() {
            Some(Ok(response)) => extract_elevations(request.chunk, request.point_count, &response),
            Some(Err(e)) => Err(e),
            None => Err(ElevationError::TaskFailed {
                chunk: request.chunk,
                reason: "no outcome returned for chunk".to_string(),
            }),
        };

        match extracted {
            Ok(elevations) => assembly.elevations.extend(elevations),
            Err(e) => {
                tracing::warn!(chunk = request.chunk, error = %e, "Dropping failed chunk");
                assembly.failures.push(e);
            }
        }
    }

    assembly
}
