//! Comparing reference elevations with service elevations.
//!
//! The headline value is `mean(reference) - mean(service)`: positive when
//! the input's reference elevations sit above what the service reports.

use serde::Serialize;

use crate::error::{ElevationError, Result};
use crate::point::Point;

/// Aggregate comparison of reference and service elevations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElevationSummary {
    /// Number of points compared.
    pub count: usize,
    /// Mean of the points' reference elevations.
    pub reference_mean: f64,
    /// Mean of the elevations reported by the service.
    pub service_mean: f64,
    /// Highest reference elevation.
    pub reference_max: f64,
    /// Highest elevation reported by the service.
    pub service_max: f64,
}

impl ElevationSummary {
    /// `reference_mean - service_mean`.
    pub fn mean_difference(&self) -> f64 {
        self.reference_mean - self.service_mean
    }

    /// `reference_max - service_max`.
    pub fn max_difference(&self) -> f64 {
        self.reference_max - self.service_max
    }
}

/// Summarize `points` against the service `elevations` aligned with them.
///
/// # Errors
///
/// - [`ElevationError::NoPoints`] if `points` is empty
/// - [`ElevationError::IncompleteResult`] if the two sequences differ in
///   length; no value is computed from misaligned data
pub fn summarize(points: &[Point], elevations: &[f64]) -> Result<ElevationSummary> {
    if elevations.len() != points.len() {
        return Err(ElevationError::IncompleteResult {
            expected: points.len(),
            actual: elevations.len(),
            failed_chunks: Vec::new(),
        });
    }
    if points.is_empty() {
        return Err(ElevationError::NoPoints);
    }

    let count = points.len();
    let reference_sum: f64 = points.iter().map(|p| p.reference_elevation).sum();
    let service_sum: f64 = elevations.iter().sum();

    Ok(ElevationSummary {
        count,
        reference_mean: reference_sum / count as f64,
        service_mean: service_sum / count as f64,
        reference_max: points
            .iter()
            .map(|p| p.reference_elevation)
            .fold(f64::NEG_INFINITY, f64::max),
        service_max: elevations.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// `mean(reference) - mean(elevations)` for aligned sequences.
pub fn mean_difference(points: &[Point], elevations: &[f64]) -> Result<f64> {
    summarize(points, elevations).map(|s| s.mean_difference())
}
