//! Elevation service payloads.
//!
//! A successful reply looks like:
//!
//! ```json
//! {
//!   "results": [
//!     {"elevation": 452.3, "location": {"lat": -21.83, "lng": -49.12}, "resolution": 9.5}
//!   ],
//!   "status": "OK"
//! }
//! ```
//!
//! Only `results[].elevation` is required. The order of `results` matches
//! the order of submitted locations.

use serde::{Deserialize, Serialize};

use crate::error::{ElevationError, Result};

/// Status value the service reports for a successful lookup.
pub const STATUS_OK: &str = "OK";

/// Decoded body of one elevation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationResponse {
    /// Per-location results; `None` when the body has no `results` key.
    #[serde(default)]
    pub results: Option<Vec<ElevationResult>>,
    /// Service-level status, e.g. `OK` or `REQUEST_DENIED`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Elevation for one submitted location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationResult {
    /// Elevation in meters.
    pub elevation: f64,
    #[serde(default)]
    pub location: Option<LatLng>,
    /// Distance in meters between interpolated sample points.
    #[serde(default)]
    pub resolution: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl ElevationResponse {
    /// Build a successful response from bare elevation values.
    pub fn from_elevations(elevations: impl IntoIterator<Item = f64>) -> Self {
        Self {
            results: Some(
                elevations
                    .into_iter()
                    .map(|elevation| ElevationResult {
                        elevation,
                        location: None,
                        resolution: None,
                    })
                    .collect(),
            ),
            status: Some(STATUS_OK.to_string()),
            error_message: None,
        }
    }
}

/// Decode a response body for `chunk`.
///
/// # Errors
///
/// Returns [`ElevationError::MalformedPayload`] if the body is not JSON or
/// a field has the wrong type (e.g. a `null` elevation).
pub fn decode_response(chunk: usize, body: &[u8]) -> Result<ElevationResponse> {
    serde_json::from_slice(body).map_err(|e| ElevationError::MalformedPayload {
        chunk,
        reason: e.to_string(),
    })
}
