//! Input points and the `locations` document they are loaded from.
//!
//! The expected input is a JSON object with a `locations` array:
//!
//! ```json
//! {
//!   "locations": [
//!     {"lat": -21.8303712, "lon": -49.127649, "z": 452.1},
//!     {"lat": -21.8302281, "lon": -49.1275669, "z": 451.8}
//!   ]
//! }
//! ```
//!
//! Each entry's `z` is the reference elevation compared against the service.
//! Unknown fields are ignored.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ElevationError, Result};

/// A geographic point with a known reference elevation.
///
/// A point's identity is its position in the loaded sequence; elevations
/// returned by the service are realigned to points by that index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Known elevation at this point, in meters.
    #[serde(rename = "z")]
    pub reference_elevation: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64, reference_elevation: f64) -> Self {
        Self {
            lat,
            lon,
            reference_elevation,
        }
    }

    /// Check that the coordinates are finite and within WGS84 ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(ElevationError::InvalidInput {
                reason: format!("latitude {} out of range", self.lat),
            });
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(ElevationError::InvalidInput {
                reason: format!("longitude {} out of range", self.lon),
            });
        }
        if !self.reference_elevation.is_finite() {
            return Err(ElevationError::InvalidInput {
                reason: format!("reference elevation {} is not finite", self.reference_elevation),
            });
        }
        Ok(())
    }
}

/// Top-level input document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationsDocument {
    pub locations: Vec<Point>,
}

/// Parse points from a `locations` JSON document held in memory.
///
/// # Errors
///
/// Returns [`ElevationError::Json`] if the document does not have the
/// expected shape, or [`ElevationError::InvalidInput`] if a point has
/// out-of-range coordinates.
pub fn points_from_json(data: &str) -> Result<Vec<Point>> {
    let doc: LocationsDocument = serde_json::from_str(data)?;
    validate_all(doc.locations)
}

/// Parse points from a `locations` JSON document read from `reader`.
pub fn points_from_reader<R: Read>(reader: R) -> Result<Vec<Point>> {
    let doc: LocationsDocument = serde_json::from_reader(reader)?;
    validate_all(doc.locations)
}

/// Load points from a `locations` JSON file.
pub fn load_points<P: AsRef<Path>>(path: P) -> Result<Vec<Point>> {
    let file = File::open(path.as_ref())?;
    points_from_reader(BufReader::new(file))
}

fn validate_all(points: Vec<Point>) -> Result<Vec<Point>> {
    for (index, point) in points.iter().enumerate() {
        point.validate().map_err(|e| match e {
            ElevationError::InvalidInput { reason } => ElevationError::InvalidInput {
                reason: format!("location {}: {}", index, reason),
            },
            other => other,
        })?;
    }
    Ok(points)
}
