//! Request descriptors for the elevation service.
//!
//! A [`RequestDescriptor`] is derived deterministically from one chunk: the
//! endpoint, the rendered `locations` string and the API key. Building one
//! has no side effects, so descriptors can be recreated or retried freely.

use std::fmt;

use reqwest::Url;

use crate::batch::{Batcher, Chunk};
use crate::error::{ElevationError, Result};
use crate::point::Point;

/// Default elevation service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/elevation/json";

/// Everything needed to issue the request for one chunk.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Position of the originating chunk.
    pub chunk: usize,
    /// Number of locations in `locations`.
    pub point_count: usize,
    endpoint: Url,
    locations: String,
    credential: String,
}

impl RequestDescriptor {
    /// Build the descriptor for a rendered chunk.
    pub fn new(
        chunk: usize,
        point_count: usize,
        endpoint: &Url,
        locations: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            chunk,
            point_count,
            endpoint: endpoint.clone(),
            locations: locations.into(),
            credential: credential.into(),
        }
    }

    /// Build the descriptor for a chunk of points.
    pub fn from_chunk(chunk: &Chunk<'_>, endpoint: &Url, credential: &str) -> Self {
        Self::new(chunk.index, chunk.len(), endpoint, chunk.render(), credential)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The rendered `lat,lon|lat,lon|...` string.
    pub fn locations(&self) -> &str {
        &self.locations
    }

    /// Full request URL with `locations` and `key` query parameters.
    pub fn url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("locations", &self.locations)
            .append_pair("key", &self.credential);
        url
    }

    /// Request URL with the key replaced, safe for logs and display.
    pub fn redacted_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("locations", &self.locations)
            .append_pair("key", "REDACTED");
        url
    }
}

impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("chunk", &self.chunk)
            .field("point_count", &self.point_count)
            .field("endpoint", &self.endpoint.as_str())
            .field("locations", &self.locations)
            .field("credential", &"REDACTED")
            .finish()
    }
}

/// Parse and check an endpoint URL.
///
/// # Errors
///
/// Returns [`ElevationError::InvalidEndpoint`] unless `endpoint` is an
/// absolute `http` or `https` URL without a query string.
pub fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint).map_err(|e| ElevationError::InvalidEndpoint {
        url: endpoint.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ElevationError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if url.query().is_some() {
        return Err(ElevationError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: "endpoint must not carry a query string".to_string(),
        });
    }

    Ok(url)
}

/// Build one descriptor per chunk, in chunk order.
pub fn build_requests(
    points: &[Point],
    batcher: &Batcher,
    endpoint: &Url,
    credential: &str,
) -> Vec<RequestDescriptor> {
    batcher
        .chunks(points)
        .map(|chunk| RequestDescriptor::from_chunk(&chunk, endpoint, credential))
        .collect()
}
