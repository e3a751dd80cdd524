//! # elevdiff - Reference vs. Service Elevation Comparison
//!
//! Computes the average difference between the known elevation (`z`) of a
//! set of points and the elevation reported by a remote elevation lookup
//! service, for point sets larger than the service's per-request limit.
//!
//! ## Features
//!
//! - **Batching**: Splits arbitrarily large point lists into request-sized chunks
//! - **Two fetch strategies**: Strictly sequential, or all chunks concurrently
//! - **Order preserving**: Elevations always line up with the input points
//! - **Fail fast**: A failed chunk yields an explicit error, never a skewed number
//!
//! ## Quick Start
//!
//! ```ignore
//! use elevdiff::{ElevationPipeline, FetchMode, PipelineConfig};
//!
//! let points = elevdiff::point::load_points("locations.json")?;
//!
//! let pipeline = ElevationPipeline::new(
//!     PipelineConfig::new(std::env::var("ELEVDIFF_API_KEY")?)
//!         .with_mode(FetchMode::Concurrent),
//! )?;
//!
//! let summary = pipeline.run(&points)?;
//! println!("Average difference: {:.2}m", summary.mean_difference());
//! ```
//!
//! ## Service Protocol
//!
//! One HTTP GET per chunk:
//!
//! ```text
//! <endpoint>?locations=<lat>,<lon>|<lat>,<lon>|...&key=<api key>
//! ```
//!
//! A `200` reply carries a `results` array with one `elevation` per
//! submitted location, in submission order.

pub mod aggregate;
pub mod assemble;
pub mod batch;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod point;
pub mod request;
pub mod response;

#[cfg(feature = "geojson")]
pub mod geojson;

// Re-export main types at crate root for convenience
pub use aggregate::ElevationSummary;
pub use batch::{Batcher, DEFAULT_BATCH_SIZE, LEGACY_BATCH_SIZE};
pub use error::{ElevationError, Result, Stage};
pub use fetch::{ChunkOutcome, ConcurrentFetcher, Fetcher, SequentialFetcher};
pub use pipeline::{ElevationPipeline, FetchMode, PipelineConfig};
pub use point::Point;
pub use request::RequestDescriptor;
