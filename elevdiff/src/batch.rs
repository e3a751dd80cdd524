//! Splitting point sequences into request-sized chunks.
//!
//! Elevation services cap the number of locations accepted per request, so a
//! large point list is partitioned into contiguous chunks of at most
//! `batch_size` points. Concatenating the chunks in order reproduces the
//! original sequence exactly; only the last chunk may be shorter.
//!
//! # Example
//!
//! ```
//! use elevdiff::batch::{render_chunk, Batcher};
//! use elevdiff::Point;
//!
//! let points = vec![
//!     Point::new(-21.8303712, -49.127649, 450.0),
//!     Point::new(-21.8302281, -49.1275669, 451.0),
//!     Point::new(-21.8300812, -49.1274859, 452.0),
//! ];
//!
//! let batcher = Batcher::new(2).unwrap();
//! let sizes: Vec<usize> = batcher.chunks(&points).map(|c| c.len()).collect();
//! assert_eq!(sizes, vec![2, 1]);
//!
//! assert_eq!(
//!     render_chunk(&points[..2]),
//!     "-21.8303712,-49.127649|-21.8302281,-49.1275669"
//! );
//! ```

use crate::error::{ElevationError, Result};
use crate::point::Point;

/// Batch size used by the active request path.
pub const DEFAULT_BATCH_SIZE: usize = 300;

/// Batch size used by the older, polyline-oriented request path.
pub const LEGACY_BATCH_SIZE: usize = 100;

/// A contiguous run of points sent in one request.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    /// Position of this chunk among all chunks of the run.
    pub index: usize,
    /// Index of the chunk's first point in the full sequence.
    pub offset: usize,
    /// The points in this chunk.
    pub points: &'a [Point],
}

impl Chunk<'_> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Render this chunk's coordinates for the `locations` query parameter.
    pub fn render(&self) -> String {
        render_chunk(self.points)
    }
}

/// Splits point sequences into chunks of a fixed maximum size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batcher {
    batch_size: usize,
}

impl Batcher {
    /// Create a batcher.
    ///
    /// # Errors
    ///
    /// Returns [`ElevationError::InvalidBatchSize`] if `batch_size` is zero.
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(ElevationError::InvalidBatchSize { size: batch_size });
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of chunks `len` points split into.
    pub fn chunk_count(&self, len: usize) -> usize {
        len.div_ceil(self.batch_size)
    }

    /// Lazily split `points` into chunks.
    ///
    /// The returned iterator is `Clone`, so a run can be restarted from the
    /// beginning without re-reading the input.
    pub fn chunks<'a>(
        &self,
        points: &'a [Point],
    ) -> impl Iterator<Item = Chunk<'a>> + Clone + ExactSizeIterator + 'a {
        let batch_size = self.batch_size;
        points
            .chunks(batch_size)
            .enumerate()
            .map(move |(index, points)| Chunk {
                index,
                offset: index * batch_size,
                points,
            })
    }
}

impl Default for Batcher {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Render points in the service's `lat,lon|lat,lon|...` location format.
///
/// The output never contains whitespace, since it is embedded in a URL.
pub fn render_chunk(points: &[Point]) -> String {
    let mut out = String::with_capacity(points.len() * 24);
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            out.push('|');
        }
        out.push_str(&format!("{},{}", point.lat, point.lon));
    }
    out.retain(|c| !c.is_whitespace());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| Point::new(i as f64 * 0.001, -(i as f64) * 0.002, i as f64))
            .collect()
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = Batcher::new(0);
        assert!(matches!(
            result,
            Err(ElevationError::InvalidBatchSize { size: 0 })
        ));
    }

    #[test]
    fn test_chunk_sizes() {
        let points = sample_points(250);
        let batcher = Batcher::new(100).unwrap();
        let sizes: Vec<usize> = batcher.chunks(&points).map(|c| c.len()).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(batcher.chunk_count(points.len()), 3);
    }

    #[test]
    fn test_chunks_reproduce_sequence() {
        for len in [0, 1, 2, 7, 99, 100, 101, 250] {
            let points = sample_points(len);
            for batch_size in [1, 2, 3, 50, 100, 300] {
                let batcher = Batcher::new(batch_size).unwrap();
                let rebuilt: Vec<Point> = batcher
                    .chunks(&points)
                    .flat_map(|c| c.points.iter().copied())
                    .collect();
                assert_eq!(rebuilt, points, "len={} batch_size={}", len, batch_size);
                assert_eq!(batcher.chunks(&points).len(), batcher.chunk_count(len));
            }
        }
    }

    #[test]
    fn test_chunk_index_and_offset() {
        let points = sample_points(7);
        let batcher = Batcher::new(3).unwrap();
        let chunks: Vec<Chunk> = batcher.chunks(&points).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].index, 2);
        assert_eq!(chunks[2].offset, 6);
        assert_eq!(chunks[2].points, &points[6..]);
    }

    #[test]
    fn test_chunks_restartable() {
        let points = sample_points(10);
        let batcher = Batcher::new(4).unwrap();
        let chunks = batcher.chunks(&points);
        let first: Vec<usize> = chunks.clone().map(|c| c.len()).collect();
        let second: Vec<usize> = chunks.map(|c| c.len()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let batcher = Batcher::new(10).unwrap();
        assert_eq!(batcher.chunks(&[]).count(), 0);
    }

    #[test]
    fn test_render_chunk() {
        let points = vec![
            Point::new(-21.8303712, -49.127649, 0.0),
            Point::new(-21.8302281, -49.1275669, 0.0),
            Point::new(-21.8300812, -49.1274859, 0.0),
        ];
        assert_eq!(
            render_chunk(&points),
            "-21.8303712,-49.127649|-21.8302281,-49.1275669|-21.8300812,-49.1274859"
        );
    }

    #[test]
    fn test_render_one_group_per_point() {
        let points = sample_points(37);
        let rendered = render_chunk(&points);
        assert_eq!(rendered.split('|').count(), 37);
        assert!(!rendered.chars().any(char::is_whitespace));
        for group in rendered.split('|') {
            assert_eq!(group.split(',').count(), 2);
        }
    }

    #[test]
    fn test_render_empty_chunk() {
        assert_eq!(render_chunk(&[]), "");
    }

    #[test]
    fn test_default_batch_size() {
        assert_eq!(Batcher::default().batch_size(), DEFAULT_BATCH_SIZE);
    }
}
