//! Spatial index adapter for amortized near-neighbor detection.
//!
//! The pipeline never touches the backing structure directly: it rebuilds
//! the index wholesale from a position snapshot and issues one radius
//! query per body. The adapter owns the per-body result buffers, sized
//! once at initialization and never resized mid-run.

pub mod grid;

pub use grid::HashGrid;

use crate::body::BodyId;
use crate::math::Vec3;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("spatial index adapter has no positive result capacity")]
    Unavailable,
}

/// One match from a radius query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub distance: f32,
    pub body: BodyId,
}

/// Fixed-capacity result buffer for a single body's query.
///
/// `count` reports every match found; only the nearest `capacity` of
/// them are retained, ordered by non-decreasing distance with ties
/// broken by index insertion order. Overflow truncates silently, it is
/// not an error.
#[derive(Debug, Clone)]
pub struct NeighborSet {
    neighbors: Vec<Neighbor>,
    count: usize,
    capacity: usize,
}

impl NeighborSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            neighbors: Vec::with_capacity(capacity),
            count: 0,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total matches found by the last query, including truncated ones.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Retained matches, nearest first.
    pub fn hits(&self) -> &[Neighbor] {
        &self.neighbors
    }

    /// Empty the buffer ahead of a fresh query.
    pub fn reset(&mut self) {
        self.neighbors.clear();
        self.count = 0;
    }

    /// Record one match, keeping the retained prefix sorted. Insertion
    /// after all equal distances preserves insertion order for ties.
    pub fn record(&mut self, distance: f32, body: BodyId) {
        self.count += 1;

        let at = self
            .neighbors
            .partition_point(|existing| existing.distance <= distance);
        if at >= self.capacity {
            return;
        }
        self.neighbors.insert(at, Neighbor { distance, body });
        self.neighbors.truncate(self.capacity);
    }
}

/// Contract for the backing structure: wholesale rebuild plus inclusive
/// radius search. The internal representation is deliberately opaque.
pub trait SpatialIndex {
    /// Replace all indexed points with `points`; the point at position
    /// `i` belongs to the body with dense id `i`.
    fn rebuild(&mut self, points: &[Vec3]);

    /// Find every indexed point within `radius` of `center` (inclusive,
    /// so a radius-0 query at an indexed point returns that point) and
    /// record the matches into `out`.
    fn query_radius(&self, center: Vec3, radius: f32, out: &mut NeighborSet);
}

/// Owns the backing index and one result buffer per body.
pub struct IndexAdapter<I: SpatialIndex> {
    index: I,
    results: Vec<NeighborSet>,
    capacity: usize,
}

impl<I: SpatialIndex> IndexAdapter<I> {
    pub fn new(index: I, capacity: usize) -> Result<Self, IndexError> {
        if capacity == 0 {
            return Err(IndexError::Unavailable);
        }
        Ok(Self {
            index,
            results: Vec::new(),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Grow the per-body result buffers to cover `count` bodies. Called
    /// between ticks when a spawn batch lands; existing buffers keep
    /// their identity.
    pub fn ensure_bodies(&mut self, count: usize) {
        while self.results.len() < count {
            self.results.push(NeighborSet::new(self.capacity));
        }
    }

    /// Wholesale index rebuild from a complete position snapshot.
    pub fn rebuild(&mut self, positions: &[Vec3]) -> Result<(), IndexError> {
        if self.capacity == 0 {
            return Err(IndexError::Unavailable);
        }
        self.index.rebuild(positions);
        Ok(())
    }

    /// Split borrow for the query fan-out: the index is shared read-only
    /// across work units while each unit gets exactly one result buffer.
    pub fn query_buffers(&mut self) -> (&I, &mut [NeighborSet]) {
        (&self.index, &mut self.results)
    }

    pub fn results(&self) -> &[NeighborSet] {
        &self.results
    }

    /// Drop every per-body result buffer (full reset path). The backing
    /// index keeps its stale contents until the next rebuild.
    pub fn clear(&mut self) {
        self.results.clear();
    }
}
