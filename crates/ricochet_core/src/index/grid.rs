//! Uniform hash-grid backing for the spatial index.
//!
//! Points bucket into integer-keyed cells; a radius query scans only the
//! cell range covered by the search sphere. Rebuilt from scratch every
//! tick, never updated incrementally.

use super::{NeighborSet, SpatialIndex};
use crate::body::BodyId;
use crate::math::Vec3;
use std::collections::HashMap;

/// Grid cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CellCoord {
    x: i32,
    y: i32,
    z: i32,
}

/// Entry in the grid: indexed position plus its insertion index.
#[derive(Debug, Clone, Copy)]
struct GridEntry {
    index: u32,
    position: Vec3,
}

/// Uniform spatial hash grid over 3-D points.
pub struct HashGrid {
    /// Cell edge length in world units. Must be positive; queries stay
    /// correct for any radius because the scanned cell range is derived
    /// from the radius, not fixed to adjacent cells.
    cell_size: f32,
    cells: HashMap<CellCoord, Vec<GridEntry>>,
}

impl HashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    fn pos_to_cell(&self, position: Vec3) -> CellCoord {
        CellCoord {
            x: (position.x / self.cell_size).floor() as i32,
            y: (position.y / self.cell_size).floor() as i32,
            z: (position.z / self.cell_size).floor() as i32,
        }
    }

    fn insert(&mut self, index: u32, position: Vec3) {
        let cell = self.pos_to_cell(position);
        self.cells
            .entry(cell)
            .or_default()
            .push(GridEntry { index, position });
    }

    fn clear(&mut self) {
        self.cells.clear();
    }
}

impl SpatialIndex for HashGrid {
    fn rebuild(&mut self, points: &[Vec3]) {
        self.clear();
        for (index, &position) in points.iter().enumerate() {
            self.insert(index as u32, position);
        }
    }

    fn query_radius(&self, center: Vec3, radius: f32, out: &mut NeighborSet) {
        out.reset();

        let min_cell = self.pos_to_cell(center - Vec3::splat(radius));
        let max_cell = self.pos_to_cell(center + Vec3::splat(radius));

        let mut matches: Vec<(f32, u32)> = Vec::new();
        for cx in min_cell.x..=max_cell.x {
            for cy in min_cell.y..=max_cell.y {
                for cz in min_cell.z..=max_cell.z {
                    let coord = CellCoord {
                        x: cx,
                        y: cy,
                        z: cz,
                    };
                    let Some(entries) = self.cells.get(&coord) else {
                        continue;
                    };
                    for entry in entries {
                        let distance = entry.position.distance(center);
                        if distance <= radius {
                            matches.push((distance, entry.index));
                        }
                    }
                }
            }
        }

        // Insertion order breaks distance ties
        matches.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (distance, index) in matches {
            out.record(distance, BodyId::new(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(grid: &HashGrid, center: Vec3, radius: f32, capacity: usize) -> NeighborSet {
        let mut out = NeighborSet::new(capacity);
        grid.query_radius(center, radius, &mut out);
        out
    }

    #[test]
    fn zero_radius_query_finds_only_itself() {
        let mut grid = HashGrid::new(1.0);
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
        ];
        grid.rebuild(&points);

        let out = query(&grid, points[0], 0.0, 4);
        assert_eq!(out.count(), 1);
        assert_eq!(out.hits()[0].body, BodyId::new(0));
        assert_eq!(out.hits()[0].distance, 0.0);
    }

    #[test]
    fn radius_is_inclusive() {
        let mut grid = HashGrid::new(1.0);
        grid.rebuild(&[Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)]);

        let out = query(&grid, Vec3::ZERO, 2.0, 4);
        assert_eq!(out.count(), 2);
    }

    #[test]
    fn larger_radius_is_a_superset() {
        let mut grid = HashGrid::new(1.0);
        let points: Vec<Vec3> = (0..10).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        grid.rebuild(&points);

        let mut last_count = 0;
        for radius in [0.0, 1.5, 3.5, 20.0] {
            let out = query(&grid, points[0], radius, 16);
            assert!(out.count() >= last_count);
            last_count = out.count();
        }
        assert_eq!(last_count, 10);
    }

    #[test]
    fn results_ordered_by_distance() {
        let mut grid = HashGrid::new(1.0);
        grid.rebuild(&[
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        ]);

        let out = query(&grid, Vec3::ZERO, 10.0, 8);
        let distances: Vec<f32> = out.hits().iter().map(|n| n.distance).collect();
        assert_eq!(distances, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn coincident_points_tie_break_by_insertion_order() {
        let mut grid = HashGrid::new(1.0);
        grid.rebuild(&[Vec3::ZERO, Vec3::ZERO, Vec3::ZERO]);

        let out = query(&grid, Vec3::ZERO, 0.0, 2);
        assert_eq!(out.count(), 3);
        assert_eq!(out.hits()[0].body, BodyId::new(0));
        assert_eq!(out.hits()[1].body, BodyId::new(1));
    }

    #[test]
    fn rebuild_replaces_contents_wholesale() {
        let mut grid = HashGrid::new(1.0);
        grid.rebuild(&[Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0)]);
        grid.rebuild(&[Vec3::new(7.0, 7.0, 7.0)]);

        let out = query(&grid, Vec3::ZERO, 1.0, 4);
        assert_eq!(out.count(), 0);

        let out = query(&grid, Vec3::new(7.0, 7.0, 7.0), 0.0, 4);
        assert_eq!(out.count(), 1);
    }

    #[test]
    fn query_spanning_many_cells_with_small_cell_size() {
        let mut grid = HashGrid::new(0.25);
        grid.rebuild(&[
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 2.5, 0.0),
        ]);

        let out = query(&grid, Vec3::ZERO, 2.1, 8);
        assert_eq!(out.count(), 2);
    }
}
