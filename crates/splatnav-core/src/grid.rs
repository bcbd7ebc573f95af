//! Uniform hash grid over world-space point positions.
//!
//! Picking, collision, and ground queries all ask "which points lie near
//! here"; answering that with a full scan over the cloud every frame does
//! not scale past a few tens of thousands of points. The grid buckets point
//! indices by cell so range queries only touch the handful of cells
//! overlapping the query volume. It is built once per scene load and
//! updated per-point on mutation.
//!
//! The grid stores indices only; callers pass the position slice back in so
//! there is a single copy of the data (the store's world cache).

use glam::Vec3;
use std::collections::HashMap;

type CellKey = (i32, i32, i32);

/// Spatial index mapping grid cells to the point indices inside them.
#[derive(Debug, Clone, Default)]
pub struct UniformGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl UniformGrid {
    /// Target number of cells along the bounds diagonal when deriving a cell
    /// size from scene extent.
    const TARGET_CELLS_PER_DIAGONAL: f32 = 64.0;

    /// Creates an empty grid with the given cell size (clamped positive).
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1e-6),
            cells: HashMap::new(),
        }
    }

    /// Derives a cell size from the scene bounds diagonal.
    ///
    /// Degenerate scenes (all points coincident) fall back to a unit cell.
    #[must_use]
    pub fn cell_size_for_diagonal(diagonal: f32) -> f32 {
        if diagonal > 1e-6 {
            diagonal / Self::TARGET_CELLS_PER_DIAGONAL
        } else {
            1.0
        }
    }

    /// Builds a grid over the given positions.
    #[must_use]
    pub fn build(points: &[Vec3], cell_size: f32) -> Self {
        let mut grid = Self::new(cell_size);
        for (index, &p) in points.iter().enumerate() {
            grid.insert(index, p);
        }
        grid
    }

    /// Returns the cell size.
    #[must_use]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Returns the number of occupied cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    fn cell_of(&self, p: Vec3) -> CellKey {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
            (p.z / self.cell_size).floor() as i32,
        )
    }

    /// Inserts a point index at the given position.
    pub fn insert(&mut self, index: usize, position: Vec3) {
        let key = self.cell_of(position);
        self.cells.entry(key).or_default().push(index);
    }

    /// Removes a point index, given the position it was inserted at.
    pub fn remove(&mut self, index: usize, position: Vec3) {
        let key = self.cell_of(position);
        if let Some(bucket) = self.cells.get_mut(&key) {
            if let Some(slot) = bucket.iter().position(|&i| i == index) {
                bucket.swap_remove(slot);
            }
            if bucket.is_empty() {
                self.cells.remove(&key);
            }
        }
    }

    /// Moves a point index between cells after a position change.
    pub fn update(&mut self, index: usize, old_position: Vec3, new_position: Vec3) {
        let old_key = self.cell_of(old_position);
        let new_key = self.cell_of(new_position);
        if old_key == new_key {
            return;
        }
        self.remove(index, old_position);
        self.cells.entry(new_key).or_default().push(index);
    }

    /// Visits every index whose position lies within `radius` of `center`.
    ///
    /// `points` must be the same slice the grid was built over. The closure
    /// returns `false` to stop early.
    pub fn for_each_in_sphere<F>(&self, center: Vec3, radius: f32, points: &[Vec3], mut f: F)
    where
        F: FnMut(usize) -> bool,
    {
        let radius = radius.max(0.0);
        let r_sq = radius * radius;
        let min = self.cell_of(center - Vec3::splat(radius));
        let max = self.cell_of(center + Vec3::splat(radius));
        self.for_each_in_cell_range(min, max, |index| {
            let p = points[index];
            if (p - center).length_squared() <= r_sq {
                return f(index);
            }
            true
        });
    }

    /// Visits every index within `radius` of `(center_x, center_z)`
    /// horizontally and inside `[y_min, y_max]` vertically.
    ///
    /// Used by ground probing, which searches a vertical slab under the
    /// avatar rather than a sphere. The closure returns `false` to stop.
    pub fn for_each_in_column<F>(
        &self,
        center_x: f32,
        center_z: f32,
        radius: f32,
        y_min: f32,
        y_max: f32,
        points: &[Vec3],
        mut f: F,
    ) where
        F: FnMut(usize) -> bool,
    {
        if y_max < y_min {
            return;
        }
        let radius = radius.max(0.0);
        let r_sq = radius * radius;
        let min = self.cell_of(Vec3::new(center_x - radius, y_min, center_z - radius));
        let max = self.cell_of(Vec3::new(center_x + radius, y_max, center_z + radius));
        self.for_each_in_cell_range(min, max, |index| {
            let p = points[index];
            let dx = p.x - center_x;
            let dz = p.z - center_z;
            if dx * dx + dz * dz <= r_sq && p.y >= y_min && p.y <= y_max {
                return f(index);
            }
            true
        });
    }

    /// Visits every index in the inclusive cell range, early-exit capable.
    ///
    /// When the range spans more cells than are occupied, iterates the
    /// occupied cells instead so a huge query volume cannot degrade below
    /// the plain scan it replaces.
    fn for_each_in_cell_range<F>(&self, min: CellKey, max: CellKey, mut f: F)
    where
        F: FnMut(usize) -> bool,
    {
        let span_x = i64::from(max.0) - i64::from(min.0) + 1;
        let span_y = i64::from(max.1) - i64::from(min.1) + 1;
        let span_z = i64::from(max.2) - i64::from(min.2) + 1;
        let span = span_x.saturating_mul(span_y).saturating_mul(span_z);

        let in_range = |key: &CellKey| {
            key.0 >= min.0
                && key.0 <= max.0
                && key.1 >= min.1
                && key.1 <= max.1
                && key.2 >= min.2
                && key.2 <= max.2
        };

        if span > self.cells.len() as i64 {
            for (key, bucket) in &self.cells {
                if !in_range(key) {
                    continue;
                }
                for &index in bucket {
                    if !f(index) {
                        return;
                    }
                }
            }
            return;
        }

        for cx in min.0..=max.0 {
            for cy in min.1..=max.1 {
                for cz in min.2..=max.2 {
                    if let Some(bucket) = self.cells.get(&(cx, cy, cz)) {
                        for &index in bucket {
                            if !f(index) {
                                return;
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn collect_sphere(grid: &UniformGrid, center: Vec3, radius: f32, points: &[Vec3]) -> Vec<usize> {
        let mut found = Vec::new();
        grid.for_each_in_sphere(center, radius, points, |i| {
            found.push(i);
            true
        });
        found.sort_unstable();
        found
    }

    #[test]
    fn test_sphere_query_finds_near_points() {
        let points = vec![
            Vec3::ZERO,
            Vec3::new(0.4, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
        ];
        let grid = UniformGrid::build(&points, 1.0);
        assert_eq!(collect_sphere(&grid, Vec3::ZERO, 1.0, &points), vec![0, 1]);
    }

    #[test]
    fn test_sphere_query_early_exit() {
        let points = vec![Vec3::ZERO, Vec3::new(0.1, 0.0, 0.0), Vec3::new(0.2, 0.0, 0.0)];
        let grid = UniformGrid::build(&points, 1.0);
        let mut visits = 0;
        grid.for_each_in_sphere(Vec3::ZERO, 1.0, &points, |_| {
            visits += 1;
            false
        });
        assert_eq!(visits, 1);
    }

    #[test]
    fn test_update_moves_point_between_cells() {
        let mut points = vec![Vec3::ZERO];
        let mut grid = UniformGrid::build(&points, 1.0);
        let new_pos = Vec3::new(10.0, 0.0, 0.0);
        grid.update(0, points[0], new_pos);
        points[0] = new_pos;
        assert!(collect_sphere(&grid, Vec3::ZERO, 1.0, &points).is_empty());
        assert_eq!(collect_sphere(&grid, new_pos, 0.5, &points), vec![0]);
    }

    #[test]
    fn test_remove_empties_cell() {
        let points = vec![Vec3::ZERO];
        let mut grid = UniformGrid::build(&points, 1.0);
        grid.remove(0, points[0]);
        assert_eq!(grid.occupied_cells(), 0);
    }

    #[test]
    fn test_column_query_respects_band() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.1, -2.0, 0.0),
            Vec3::new(0.1, 5.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        ];
        let grid = UniformGrid::build(&points, 1.0);
        let mut found = Vec::new();
        grid.for_each_in_column(0.0, 0.0, 0.5, -0.5, 0.5, &points, |i| {
            found.push(i);
            true
        });
        found.sort_unstable();
        assert_eq!(found, vec![0]);
    }

    #[test]
    fn test_huge_radius_falls_back_to_occupied_cells() {
        let points = vec![Vec3::ZERO, Vec3::new(100.0, 100.0, 100.0)];
        let grid = UniformGrid::build(&points, 0.01);
        // Cell span for this radius vastly exceeds two occupied cells.
        assert_eq!(
            collect_sphere(&grid, Vec3::ZERO, 1000.0, &points),
            vec![0, 1]
        );
    }

    #[test]
    fn test_degenerate_diagonal_gets_unit_cell() {
        assert_eq!(UniformGrid::cell_size_for_diagonal(0.0), 1.0);
        assert!(UniformGrid::cell_size_for_diagonal(64.0) > 0.9);
    }

    proptest! {
        /// Grid sphere queries agree with a brute-force scan.
        #[test]
        fn prop_sphere_query_matches_scan(
            coords in prop::collection::vec((-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0), 0..80),
            center in (-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0),
            radius in 0.0f32..6.0,
            cell in 0.2f32..4.0,
        ) {
            let points: Vec<Vec3> = coords.iter().map(|&(x, y, z)| Vec3::new(x, y, z)).collect();
            let center = Vec3::new(center.0, center.1, center.2);
            let grid = UniformGrid::build(&points, cell);

            let from_grid = collect_sphere(&grid, center, radius, &points);
            let mut from_scan: Vec<usize> = points
                .iter()
                .enumerate()
                .filter(|(_, p)| (**p - center).length_squared() <= radius * radius)
                .map(|(i, _)| i)
                .collect();
            from_scan.sort_unstable();
            prop_assert_eq!(from_grid, from_scan);
        }
    }
}
