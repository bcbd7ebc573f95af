//! Single-owner point cloud state.
//!
//! [`PointCloudStore`] owns the position buffer and the hidden/selected
//! index sets; every other component reads positions and requests mutations
//! through this API. Centralizing mutation keeps the core invariant easy to
//! enforce: a selected index is never also hidden.
//!
//! Positions are stored in local space alongside a cached world-space copy
//! (the model transform applied), because picking, collision, and ground
//! queries all operate in world space every frame. A uniform hash grid over
//! the world cache answers the spatial queries; it is rebuilt on load and
//! transform changes and updated per point on mutation.

use glam::Vec3;
use std::collections::HashSet;

use crate::error::{Result, SplatnavError};
use crate::grid::UniformGrid;
use crate::transform::ModelTransform;

/// World-space axis-aligned bounds of the loaded cloud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl SceneBounds {
    /// Returns the center of the bounds.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the diagonal length, the scene's length scale.
    #[must_use]
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).length()
    }

    fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }
}

/// Owner of the point positions and the hidden/selected sets.
#[derive(Debug, Default)]
pub struct PointCloudStore {
    positions: Vec<Vec3>,
    world: Vec<Vec3>,
    hidden: HashSet<usize>,
    selected: HashSet<usize>,
    transform: ModelTransform,
    grid: UniformGrid,
    bounds: Option<SceneBounds>,
    dirty_positions: bool,
    dirty_visibility: bool,
}

impl PointCloudStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points, hidden ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when no cloud is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of points not currently hidden.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.positions.len() - self.hidden.len()
    }

    /// Replaces the cloud wholesale; hidden and selected sets are cleared,
    /// the model transform is kept.
    ///
    /// # Errors
    /// `NonFinitePosition` if any incoming coordinate is NaN or infinite.
    pub fn set_positions(&mut self, points: Vec<Vec3>) -> Result<()> {
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(SplatnavError::NonFinitePosition { index });
        }
        self.positions = points;
        self.hidden.clear();
        self.selected.clear();
        self.rebuild_derived();
        self.dirty_positions = true;
        self.dirty_visibility = true;
        log::debug!("point cloud replaced: {} points", self.positions.len());
        Ok(())
    }

    /// Replaces the cloud from a dense interleaved `x,y,z` buffer.
    ///
    /// # Errors
    /// `SizeMismatch` if the length is not a multiple of 3;
    /// `NonFinitePosition` as for [`set_positions`](Self::set_positions).
    pub fn set_positions_interleaved(&mut self, data: &[f32]) -> Result<()> {
        if data.len() % 3 != 0 {
            return Err(SplatnavError::SizeMismatch {
                expected_multiple: 3,
                actual: data.len(),
            });
        }
        let triples: &[[f32; 3]] = bytemuck::cast_slice(data);
        self.set_positions(triples.iter().copied().map(Vec3::from_array).collect())
    }

    /// Marks the given indices hidden or visible. Hiding an index also
    /// removes it from the selected set. Out-of-range indices are ignored.
    pub fn set_hidden(&mut self, indices: &[usize], hidden: bool) {
        let mut changed = false;
        for &index in indices {
            if index >= self.positions.len() {
                continue;
            }
            if hidden {
                changed |= self.hidden.insert(index);
                // Hiding invalidates selection for that index.
                changed |= self.selected.remove(&index);
            } else {
                changed |= self.hidden.remove(&index);
            }
        }
        if changed {
            self.dirty_visibility = true;
        }
    }

    /// Replaces the selected set, filtering out hidden and out-of-range
    /// indices.
    pub fn set_selected(&mut self, indices: &[usize]) {
        let next: HashSet<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.positions.len() && !self.hidden.contains(&i))
            .collect();
        if next != self.selected {
            self.selected = next;
            self.dirty_visibility = true;
        }
    }

    /// Adds one index to the selection; hidden and out-of-range indices are
    /// ignored. Returns whether the selection changed.
    pub fn insert_selected(&mut self, index: usize) -> bool {
        if index >= self.positions.len() || self.hidden.contains(&index) {
            return false;
        }
        let inserted = self.selected.insert(index);
        if inserted {
            self.dirty_visibility = true;
        }
        inserted
    }

    /// Toggles one index in the selection (subject to the same filtering as
    /// [`insert_selected`](Self::insert_selected)).
    pub fn toggle_selected(&mut self, index: usize) {
        if self.selected.contains(&index) {
            self.selected.remove(&index);
            self.dirty_visibility = true;
        } else {
            self.insert_selected(index);
        }
    }

    /// Empties the selected set.
    pub fn clear_selected(&mut self) {
        if !self.selected.is_empty() {
            self.selected.clear();
            self.dirty_visibility = true;
        }
    }

    /// Restores visibility of all points; selection is untouched.
    pub fn clear_hidden(&mut self) {
        if !self.hidden.is_empty() {
            self.hidden.clear();
            self.dirty_visibility = true;
        }
    }

    /// Applies `f` to each indexed local position. `None` or a candidate
    /// with a non-finite component leaves that point unchanged; other points
    /// in the batch still commit. Out-of-range indices are ignored.
    ///
    /// Returns whether any position changed. The world cache, grid, and
    /// bounds are refreshed internally; bounds only grow here and are refit
    /// exactly on the next load or transform change.
    pub fn mutate_positions<F>(&mut self, indices: &[usize], mut f: F) -> bool
    where
        F: FnMut(Vec3, usize) -> Option<Vec3>,
    {
        let mut changed = false;
        for &index in indices {
            if index >= self.positions.len() {
                continue;
            }
            let Some(candidate) = f(self.positions[index], index) else {
                continue;
            };
            if !candidate.is_finite() {
                log::debug!("rejected non-finite position for point {index}");
                continue;
            }
            let old_world = self.world[index];
            let new_world = self.transform.apply(candidate);
            self.positions[index] = candidate;
            self.world[index] = new_world;
            self.grid.update(index, old_world, new_world);
            if let Some(bounds) = &mut self.bounds {
                bounds.grow(new_world);
            }
            changed = true;
        }
        if changed {
            self.dirty_positions = true;
        }
        changed
    }

    /// Iterates indices not in the hidden set; `f` returns `false` to stop.
    pub fn for_each_visible<F>(&self, mut f: F)
    where
        F: FnMut(usize) -> bool,
    {
        for index in 0..self.positions.len() {
            if self.hidden.contains(&index) {
                continue;
            }
            if !f(index) {
                return;
            }
        }
    }

    /// Visits visible points within `radius` of `center` (world space);
    /// `f` returns `false` to stop early.
    pub fn for_each_visible_in_sphere<F>(&self, center: Vec3, radius: f32, mut f: F)
    where
        F: FnMut(usize) -> bool,
    {
        self.grid.for_each_in_sphere(center, radius, &self.world, |index| {
            if self.hidden.contains(&index) {
                return true;
            }
            f(index)
        });
    }

    /// Visits visible points within `radius` of the vertical line through
    /// `(center_x, center_z)` and inside `[y_min, y_max]` (world space);
    /// `f` returns `false` to stop early.
    pub fn for_each_visible_in_column<F>(
        &self,
        center_x: f32,
        center_z: f32,
        radius: f32,
        y_min: f32,
        y_max: f32,
        mut f: F,
    ) where
        F: FnMut(usize) -> bool,
    {
        self.grid
            .for_each_in_column(center_x, center_z, radius, y_min, y_max, &self.world, |index| {
                if self.hidden.contains(&index) {
                    return true;
                }
                f(index)
            });
    }

    /// Local-space position, or `None` out of range.
    #[must_use]
    pub fn local_position(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).copied()
    }

    /// World-space position, or `None` out of range.
    #[must_use]
    pub fn world_position(&self, index: usize) -> Option<Vec3> {
        self.world.get(index).copied()
    }

    /// Read-only view of the local positions.
    #[must_use]
    pub fn local_positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Read-only view of the cached world positions.
    #[must_use]
    pub fn world_positions(&self) -> &[Vec3] {
        &self.world
    }

    /// Whether an index is hidden; out-of-range indices report `false`.
    #[must_use]
    pub fn is_hidden(&self, index: usize) -> bool {
        self.hidden.contains(&index)
    }

    /// Whether an index is selected; out-of-range indices report `false`.
    #[must_use]
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// The hidden index set.
    #[must_use]
    pub fn hidden(&self) -> &HashSet<usize> {
        &self.hidden
    }

    /// The selected index set.
    #[must_use]
    pub fn selected(&self) -> &HashSet<usize> {
        &self.selected
    }

    /// The model transform.
    #[must_use]
    pub fn transform(&self) -> ModelTransform {
        self.transform
    }

    /// Replaces the model transform; the world cache, grid, and bounds are
    /// rebuilt.
    pub fn set_transform(&mut self, transform: ModelTransform) {
        self.transform = transform;
        self.rebuild_derived();
        self.dirty_positions = true;
    }

    /// World-space bounds, or `None` while the store is empty.
    #[must_use]
    pub fn bounds(&self) -> Option<SceneBounds> {
        self.bounds
    }

    /// Cell size of the internal spatial index (the picker derives its ray
    /// march step from this).
    #[must_use]
    pub fn grid_cell_size(&self) -> f32 {
        self.grid.cell_size()
    }

    /// True when positions changed since the last [`clear_dirty`](Self::clear_dirty).
    #[must_use]
    pub fn positions_dirty(&self) -> bool {
        self.dirty_positions
    }

    /// True when the hidden/selected sets changed since the last
    /// [`clear_dirty`](Self::clear_dirty).
    #[must_use]
    pub fn visibility_dirty(&self) -> bool {
        self.dirty_visibility
    }

    /// Acknowledges both dirty flags (called by the renderer after syncing).
    pub fn clear_dirty(&mut self) {
        self.dirty_positions = false;
        self.dirty_visibility = false;
    }

    fn rebuild_derived(&mut self) {
        let transform = self.transform;
        self.world = self.positions.iter().map(|&p| transform.apply(p)).collect();
        self.bounds = compute_bounds(&self.world);
        let diagonal = self.bounds.map_or(0.0, |b| b.diagonal());
        let cell_size = UniformGrid::cell_size_for_diagonal(diagonal);
        self.grid = UniformGrid::build(&self.world, cell_size);
    }
}

fn compute_bounds(points: &[Vec3]) -> Option<SceneBounds> {
    let first = *points.first()?;
    let mut bounds = SceneBounds {
        min: first,
        max: first,
    };
    for &p in &points[1..] {
        bounds.grow(p);
    }
    Some(bounds)
}
