//! Cursor picking against the point cloud.
//!
//! A pick unprojects the cursor into a world-space ray, collects candidate
//! points by marching a widening sphere along the ray through the store's
//! spatial index, then scores each candidate exactly. The score combines the
//! squared radial distance from the ray with the squared screen distance
//! from the cursor, so a point that is marginally farther from the ray but
//! visually under the cursor still wins. Near-equal scores fall back to the
//! point closest along the ray.

use std::collections::HashSet;

use glam::{Vec2, Vec3};
use splatnav_core::{PickOptions, PointCloudStore};

use crate::camera::Camera;

/// A world-space ray through a screen pixel.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin (on the near plane).
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Point at parameter `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a successful pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Index of the picked point in the store.
    pub index: usize,
    /// Picked point in the cloud's local space.
    pub local_position: Vec3,
    /// Picked point in world space.
    pub world_position: Vec3,
    /// Distance along the pick ray to the point's closest approach.
    pub ray_t: f32,
}

/// Unprojects a cursor position into a world-space ray.
///
/// Uses wgpu-style NDC depth, near plane at z = 0 and far at z = 1. Returns
/// `None` for an empty viewport or a degenerate projection.
#[must_use]
pub fn screen_ray(click_pos: Vec2, viewport: Vec2, camera: &Camera) -> Option<Ray> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }

    let half_width = viewport.x / 2.0;
    let half_height = viewport.y / 2.0;
    let ndc_x = (click_pos.x / half_width) - 1.0;
    let ndc_y = 1.0 - (click_pos.y / half_height);

    let inv_view_proj = camera.view_projection_matrix().inverse();

    let near = inv_view_proj * glam::Vec4::new(ndc_x, ndc_y, 0.0, 1.0);
    let far = inv_view_proj * glam::Vec4::new(ndc_x, ndc_y, 1.0, 1.0);

    if near.w.abs() < 1e-6 || far.w.abs() < 1e-6 {
        return None;
    }

    let origin = near.truncate() / near.w;
    let through = far.truncate() / far.w;
    let direction = (through - origin).normalize_or_zero();
    if direction.length_squared() < 1e-12 {
        return None;
    }

    Some(Ray { origin, direction })
}

/// Picks the best visible point under the cursor.
#[derive(Debug, Clone)]
pub struct PointPicker {
    opts: PickOptions,
}

impl PointPicker {
    /// Creates a picker with the given tuning.
    #[must_use]
    pub fn new(opts: PickOptions) -> Self {
        Self { opts }
    }

    /// Picker tuning.
    #[must_use]
    pub fn options(&self) -> &PickOptions {
        &self.opts
    }

    /// Picks the best visible point under `click_pos`, or `None` when no
    /// point projects within the pixel threshold.
    #[must_use]
    pub fn pick(
        &self,
        store: &PointCloudStore,
        camera: &Camera,
        click_pos: Vec2,
        viewport: Vec2,
    ) -> Option<PickHit> {
        let ray = screen_ray(click_pos, viewport, camera)?;
        let candidates = self.collect_candidates(store, camera, &ray, viewport);

        let view_proj = camera.view_projection_matrix();
        let threshold_sq = self.opts.pixel_threshold * self.opts.pixel_threshold;
        let tie = self.opts.tie_epsilon;

        // (score, ray t, index)
        let mut best: Option<(f32, f32, usize)> = None;
        for index in candidates {
            let Some(world) = store.world_position(index) else {
                continue;
            };

            let clip = view_proj * world.extend(1.0);
            if clip.w <= 1e-6 {
                continue;
            }
            let ndc = clip.truncate() / clip.w;
            let sx = (ndc.x + 1.0) * 0.5 * viewport.x;
            let sy = (1.0 - ndc.y) * 0.5 * viewport.y;
            let screen_sq =
                (sx - click_pos.x) * (sx - click_pos.x) + (sy - click_pos.y) * (sy - click_pos.y);
            if screen_sq > threshold_sq {
                continue;
            }

            let t = (world - ray.origin).dot(ray.direction);
            if t < 0.0 {
                continue;
            }
            let radial_sq = (world - ray.at(t)).length_squared();
            let score = radial_sq + screen_sq * self.opts.screen_penalty;

            let is_better = match best {
                None => true,
                Some((best_score, best_t, _)) => {
                    score < best_score - tie
                        || ((score - best_score).abs() <= tie && t < best_t)
                }
            };
            if is_better {
                best = Some((score, t, index));
            }
        }

        let (_, ray_t, index) = best?;
        Some(PickHit {
            index,
            local_position: store.local_position(index)?,
            world_position: store.world_position(index)?,
            ray_t,
        })
    }

    /// Marches a sphere along the ray through the store's spatial index.
    ///
    /// The sphere radius at each step covers the pixel threshold at that
    /// depth plus one grid cell of slack, so every point that could pass the
    /// exact screen test is collected. Indices are deduplicated; scoring
    /// happens in `pick`.
    fn collect_candidates(
        &self,
        store: &PointCloudStore,
        camera: &Camera,
        ray: &Ray,
        viewport: Vec2,
    ) -> Vec<usize> {
        let Some(bounds) = store.bounds() else {
            return Vec::new();
        };
        let cell = store.grid_cell_size().max(1e-3);

        // Inflate the bounds by the worst-case pick radius so rays that
        // graze the cloud still collect candidates.
        let far_t = (bounds.max - ray.origin)
            .length()
            .max((bounds.min - ray.origin).length());
        let margin =
            camera.world_units_per_pixel(far_t, viewport.y) * self.opts.pixel_threshold + cell;
        let Some((t_enter, t_exit)) = ray_box_interval(
            ray,
            bounds.min - Vec3::splat(margin),
            bounds.max + Vec3::splat(margin),
        ) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        let mut t = t_enter;
        loop {
            let radius = camera.world_units_per_pixel(t.max(camera.near), viewport.y)
                * self.opts.pixel_threshold
                + cell;
            store.for_each_visible_in_sphere(ray.at(t), radius, |index| {
                if seen.insert(index) {
                    candidates.push(index);
                }
                true
            });
            if t >= t_exit {
                break;
            }
            t = (t + cell).min(t_exit);
        }
        candidates
    }
}

/// Slab test: the parameter interval where the ray is inside the box, or
/// `None` on a miss. The entry parameter is clamped to zero for rays that
/// start inside.
fn ray_box_interval(ray: &Ray, min: Vec3, max: Vec3) -> Option<(f32, f32)> {
    let mut t0 = f32::NEG_INFINITY;
    let mut t1 = f32::INFINITY;
    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.direction[axis];
        if dir.abs() < 1e-9 {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
        } else {
            let ta = (min[axis] - origin) / dir;
            let tb = (max[axis] - origin) / dir;
            let (near, far) = if ta <= tb { (ta, tb) } else { (tb, ta) };
            t0 = t0.max(near);
            t1 = t1.min(far);
            if t0 > t1 {
                return None;
            }
        }
    }
    if t1 < 0.0 {
        return None;
    }
    Some((t0.max(0.0), t1))
}
