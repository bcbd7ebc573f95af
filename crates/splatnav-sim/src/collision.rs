//! Collision and ground queries against the point cloud.
//!
//! Both queries run off the store's grid-backed range scans. Collision is a
//! sphere-vs-point test with early exit; ground probing searches a vertical
//! column under the avatar's feet. All coordinates are world space and only
//! visible points participate, so hiding part of the cloud opens it up for
//! walking.

use glam::Vec3;
use splatnav_core::{AvatarOptions, PointCloudStore};

/// True if any visible point lies within `radius` of `center`.
#[must_use]
pub fn check_collision(store: &PointCloudStore, center: Vec3, radius: f32) -> bool {
    let mut hit = false;
    store.for_each_visible_in_sphere(center, radius, |_| {
        hit = true;
        false
    });
    hit
}

/// Result of a ground probe under the avatar.
///
/// `grounded`/`ground_height` come from the strict support band around the
/// feet. The `nearest`/`lowest` heights are computed over a deeper window and
/// exist even when the strict test fails; height changes use them to re-snap
/// onto a surface. All heights are feet heights (point Y), not eye heights.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroundProbe {
    /// A support point exists in the strict band under the feet.
    pub grounded: bool,
    /// Highest support point in the strict band.
    pub ground_height: Option<f32>,
    /// Surface height closest to the feet within the wide window.
    pub nearest_ground_height: Option<f32>,
    /// Lowest surface height within the wide window.
    pub lowest_ground_height: Option<f32>,
}

/// Scans for ground under an avatar eye position.
///
/// Feet sit `eye_height` below `position`. A point is support if it lies
/// within `collision_radius` horizontally of the feet and vertically within
/// the strict band: `ground_tolerance` below the feet up to
/// `ground_penetration` above them. The wide window for the hint heights
/// extends `snap_search_depth` below the feet instead.
#[must_use]
pub fn probe_ground(
    store: &PointCloudStore,
    position: Vec3,
    eye_height: f32,
    collision_radius: f32,
    opts: &AvatarOptions,
) -> GroundProbe {
    let feet = Vec3::new(position.x, position.y - eye_height, position.z);
    let y_min = feet.y - opts.snap_search_depth;
    let y_max = feet.y + opts.ground_penetration;
    let strict_min = feet.y - opts.ground_tolerance;

    let mut probe = GroundProbe::default();
    let mut nearest_delta = f32::INFINITY;

    store.for_each_visible_in_column(feet.x, feet.z, collision_radius, y_min, y_max, |index| {
        let Some(p) = store.world_position(index) else {
            return true;
        };

        if p.y >= strict_min {
            probe.grounded = true;
            probe.ground_height = Some(match probe.ground_height {
                Some(h) => h.max(p.y),
                None => p.y,
            });
        }

        let delta = (p.y - feet.y).abs();
        if delta < nearest_delta {
            nearest_delta = delta;
            probe.nearest_ground_height = Some(p.y);
        }
        probe.lowest_ground_height = Some(match probe.lowest_ground_height {
            Some(h) => h.min(p.y),
            None => p.y,
        });

        true
    });

    probe
}
