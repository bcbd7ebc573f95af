//! Orbiting camera with smoothed target tracking.
//!
//! The orbit state is spherical: azimuth and elevation (degrees) plus a
//! distance around a target point. Input writes target values; `update(dt)`
//! chases them with the exponential blend from
//! [`splatnav_core::smoothing`] and then rebuilds the camera pose from the
//! spherical coordinates. Azimuth 0 places the camera on +Z, azimuth 90 on
//! +X, positive elevation above the horizon.

use glam::Vec3;
use splatnav_core::{OrbitOptions, SceneBounds, Smoothed, SmoothedVec3};

use crate::camera::{AxisDirection, Camera};

const ANGLE_EPSILON: f32 = 1e-3;
const DISTANCE_EPSILON: f32 = 1e-4;
const TARGET_EPSILON: f32 = 1e-4;

/// Default oblique view used after resets and scene framing.
const DEFAULT_AZIMUTH_DEG: f32 = 45.0;
const DEFAULT_ELEVATION_DEG: f32 = 30.0;
const DEFAULT_DISTANCE: f32 = 5.0;

/// Mouse-drag state of the orbit controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// No drag in progress.
    #[default]
    Idle,
    /// Left-drag: azimuth/elevation.
    Orbiting,
    /// Right-drag: translating the target.
    Panning,
}

/// Spherical orbit camera controller.
#[derive(Debug)]
pub struct OrbitCamera {
    azimuth: Smoothed,
    elevation: Smoothed,
    distance: Smoothed,
    target: SmoothedVec3,
    drag: DragState,
    opts: OrbitOptions,
    camera: Camera,
}

impl OrbitCamera {
    /// Creates an orbit camera at the default oblique view.
    #[must_use]
    pub fn new(opts: OrbitOptions, aspect_ratio: f32) -> Self {
        let mut orbit = Self {
            azimuth: Smoothed::new(DEFAULT_AZIMUTH_DEG, ANGLE_EPSILON),
            elevation: Smoothed::new(DEFAULT_ELEVATION_DEG, ANGLE_EPSILON),
            distance: Smoothed::new(DEFAULT_DISTANCE, DISTANCE_EPSILON),
            target: SmoothedVec3::new(Vec3::ZERO, TARGET_EPSILON),
            drag: DragState::Idle,
            opts,
            camera: Camera::new(aspect_ratio),
        };
        orbit.refresh_camera();
        orbit
    }

    /// The camera this controller drives.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera access (aspect ratio, projection mode).
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Current smoothed azimuth in degrees.
    #[must_use]
    pub fn azimuth_deg(&self) -> f32 {
        self.azimuth.current()
    }

    /// Current smoothed elevation in degrees.
    #[must_use]
    pub fn elevation_deg(&self) -> f32 {
        self.elevation.current()
    }

    /// Current smoothed orbit distance.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance.current()
    }

    /// Current smoothed orbit target.
    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target.current()
    }

    /// Current drag state.
    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Sets target azimuth/elevation in degrees; `immediate` snaps the
    /// current values (used for resets, to avoid a visible glide).
    pub fn set_orbit_angles(&mut self, azimuth_deg: f32, elevation_deg: f32, immediate: bool) {
        let clamp = self.opts.max_elevation_deg;
        self.azimuth.set(azimuth_deg, immediate);
        self.elevation.set(elevation_deg.clamp(-clamp, clamp), immediate);
        self.refresh_camera();
    }

    /// Sets the target orbit distance, clamped to the configured range.
    pub fn set_orbit_distance(&mut self, distance: f32, immediate: bool) {
        let clamped = distance.clamp(self.opts.min_distance, self.opts.max_distance);
        self.distance.set(clamped, immediate);
        self.refresh_camera();
    }

    /// Sets the orbit target point.
    pub fn set_target(&mut self, point: Vec3, immediate: bool) {
        self.target.set(point, immediate);
        self.refresh_camera();
    }

    /// Relative zoom. Positive `delta` moves closer. The step is
    /// proportional to the current distance but never below the configured
    /// minimum step, so small wheel deltas stay perceptible and large ones
    /// don't overshoot.
    pub fn adjust_orbit_distance(&mut self, delta: f32) {
        let step = (self.distance.target().abs() * self.opts.fine_zoom_factor)
            .max(self.opts.min_zoom_step);
        self.set_orbit_distance(self.distance.target() - delta * step, false);
    }

    /// Snaps the view onto an axis, always immediate.
    ///
    /// The ±Y presets use the elevation clamp rather than a true pole so the
    /// up vector never degenerates; their azimuth resets to 0 for a
    /// reproducible view.
    pub fn align_to(&mut self, direction: AxisDirection) {
        let clamp = self.opts.max_elevation_deg;
        let (azimuth, elevation) = match direction {
            AxisDirection::PosX => (90.0, 0.0),
            AxisDirection::NegX => (-90.0, 0.0),
            AxisDirection::PosY => (0.0, clamp),
            AxisDirection::NegY => (0.0, -clamp),
            AxisDirection::PosZ => (0.0, 0.0),
            AxisDirection::NegZ => (180.0, 0.0),
        };
        self.set_orbit_angles(azimuth, elevation, true);
        log::debug!("orbit aligned to {}", direction.name());
    }

    /// Frames the scene bounds: target centered, distance fit to the
    /// diagonal, angles back to the default oblique view. Immediate.
    pub fn frame_bounds(&mut self, bounds: &SceneBounds) {
        let diagonal = bounds.diagonal();
        let distance = if diagonal > 1e-6 {
            diagonal * 1.5
        } else {
            DEFAULT_DISTANCE
        };
        self.set_orbit_angles(DEFAULT_AZIMUTH_DEG, DEFAULT_ELEVATION_DEG, true);
        self.set_orbit_distance(distance, true);
        self.set_target(bounds.center(), true);
    }

    /// Begins an orbit drag; ignored while another drag is active.
    pub fn begin_orbit_drag(&mut self) {
        if self.drag == DragState::Idle {
            self.drag = DragState::Orbiting;
        }
    }

    /// Begins a pan drag; ignored while another drag is active.
    pub fn begin_pan_drag(&mut self) {
        if self.drag == DragState::Idle {
            self.drag = DragState::Panning;
        }
    }

    /// Ends any drag in progress.
    pub fn end_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Applies a mouse movement (pixel deltas, y down) to whichever drag is
    /// active; no-op while idle.
    pub fn drag_move(&mut self, dx: f32, dy: f32) {
        match self.drag {
            DragState::Idle => {}
            DragState::Orbiting => {
                let s = self.opts.rotate_sensitivity;
                let clamp = self.opts.max_elevation_deg;
                self.azimuth.set(self.azimuth.target() - dx * s, false);
                let elevation = (self.elevation.target() + dy * s).clamp(-clamp, clamp);
                self.elevation.set(elevation, false);
            }
            DragState::Panning => self.pan(dx, dy),
        }
    }

    /// Translates the target along the camera's right/up plane, scaled by
    /// the orbit distance so pan speed tracks zoom level.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let right = self.camera.right();
        let up = right.cross(self.camera.forward()).normalize();
        let scale = self.distance.current() * self.opts.pan_sensitivity;
        self.target.offset_target((-right * dx + up * dy) * scale);
    }

    /// Advances smoothing and rebuilds the camera pose. Runs every frame
    /// regardless of drag state.
    pub fn update(&mut self, dt: f32) {
        let k = self.opts.smoothing;
        self.azimuth.advance(dt, k);
        self.elevation.advance(dt, k);
        self.distance.advance(dt, k);
        self.target.advance(dt, k);

        let clamp = self.opts.max_elevation_deg;
        self.elevation.clamp(-clamp, clamp);
        self.distance.clamp(self.opts.min_distance, self.opts.max_distance);

        self.refresh_camera();
    }

    fn refresh_camera(&mut self) {
        let azimuth = self.azimuth.current().to_radians();
        let elevation = self.elevation.current().to_radians();
        let distance = self.distance.current();
        let offset = Vec3::new(
            distance * azimuth.sin() * elevation.cos(),
            distance * elevation.sin(),
            distance * azimuth.cos() * elevation.cos(),
        );
        self.camera.position = self.target.current() + offset;
        self.camera.target = self.target.current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn orbit() -> OrbitCamera {
        OrbitCamera::new(OrbitOptions::default(), 1.0)
    }

    #[test]
    fn test_immediate_angles_place_camera_on_axis() {
        let mut o = orbit();
        o.set_target(Vec3::ZERO, true);
        o.set_orbit_distance(5.0, true);
        o.set_orbit_angles(90.0, 0.0, true);
        let pos = o.camera().position;
        assert!((pos - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-4);
        assert_eq!(o.camera().target, Vec3::ZERO);
    }

    #[test]
    fn test_azimuth_zero_is_plus_z() {
        let mut o = orbit();
        o.set_target(Vec3::ZERO, true);
        o.set_orbit_distance(2.0, true);
        o.set_orbit_angles(0.0, 0.0, true);
        assert!((o.camera().position - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-4);
    }

    #[test]
    fn test_non_immediate_set_glides() {
        let mut o = orbit();
        o.set_orbit_angles(0.0, 0.0, true);
        o.set_orbit_angles(90.0, 0.0, false);
        assert!((o.azimuth_deg() - 0.0).abs() < 1e-4);
        o.update(0.016);
        assert!(o.azimuth_deg() > 0.0);
        assert!(o.azimuth_deg() < 90.0);
        for _ in 0..1000 {
            o.update(0.016);
        }
        assert!((o.azimuth_deg() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_elevation_clamped_after_update() {
        let mut o = orbit();
        o.set_orbit_angles(0.0, 200.0, true);
        o.update(0.016);
        assert!(o.elevation_deg() <= 89.9);
        o.set_orbit_angles(0.0, -200.0, false);
        for _ in 0..100 {
            o.update(0.016);
            assert!(o.elevation_deg() >= -89.9);
        }
    }

    #[test]
    fn test_distance_clamped() {
        let mut o = orbit();
        o.set_orbit_distance(10_000.0, true);
        assert!(o.distance() <= 500.0);
        o.set_orbit_distance(0.0, true);
        assert!(o.distance() >= 0.1);
    }

    #[test]
    fn test_zoom_step_has_floor() {
        let mut o = orbit();
        o.set_orbit_distance(0.2, true);
        // At 0.2 the proportional step (0.2 * 0.1) is below the 0.05 floor,
        // so one click out lands on exactly 0.25.
        o.adjust_orbit_distance(-1.0);
        for _ in 0..1000 {
            o.update(0.016);
        }
        assert!((o.distance() - 0.25).abs() < 1e-3);
    }

    #[test]
    fn test_align_to_is_immediate() {
        let mut o = orbit();
        o.set_target(Vec3::ZERO, true);
        o.set_orbit_distance(3.0, true);
        o.align_to(AxisDirection::NegX);
        assert!((o.camera().position - Vec3::new(-3.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_pan_moves_target_in_view_plane() {
        let mut o = orbit();
        o.set_target(Vec3::ZERO, true);
        o.set_orbit_distance(5.0, true);
        o.set_orbit_angles(0.0, 0.0, true);
        o.begin_pan_drag();
        o.drag_move(100.0, 0.0);
        o.end_drag();
        for _ in 0..1000 {
            o.update(0.016);
        }
        // Camera sits on +Z looking at -Z; right is +X, so the target moves
        // along -X and never vertically.
        assert!(o.target().x < 0.0);
        assert!(o.target().y.abs() < 1e-4);
    }

    #[test]
    fn test_drag_state_machine() {
        let mut o = orbit();
        o.begin_orbit_drag();
        assert_eq!(o.drag_state(), DragState::Orbiting);
        // A second begin while active is ignored.
        o.begin_pan_drag();
        assert_eq!(o.drag_state(), DragState::Orbiting);
        o.end_drag();
        o.begin_pan_drag();
        assert_eq!(o.drag_state(), DragState::Panning);
        o.end_drag();
        assert_eq!(o.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_frame_bounds_centers_target() {
        let mut o = orbit();
        let bounds = SceneBounds {
            min: Vec3::new(-1.0, -1.0, -1.0),
            max: Vec3::new(3.0, 1.0, 1.0),
        };
        o.frame_bounds(&bounds);
        assert_eq!(o.target(), Vec3::new(1.0, 0.0, 0.0));
        assert!(o.distance() > 1.0);
    }

    proptest! {
        /// Elevation stays inside the clamp after arbitrary input and updates.
        #[test]
        fn prop_elevation_always_clamped(
            sets in prop::collection::vec((-500.0f32..500.0, -500.0f32..500.0, any::<bool>()), 1..20),
            dts in prop::collection::vec(0.0f32..0.1, 1..20),
        ) {
            let mut o = orbit();
            for (az, el, immediate) in sets {
                o.set_orbit_angles(az, el, immediate);
            }
            for dt in dts {
                o.update(dt);
                prop_assert!(o.elevation_deg() >= -89.9 - 1e-3);
                prop_assert!(o.elevation_deg() <= 89.9 + 1e-3);
            }
        }
    }
}
