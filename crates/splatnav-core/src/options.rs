//! Configuration options for splatnav.
//!
//! Every tuned constant in the interactive loop lives here so hosts can
//! adjust feel without code changes. Defaults reproduce the shipped tuning.

use serde::{Deserialize, Serialize};

/// Top-level configuration, grouped by subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerOptions {
    /// Orbit camera tuning.
    pub orbit: OrbitOptions,
    /// Point picking tuning.
    pub pick: PickOptions,
    /// First-person avatar tuning.
    pub avatar: AvatarOptions,
    /// Projectile tuning.
    pub projectile: ProjectileOptions,
}

/// Orbit camera tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitOptions {
    /// Exponential smoothing strength for azimuth/elevation/distance/target.
    pub smoothing: f32,
    /// Elevation clamp in degrees (applied symmetrically, +/-).
    pub max_elevation_deg: f32,
    /// Minimum orbit distance.
    pub min_distance: f32,
    /// Maximum orbit distance.
    pub max_distance: f32,
    /// Smallest zoom step, so tiny wheel deltas stay perceptible.
    pub min_zoom_step: f32,
    /// Zoom step as a fraction of current distance, so large deltas don't
    /// overshoot near the target.
    pub fine_zoom_factor: f32,
    /// Orbit drag sensitivity in degrees per pixel.
    pub rotate_sensitivity: f32,
    /// Pan drag sensitivity, scaled by distance per pixel.
    pub pan_sensitivity: f32,
}

impl Default for OrbitOptions {
    fn default() -> Self {
        Self {
            smoothing: 4.5,
            max_elevation_deg: 89.9,
            min_distance: 0.1,
            max_distance: 500.0,
            min_zoom_step: 0.05,
            fine_zoom_factor: 0.1,
            rotate_sensitivity: 0.3,
            pan_sensitivity: 0.0015,
        }
    }
}

/// Point picking tuning.
///
/// The threshold and penalty are heuristic; the tie-break order (score,
/// then distance along the ray) is behavior and lives in the picker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickOptions {
    /// Candidates farther than this many pixels from the cursor are ignored.
    pub pixel_threshold: f32,
    /// Weight converting squared screen distance into the pick score.
    pub screen_penalty: f32,
    /// Scores within this epsilon tie-break on distance along the ray.
    pub tie_epsilon: f32,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            pixel_threshold: 25.0,
            screen_penalty: 1e-4,
            tie_epsilon: 1e-6,
        }
    }
}

/// First-person avatar tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarOptions {
    /// Walk speed in world units per second.
    pub move_speed: f32,
    /// Speed multiplier while the run input is held.
    pub run_multiplier: f32,
    /// Fly-mode speed in world units per second.
    pub fly_speed: f32,
    /// Camera height above the feet.
    pub eye_height: f32,
    /// Collision sphere radius around the camera.
    pub collision_radius: f32,
    /// Upward velocity applied on jump.
    pub jump_velocity: f32,
    /// Gravity magnitude (positive; applied downward).
    pub gravity: f32,
    /// Exponential smoothing strength for look rotation.
    pub look_smoothing: f32,
    /// Mouse look sensitivity in degrees per pixel.
    pub look_sensitivity: f32,
    /// Pitch clamp in degrees (applied symmetrically, +/-).
    pub max_pitch_deg: f32,
    /// How far below the feet a point still counts as ground.
    pub ground_tolerance: f32,
    /// How far above the feet a point still counts as ground (slight
    /// penetration tolerated).
    pub ground_penetration: f32,
    /// Vertical search depth for the nearest/lowest ground hints used when
    /// the avatar's height changes.
    pub snap_search_depth: f32,
}

impl Default for AvatarOptions {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            run_multiplier: 2.0,
            fly_speed: 8.0,
            eye_height: 1.6,
            collision_radius: 0.35,
            jump_velocity: 4.5,
            gravity: 9.81,
            look_smoothing: 12.0,
            look_sensitivity: 0.1,
            max_pitch_deg: 89.0,
            ground_tolerance: 0.3,
            ground_penetration: 0.15,
            snap_search_depth: 4.0,
        }
    }
}

/// Projectile tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileOptions {
    /// Muzzle speed in world units per second.
    pub speed: f32,
    /// Collision radius against cloud points.
    pub bullet_radius: f32,
    /// Energy retained per bounce (0 = absorbed, 1 = elastic).
    pub bounciness: f32,
    /// Gravity magnitude (positive; applied downward).
    pub gravity: f32,
    /// Seconds before a projectile expires.
    pub lifetime: f32,
    /// Horizontal velocity retained per ground-plane bounce.
    pub ground_friction: f32,
    /// Speed below which a ground-resting projectile stops simulating.
    pub rest_threshold: f32,
}

impl Default for ProjectileOptions {
    fn default() -> Self {
        Self {
            speed: 25.0,
            bullet_radius: 0.12,
            bounciness: 0.6,
            gravity: 9.81,
            lifetime: 6.0,
            ground_friction: 0.95,
            rest_threshold: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let opts = ViewerOptions::default();
        assert!(opts.orbit.min_distance < opts.orbit.max_distance);
        assert!(opts.orbit.max_elevation_deg < 90.0);
        assert!(opts.avatar.max_pitch_deg < 90.0);
        assert!((0.0..=1.0).contains(&opts.projectile.bounciness));
        assert!((0.0..=1.0).contains(&opts.projectile.ground_friction));
    }

    #[test]
    fn test_options_json_roundtrip() {
        let opts = ViewerOptions::default();
        let json = serde_json::to_string(&opts).unwrap();
        let back: ViewerOptions = serde_json::from_str(&json).unwrap();
        assert!((back.orbit.smoothing - opts.orbit.smoothing).abs() < f32::EPSILON);
        assert!((back.avatar.eye_height - opts.avatar.eye_height).abs() < f32::EPSILON);
    }
}
