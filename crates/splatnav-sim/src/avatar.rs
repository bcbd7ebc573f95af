//! First-person avatar controller.
//!
//! The avatar is an eye position plus smoothed yaw/pitch. Walk mode (and
//! Game mode with collision on) runs the physics path: ground snapping,
//! edge-triggered jumping, gravity, and three-stage collision resolution
//! (full move, then horizontal-only wall slide, then vertical-only). Fly
//! mode and Game mode with collision off move freely with explicit up/down
//! input. Yaw 0 faces +Z; positive pitch looks up.

use glam::{Vec2, Vec3};
use splatnav_core::{AvatarOptions, KeyLatch, PointCloudStore, Smoothed};

use crate::collision::{check_collision, probe_ground};

const ANGLE_EPSILON: f32 = 1e-3;
const MIN_EYE_HEIGHT: f32 = 0.1;

/// Which movement rules the avatar runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarMode {
    /// Ground physics: gravity, jumping, collision.
    Walk,
    /// Free flight, no collision.
    Fly,
    /// Walk physics plus shooting; collision can be toggled off.
    Game,
}

/// Held input state for one tick, translated from raw events by the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvatarInput {
    /// Move toward the look direction.
    pub forward: bool,
    /// Move away from the look direction.
    pub backward: bool,
    /// Strafe left.
    pub left: bool,
    /// Strafe right.
    pub right: bool,
    /// Ascend (Fly / collision-off Game only).
    pub up: bool,
    /// Descend (Fly / collision-off Game only).
    pub down: bool,
    /// Speed modifier.
    pub run: bool,
    /// Raw jump key state; the controller edge-detects internally.
    pub jump: bool,
    /// Mouse look delta in pixels (x right, y down).
    pub look_delta: Vec2,
}

/// First-person movement state machine.
#[derive(Debug)]
pub struct AvatarController {
    mode: AvatarMode,
    collision_enabled: bool,
    position: Vec3,
    yaw: Smoothed,
    pitch: Smoothed,
    vertical_velocity: f32,
    grounded: bool,
    jump_latch: KeyLatch,
    opts: AvatarOptions,
}

impl AvatarController {
    /// Creates an avatar at the given eye position, looking level along +Z.
    #[must_use]
    pub fn new(mode: AvatarMode, eye_position: Vec3, opts: AvatarOptions) -> Self {
        Self {
            mode,
            collision_enabled: true,
            position: eye_position,
            yaw: Smoothed::new(0.0, ANGLE_EPSILON),
            pitch: Smoothed::new(0.0, ANGLE_EPSILON),
            vertical_velocity: 0.0,
            grounded: false,
            jump_latch: KeyLatch::new(),
            opts,
        }
    }

    /// The movement mode the avatar was created in.
    #[must_use]
    pub fn mode(&self) -> AvatarMode {
        self.mode
    }

    /// Current eye position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current camera height above the feet.
    #[must_use]
    pub fn eye_height(&self) -> f32 {
        self.opts.eye_height
    }

    /// Current smoothed yaw in degrees.
    #[must_use]
    pub fn yaw_deg(&self) -> f32 {
        self.yaw.current()
    }

    /// Current smoothed pitch in degrees.
    #[must_use]
    pub fn pitch_deg(&self) -> f32 {
        self.pitch.current()
    }

    /// True while the feet rest on support and the avatar is not ascending.
    #[must_use]
    pub fn grounded(&self) -> bool {
        self.grounded
    }

    /// Current vertical velocity (positive up).
    #[must_use]
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    /// Whether the physics path is active this mode/toggle combination.
    #[must_use]
    pub fn physics_active(&self) -> bool {
        match self.mode {
            AvatarMode::Walk => true,
            AvatarMode::Fly => false,
            AvatarMode::Game => self.collision_enabled,
        }
    }

    /// Collision toggle state (only Game mode ever turns it off).
    #[must_use]
    pub fn collision_enabled(&self) -> bool {
        self.collision_enabled
    }

    /// Toggles collision; with it off, Game mode moves like Fly.
    pub fn set_collision_enabled(&mut self, enabled: bool) {
        self.collision_enabled = enabled;
        if !enabled {
            self.vertical_velocity = 0.0;
            self.grounded = false;
        }
    }

    /// Sets the look angles directly (spawn orientation); pitch is clamped.
    pub fn set_look_angles(&mut self, yaw_deg: f32, pitch_deg: f32, immediate: bool) {
        let clamp = self.opts.max_pitch_deg;
        self.yaw.set(yaw_deg, immediate);
        self.pitch.set(pitch_deg.clamp(-clamp, clamp), immediate);
    }

    /// Unit vector the avatar is looking along.
    #[must_use]
    pub fn look_direction(&self) -> Vec3 {
        let yaw = self.yaw.current().to_radians();
        let pitch = self.pitch.current().to_radians();
        Vec3::new(
            yaw.sin() * pitch.cos(),
            pitch.sin(),
            yaw.cos() * pitch.cos(),
        )
    }

    /// Advances the avatar one tick.
    pub fn update(&mut self, dt: f32, input: &AvatarInput, store: &PointCloudStore) {
        self.advance_look(dt, input.look_delta);

        let physics = self.physics_active();
        let base = if physics {
            self.opts.move_speed
        } else {
            self.opts.fly_speed
        };
        let speed = if input.run {
            base * self.opts.run_multiplier
        } else {
            base
        };

        let yaw = self.yaw.current().to_radians();
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let right = forward.cross(Vec3::Y).normalize();
        let mut dir = Vec3::ZERO;
        if input.forward {
            dir += forward;
        }
        if input.backward {
            dir -= forward;
        }
        if input.right {
            dir += right;
        }
        if input.left {
            dir -= right;
        }
        // Normalizing keeps diagonal movement at the same speed.
        let horizontal = dir.normalize_or_zero() * speed * dt;

        if !physics {
            let mut climb = 0.0;
            if input.up {
                climb += speed * dt;
            }
            if input.down {
                climb -= speed * dt;
            }
            self.position += horizontal + Vec3::new(0.0, climb, 0.0);
            self.vertical_velocity = 0.0;
            self.grounded = false;
            // Keep stepping the latch so a held jump key cannot queue an
            // edge across a collision toggle.
            self.jump_latch.step(input.jump);
            return;
        }

        // Ground check happens before jump and gravity so a landing frame
        // can still jump, and snapping never fights an ascent.
        let probe = probe_ground(
            store,
            self.position,
            self.opts.eye_height,
            self.opts.collision_radius,
            &self.opts,
        );
        self.grounded = probe.grounded && self.vertical_velocity <= 0.0;
        if self.grounded {
            if let Some(ground) = probe.ground_height {
                self.position.y = ground + self.opts.eye_height;
            }
            self.vertical_velocity = 0.0;
        }

        if self.jump_latch.step(input.jump) && self.grounded {
            self.vertical_velocity = self.opts.jump_velocity;
            self.grounded = false;
        }

        if !self.grounded {
            self.vertical_velocity -= self.opts.gravity * dt;
        }

        self.resolve_move(store, horizontal, self.vertical_velocity * dt);
    }

    /// Dynamic eye height change (crouch / stand).
    ///
    /// Re-snaps to the supporting surface under the new height; when the
    /// strict ground test fails while shrinking, falls back to the probe's
    /// nearest-surface hint. A change that would embed the avatar in points
    /// is rejected and the height stays.
    pub fn set_eye_height(&mut self, height: f32, store: &PointCloudStore) -> bool {
        let height = height.max(MIN_EYE_HEIGHT);
        if !self.physics_active() {
            self.opts.eye_height = height;
            return true;
        }

        let shrinking = height < self.opts.eye_height;
        let feet_y = self.position.y - self.opts.eye_height;
        let mut candidate = self.position;
        candidate.y = feet_y + height;

        let probe = probe_ground(store, candidate, height, self.opts.collision_radius, &self.opts);
        if probe.grounded {
            if let Some(ground) = probe.ground_height {
                candidate.y = ground + height;
            }
        } else if shrinking {
            if let Some(surface) = probe.nearest_ground_height.or(probe.lowest_ground_height) {
                candidate.y = surface + height;
            }
        }

        if check_collision(store, candidate, self.opts.collision_radius) {
            log::debug!("eye height change to {height} rejected, avatar would intersect points");
            return false;
        }

        self.opts.eye_height = height;
        self.position = candidate;
        if self.grounded {
            self.vertical_velocity = 0.0;
        }
        true
    }

    fn advance_look(&mut self, dt: f32, look_delta: Vec2) {
        let clamp = self.opts.max_pitch_deg;
        if look_delta != Vec2::ZERO {
            let s = self.opts.look_sensitivity;
            self.yaw.set(self.yaw.target() - look_delta.x * s, false);
            let pitch = (self.pitch.target() - look_delta.y * s).clamp(-clamp, clamp);
            self.pitch.set(pitch, false);
        }
        self.yaw.advance(dt, self.opts.look_smoothing);
        self.pitch.advance(dt, self.opts.look_smoothing);
        self.pitch.clamp(-clamp, clamp);
    }

    /// Full move, then horizontal-only, then vertical-only; a blocked
    /// vertical-only move zeroes the vertical velocity (ceiling or floor).
    fn resolve_move(&mut self, store: &PointCloudStore, horizontal: Vec3, dy: f32) {
        let radius = self.opts.collision_radius;
        let vertical = Vec3::new(0.0, dy, 0.0);

        let full = self.position + horizontal + vertical;
        if !check_collision(store, full, radius) {
            self.position = full;
            return;
        }
        let horizontal_only = self.position + horizontal;
        if !check_collision(store, horizontal_only, radius) {
            self.position = horizontal_only;
            return;
        }
        let vertical_only = self.position + vertical;
        if !check_collision(store, vertical_only, radius) {
            self.position = vertical_only;
            return;
        }
        self.vertical_velocity = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 0.016;

    fn store_with(points: Vec<Vec3>) -> PointCloudStore {
        let mut store = PointCloudStore::new();
        store.set_positions(points).unwrap();
        store
    }

    fn walker(eye: Vec3) -> AvatarController {
        AvatarController::new(AvatarMode::Walk, eye, AvatarOptions::default())
    }

    #[test]
    fn test_grounded_avatar_rests_on_support() {
        let store = store_with(vec![Vec3::ZERO]);
        let mut avatar = walker(Vec3::new(0.0, 1.6, 0.0));
        avatar.update(DT, &AvatarInput::default(), &store);
        assert!(avatar.grounded());
        assert!((avatar.position().y - 1.6).abs() < 1e-5);
        assert_eq!(avatar.vertical_velocity(), 0.0);
    }

    #[test]
    fn test_gravity_pulls_airborne_avatar() {
        let store = store_with(vec![Vec3::new(0.0, -50.0, 0.0)]);
        let mut avatar = walker(Vec3::new(0.0, 5.0, 0.0));
        for _ in 0..10 {
            avatar.update(DT, &AvatarInput::default(), &store);
        }
        assert!(!avatar.grounded());
        assert!(avatar.position().y < 5.0);
        assert!(avatar.vertical_velocity() < 0.0);
    }

    #[test]
    fn test_jump_impulse_fires_once_while_held() {
        let store = store_with(vec![Vec3::ZERO]);
        let mut avatar = walker(Vec3::new(0.0, 1.6, 0.0));
        let input = AvatarInput {
            jump: true,
            ..AvatarInput::default()
        };

        let mut impulses = 0;
        for _ in 0..10 {
            let before = avatar.vertical_velocity();
            avatar.update(DT, &input, &store);
            if avatar.vertical_velocity() > before + 1.0 {
                impulses += 1;
            }
        }
        assert_eq!(impulses, 1);
    }

    #[test]
    fn test_no_ground_snap_while_ascending() {
        let store = store_with(vec![Vec3::ZERO]);
        let mut avatar = walker(Vec3::new(0.0, 1.6, 0.0));
        let input = AvatarInput {
            jump: true,
            ..AvatarInput::default()
        };
        avatar.update(DT, &input, &store);
        let after_jump = avatar.position().y;
        assert!(avatar.vertical_velocity() > 0.0);

        // Feet are still inside the ground band; ascent must continue.
        avatar.update(DT, &input, &store);
        assert!(avatar.position().y > after_jump);
        assert!(!avatar.grounded());
    }

    #[test]
    fn test_forward_movement_blocked_by_wall() {
        // Support point underfoot plus a wall point at eye level ahead.
        let store = store_with(vec![Vec3::ZERO, Vec3::new(0.0, 1.6, 0.4)]);
        let mut avatar = walker(Vec3::new(0.0, 1.6, 0.0));
        let input = AvatarInput {
            forward: true,
            ..AvatarInput::default()
        };
        avatar.update(DT, &input, &store);
        assert!(avatar.position().z.abs() < 1e-5);
    }

    #[test]
    fn test_blocked_horizontal_still_falls() {
        // Airborne next to a wall: the vertical-only retry commits.
        let store = store_with(vec![Vec3::new(0.0, 3.0, 0.4)]);
        let mut avatar = walker(Vec3::new(0.0, 3.0, 0.0));
        let input = AvatarInput {
            forward: true,
            ..AvatarInput::default()
        };
        avatar.update(DT, &input, &store);
        assert!(avatar.position().z.abs() < 1e-5);
        assert!(avatar.position().y < 3.0);
    }

    #[test]
    fn test_fly_moves_freely_through_points() {
        let store = store_with(vec![Vec3::new(0.0, 1.7, 0.1)]);
        let mut avatar =
            AvatarController::new(AvatarMode::Fly, Vec3::new(0.0, 1.6, 0.0), AvatarOptions::default());
        let input = AvatarInput {
            up: true,
            forward: true,
            ..AvatarInput::default()
        };
        avatar.update(DT, &input, &store);
        assert!(avatar.position().y > 1.6);
        assert!(avatar.position().z > 0.0);
        assert_eq!(avatar.vertical_velocity(), 0.0);
    }

    #[test]
    fn test_game_collision_toggle_switches_to_free_movement() {
        let store = store_with(vec![Vec3::ZERO]);
        let mut avatar =
            AvatarController::new(AvatarMode::Game, Vec3::new(0.0, 1.6, 0.0), AvatarOptions::default());
        assert!(avatar.physics_active());
        avatar.set_collision_enabled(false);
        assert!(!avatar.physics_active());

        let input = AvatarInput {
            down: true,
            ..AvatarInput::default()
        };
        avatar.update(DT, &input, &store);
        // Free descent straight through the ground band.
        assert!(avatar.position().y < 1.6);
        assert!(!avatar.grounded());
    }

    #[test]
    fn test_run_doubles_displacement() {
        let store = PointCloudStore::new();
        let mut slow = walker(Vec3::new(0.0, 5.0, 0.0));
        let mut fast = walker(Vec3::new(0.0, 5.0, 0.0));
        let walk_input = AvatarInput {
            forward: true,
            ..AvatarInput::default()
        };
        let run_input = AvatarInput {
            forward: true,
            run: true,
            ..AvatarInput::default()
        };
        slow.update(DT, &walk_input, &store);
        fast.update(DT, &run_input, &store);
        assert!((fast.position().z - slow.position().z * 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_crouch_stays_on_ground() {
        let store = store_with(vec![Vec3::ZERO]);
        let mut avatar = walker(Vec3::new(0.0, 1.6, 0.0));
        avatar.update(DT, &AvatarInput::default(), &store);
        assert!(avatar.set_eye_height(1.0, &store));
        assert!((avatar.position().y - 1.0).abs() < 1e-5);
        assert!((avatar.eye_height() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_eye_height_change_rejected_when_embedding() {
        // A point at chest height after the crouch would sit inside the
        // collision sphere.
        let store = store_with(vec![Vec3::ZERO, Vec3::new(0.0, 0.8, 0.0)]);
        let mut avatar = walker(Vec3::new(0.0, 1.6, 0.0));
        avatar.update(DT, &AvatarInput::default(), &store);
        assert!(!avatar.set_eye_height(1.0, &store));
        assert!((avatar.eye_height() - 1.6).abs() < 1e-6);
        assert!((avatar.position().y - 1.6).abs() < 1e-5);
    }

    #[test]
    fn test_look_yaw_turns_and_pitch_clamps() {
        let store = PointCloudStore::new();
        let mut avatar = walker(Vec3::new(0.0, 5.0, 0.0));
        let input = AvatarInput {
            look_delta: Vec2::new(0.0, -100_000.0),
            ..AvatarInput::default()
        };
        for _ in 0..50 {
            avatar.update(DT, &input, &store);
        }
        assert!(avatar.pitch_deg() <= 89.0 + 1e-3);
        // Looking almost straight up.
        assert!(avatar.look_direction().y > 0.99);
    }

    proptest! {
        /// Pitch never leaves the clamp under arbitrary look input.
        #[test]
        fn prop_pitch_always_clamped(
            deltas in prop::collection::vec((-2000.0f32..2000.0, -2000.0f32..2000.0), 1..30),
        ) {
            let store = PointCloudStore::new();
            let mut avatar = walker(Vec3::new(0.0, 5.0, 0.0));
            for (dx, dy) in deltas {
                let input = AvatarInput {
                    look_delta: Vec2::new(dx, dy),
                    ..AvatarInput::default()
                };
                avatar.update(DT, &input, &store);
                prop_assert!(avatar.pitch_deg() >= -89.0 - 1e-3);
                prop_assert!(avatar.pitch_deg() <= 89.0 + 1e-3);
            }
        }
    }
}
