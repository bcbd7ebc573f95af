//! Top-level orchestration of the interactive loop.
//!
//! [`SceneController`] owns the point store, the orbit camera, the picker,
//! the avatar, and the projectile pool, and routes input between them based
//! on the current [`Mode`]. The host translates raw window events into the
//! primitive calls here and drives [`SceneController::update`] once per
//! rendered frame.

use std::path::Path;

use glam::{Vec2, Vec3};
use splatnav_core::{
    KeyLatch, PointCloudStore, Result, SceneSnapshot, ViewerOptions,
};
use splatnav_sim::{AvatarController, AvatarInput, AvatarMode, ProjectilePool};
use splatnav_view::{AxisDirection, Camera, OrbitCamera, PointPicker, RenderView};

/// Interaction mode of the controller.
///
/// Entering an avatar mode always passes through `AwaitingSpawnPoint`; the
/// avatar exists only once a world point has been designated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Orbit navigation; the initial state.
    Orbit,
    /// Waiting for a spawn-point pick before entering the pending mode.
    AwaitingSpawnPoint(AvatarMode),
    /// First-person walking.
    Walk,
    /// Free flight.
    Fly,
    /// Walking with shooting enabled.
    Game,
}

/// Per-frame input state for [`SceneController::update`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Movement and look input for the active avatar.
    pub avatar: AvatarInput,
    /// Raw fire key state; edge-detected internally, Game mode only.
    pub fire: bool,
}

/// Owns and coordinates every interactive subsystem.
#[derive(Debug)]
pub struct SceneController {
    store: PointCloudStore,
    orbit: OrbitCamera,
    picker: PointPicker,
    avatar: Option<AvatarController>,
    projectiles: ProjectilePool,
    fire_latch: KeyLatch,
    mode: Mode,
    viewport: Vec2,
    opts: ViewerOptions,
}

impl SceneController {
    /// Creates a controller in Orbit mode with an empty scene.
    #[must_use]
    pub fn new(opts: ViewerOptions) -> Self {
        let viewport = Vec2::new(1280.0, 720.0);
        Self {
            store: PointCloudStore::new(),
            orbit: OrbitCamera::new(opts.orbit.clone(), viewport.x / viewport.y),
            picker: PointPicker::new(opts.pick.clone()),
            avatar: None,
            projectiles: ProjectilePool::new(opts.projectile.clone()),
            fire_latch: KeyLatch::new(),
            mode: Mode::Orbit,
            viewport,
            opts,
        }
    }

    /// Current interaction mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The point store.
    #[must_use]
    pub fn store(&self) -> &PointCloudStore {
        &self.store
    }

    /// Mutable store access for host-level edits.
    pub fn store_mut(&mut self) -> &mut PointCloudStore {
        &mut self.store
    }

    /// The orbit camera (read access; input goes through the gated calls).
    #[must_use]
    pub fn orbit(&self) -> &OrbitCamera {
        &self.orbit
    }

    /// Live projectiles for rendering.
    #[must_use]
    pub fn projectiles(&self) -> &ProjectilePool {
        &self.projectiles
    }

    /// The active avatar, if any.
    #[must_use]
    pub fn avatar(&self) -> Option<&AvatarController> {
        self.avatar.as_ref()
    }

    /// Configuration the controller was built with.
    #[must_use]
    pub fn options(&self) -> &ViewerOptions {
        &self.opts
    }

    /// Current viewport size in pixels.
    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// True while the host should capture the pointer (avatar modes).
    #[must_use]
    pub fn wants_pointer_capture(&self) -> bool {
        matches!(self.mode, Mode::Walk | Mode::Fly | Mode::Game)
    }

    // ----- scene loading -----

    /// Replaces the scene with the given points and resets interaction:
    /// avatar torn down, projectiles destroyed, mode back to Orbit, camera
    /// framed to the new bounds.
    pub fn load_points(&mut self, points: Vec<Vec3>) -> Result<()> {
        self.store.set_positions(points)?;
        self.finish_load();
        Ok(())
    }

    /// [`Self::load_points`] for a dense interleaved `x,y,z` buffer.
    pub fn load_points_interleaved(&mut self, data: &[f32]) -> Result<()> {
        self.store.set_positions_interleaved(data)?;
        self.finish_load();
        Ok(())
    }

    fn finish_load(&mut self) {
        self.teardown_avatar();
        self.mode = Mode::Orbit;
        if let Some(bounds) = self.store.bounds() {
            self.orbit.frame_bounds(&bounds);
        }
        log::info!("scene loaded, {} points", self.store.len());
    }

    /// Updates the viewport used for picking and the camera aspect ratio.
    pub fn set_viewport(&mut self, size: Vec2) {
        self.viewport = size.max(Vec2::ONE);
        self.orbit
            .camera_mut()
            .set_aspect_ratio(self.viewport.x / self.viewport.y);
    }

    // ----- mode machine -----

    /// Requests an avatar mode; tears down any active avatar and waits for
    /// a spawn-point pick. A second request while waiting swaps the pending
    /// mode.
    pub fn request_avatar_mode(&mut self, avatar_mode: AvatarMode) {
        self.teardown_avatar();
        self.mode = Mode::AwaitingSpawnPoint(avatar_mode);
        log::info!("awaiting spawn point for {avatar_mode:?} mode");
    }

    /// Attempts to spawn the pending avatar at the picked point. A miss
    /// keeps waiting and returns false; waiting indefinitely is valid.
    pub fn confirm_spawn_at(&mut self, click_pos: Vec2) -> bool {
        let Mode::AwaitingSpawnPoint(avatar_mode) = self.mode else {
            return false;
        };
        let camera = self.active_camera();
        let Some(hit) = self.picker.pick(&self.store, &camera, click_pos, self.viewport) else {
            log::debug!("spawn pick missed, still waiting");
            return false;
        };

        // Walk and Game stand on the point; Fly starts exactly there.
        let eye = match avatar_mode {
            AvatarMode::Fly => hit.world_position,
            AvatarMode::Walk | AvatarMode::Game => {
                hit.world_position + Vec3::new(0.0, self.opts.avatar.eye_height, 0.0)
            }
        };
        let mut avatar = AvatarController::new(avatar_mode, eye, self.opts.avatar.clone());

        // Face the way the orbit camera was looking.
        let forward = camera.forward();
        avatar.set_look_angles(forward.x.atan2(forward.z).to_degrees(), 0.0, true);

        self.avatar = Some(avatar);
        self.mode = match avatar_mode {
            AvatarMode::Walk => Mode::Walk,
            AvatarMode::Fly => Mode::Fly,
            AvatarMode::Game => Mode::Game,
        };
        log::info!(
            "avatar spawned at {:?} in {avatar_mode:?} mode",
            hit.world_position
        );
        true
    }

    /// Leaves any avatar mode (or cancels a pending spawn) back to Orbit.
    pub fn to_orbit(&mut self) {
        self.teardown_avatar();
        if self.mode != Mode::Orbit {
            log::info!("returned to orbit mode");
        }
        self.mode = Mode::Orbit;
    }

    fn teardown_avatar(&mut self) {
        if self.avatar.take().is_some() {
            log::info!("avatar torn down");
        }
        self.projectiles.clear();
        self.fire_latch.reset();
    }

    // ----- orbit input (ignored outside Orbit mode) -----

    /// Sets orbit angles; ignored outside Orbit mode.
    pub fn set_orbit_angles(&mut self, azimuth_deg: f32, elevation_deg: f32, immediate: bool) {
        if self.mode == Mode::Orbit {
            self.orbit.set_orbit_angles(azimuth_deg, elevation_deg, immediate);
        }
    }

    /// Sets orbit distance; ignored outside Orbit mode.
    pub fn set_orbit_distance(&mut self, distance: f32, immediate: bool) {
        if self.mode == Mode::Orbit {
            self.orbit.set_orbit_distance(distance, immediate);
        }
    }

    /// Sets the orbit target; ignored outside Orbit mode.
    pub fn set_orbit_target(&mut self, point: Vec3, immediate: bool) {
        if self.mode == Mode::Orbit {
            self.orbit.set_target(point, immediate);
        }
    }

    /// Relative zoom; ignored outside Orbit mode.
    pub fn adjust_orbit_distance(&mut self, delta: f32) {
        if self.mode == Mode::Orbit {
            self.orbit.adjust_orbit_distance(delta);
        }
    }

    /// Axis-aligned view preset; ignored outside Orbit mode.
    pub fn align_view(&mut self, direction: AxisDirection) {
        if self.mode == Mode::Orbit {
            self.orbit.align_to(direction);
        }
    }

    /// Begins an orbit drag; ignored outside Orbit mode.
    pub fn begin_orbit_drag(&mut self) {
        if self.mode == Mode::Orbit {
            self.orbit.begin_orbit_drag();
        }
    }

    /// Begins a pan drag; ignored outside Orbit mode.
    pub fn begin_pan_drag(&mut self) {
        if self.mode == Mode::Orbit {
            self.orbit.begin_pan_drag();
        }
    }

    /// Applies a mouse drag delta; ignored outside Orbit mode.
    pub fn drag_move(&mut self, dx: f32, dy: f32) {
        if self.mode == Mode::Orbit {
            self.orbit.drag_move(dx, dy);
        }
    }

    /// Ends any orbit drag.
    pub fn end_drag(&mut self) {
        self.orbit.end_drag();
    }

    // ----- picking and store mutations -----

    /// Picks at the cursor and selects the hit; `additive` toggles the hit
    /// in and out of the selection instead of replacing it.
    pub fn select_at(&mut self, click_pos: Vec2, additive: bool) -> Option<usize> {
        let camera = self.active_camera();
        let hit = self.picker.pick(&self.store, &camera, click_pos, self.viewport)?;
        if additive {
            self.store.toggle_selected(hit.index);
        } else {
            self.store.set_selected(&[hit.index]);
        }
        log::debug!("picked point {} at {:?}", hit.index, hit.world_position);
        Some(hit.index)
    }

    /// Hides every selected point; returns how many were hidden.
    pub fn hide_selected(&mut self) -> usize {
        let indices: Vec<usize> = self.store.selected().iter().copied().collect();
        if !indices.is_empty() {
            self.store.set_hidden(&indices, true);
            log::info!("hid {} selected points", indices.len());
        }
        indices.len()
    }

    /// Restores visibility of all points.
    pub fn unhide_all(&mut self) {
        self.store.clear_hidden();
        log::info!("unhid all points");
    }

    /// Moves every selected point by a world-space delta; returns whether
    /// anything moved.
    pub fn translate_selected(&mut self, world_delta: Vec3) -> bool {
        let indices: Vec<usize> = self.store.selected().iter().copied().collect();
        if indices.is_empty() {
            return false;
        }
        let local_delta = self.store.transform().inverse_direction(world_delta);
        self.store
            .mutate_positions(&indices, |p, _| Some(p + local_delta))
    }

    // ----- avatar passthrough -----

    /// Changes the avatar's eye height; false when no avatar is active or
    /// the change would embed it in points.
    pub fn set_avatar_eye_height(&mut self, height: f32) -> bool {
        match self.avatar.as_mut() {
            Some(avatar) => avatar.set_eye_height(height, &self.store),
            None => false,
        }
    }

    /// Toggles Game-mode collision; no-op without an avatar.
    pub fn set_avatar_collision(&mut self, enabled: bool) {
        if let Some(avatar) = self.avatar.as_mut() {
            avatar.set_collision_enabled(enabled);
        }
    }

    // ----- snapshot -----

    /// Captures the model transform and the hidden/selected sets.
    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot::capture(&self.store)
    }

    /// Restores a snapshot; out-of-range indices are dropped.
    pub fn apply_snapshot(&mut self, snapshot: &SceneSnapshot) {
        snapshot.apply(&mut self.store);
    }

    /// Saves the current snapshot to a JSON file.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        self.snapshot().save_file(path)
    }

    /// Loads and applies a snapshot from a JSON file.
    pub fn load_snapshot(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let snapshot = SceneSnapshot::load_file(path)?;
        snapshot.apply(&mut self.store);
        Ok(())
    }

    // ----- per-frame -----

    /// Advances the active controller, fires Game-mode projectiles on the
    /// fire edge, and steps the projectile pool.
    pub fn update(&mut self, dt: f32, input: &FrameInput) {
        match self.mode {
            Mode::Orbit | Mode::AwaitingSpawnPoint(_) => {
                self.orbit.update(dt);
            }
            Mode::Walk | Mode::Fly | Mode::Game => {
                if let Some(avatar) = self.avatar.as_mut() {
                    avatar.update(dt, &input.avatar, &self.store);
                }
                if self.mode == Mode::Game && self.fire_latch.step(input.fire) {
                    if let Some(avatar) = self.avatar.as_ref() {
                        if self.projectiles.spawn(avatar.position(), avatar.look_direction()) {
                            log::debug!("projectile fired");
                        }
                    }
                }
            }
        }

        if !self.projectiles.is_empty() {
            self.projectiles.update(dt, &self.store);
        }
    }

    /// Camera matrices and pose for the rendering collaborator.
    #[must_use]
    pub fn render_view(&self) -> RenderView {
        self.active_camera().render_view()
    }

    /// The camera currently driving the view: the avatar's pose in avatar
    /// modes, the orbit camera otherwise. Projection parameters always come
    /// from the orbit camera so mode switches don't change the lens.
    fn active_camera(&self) -> Camera {
        let mut camera = self.orbit.camera().clone();
        if let Some(avatar) = self.avatar.as_ref() {
            camera.position = avatar.position();
            camera.target = avatar.position() + avatar.look_direction();
        }
        camera
    }
}

impl Default for SceneController {
    fn default() -> Self {
        Self::new(ViewerOptions::default())
    }
}
