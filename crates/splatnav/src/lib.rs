//! splatnav: the interactive core of a Gaussian-splat point cloud viewer.
//!
//! splatnav owns everything between window events and the renderer: orbit
//! and first-person navigation, point picking, selection edits, and a small
//! projectile simulation. The host feeds it input and reads back a
//! [`RenderView`] each frame; drawing itself is left to the caller.
//!
//! # Quick Start
//!
//! ```no_run
//! use splatnav::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let mut scene = SceneController::default();
//!     scene.load_points(vec![
//!         Vec3::new(0.0, 0.0, 0.0),
//!         Vec3::new(1.0, 0.0, 0.0),
//!         Vec3::new(0.0, 1.0, 0.0),
//!     ])?;
//!
//!     // Per frame: forward input, advance, hand the view to the renderer.
//!     let input = FrameInput::default();
//!     scene.update(1.0 / 60.0, &input);
//!     let _view = scene.render_view();
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modes
//!
//! The controller starts in [`Mode::Orbit`]. Requesting an avatar mode
//! switches to [`Mode::AwaitingSpawnPoint`]; clicking a world point then
//! spawns the avatar and enters [`Mode::Walk`], [`Mode::Fly`], or
//! [`Mode::Game`]. Leaving an avatar mode returns to orbit and destroys
//! any projectiles.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

mod scene;

pub use scene::{FrameInput, Mode, SceneController};

// Re-export core types
pub use splatnav_core::{
    AvatarOptions, KeyLatch, LatchState, ModelTransform, OrbitOptions, PickOptions,
    PointCloudStore, ProjectileOptions, Result, SceneBounds, SceneSnapshot, Smoothed,
    SmoothedVec3, SplatnavError, UniformGrid, ViewerOptions,
};

// Re-export view types
pub use splatnav_view::{
    screen_ray, AxisDirection, Camera, DragState, OrbitCamera, PickHit, PointPicker,
    ProjectionMode, Ray, RenderView,
};

// Re-export simulation types
pub use splatnav_sim::{
    check_collision, probe_ground, AvatarController, AvatarInput, AvatarMode, GroundProbe,
    Projectile, ProjectilePool,
};

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Initializes env_logger if no global logger is set yet.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
