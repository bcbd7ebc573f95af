//! Collision, first-person movement, and projectiles for splatnav.
//!
//! [`collision`] holds the shared sphere/ground queries; [`AvatarController`]
//! runs the walk/fly/game movement state machine on top of them;
//! [`ProjectilePool`] simulates bouncing projectiles against the same cloud.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod avatar;
pub mod collision;
pub mod projectile;

pub use avatar::{AvatarController, AvatarInput, AvatarMode};
pub use collision::{check_collision, probe_ground, GroundProbe};
pub use projectile::{Projectile, ProjectilePool};
