//! Core state for splatnav.
//!
//! This crate holds everything the interactive loop shares:
//! - [`PointCloudStore`] single owner of positions and the hidden/selected sets
//! - [`UniformGrid`] spatial index answering the sphere/column range queries
//! - [`Smoothed`]/[`SmoothedVec3`] exponential camera smoothing
//! - [`KeyLatch`] edge-detecting key state for jump/fire
//! - [`ModelTransform`], [`ViewerOptions`], and [`SceneSnapshot`] persistence

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod grid;
pub mod input;
pub mod options;
pub mod smoothing;
pub mod snapshot;
pub mod store;
pub mod transform;

pub use error::{Result, SplatnavError};
pub use grid::UniformGrid;
pub use input::{KeyLatch, LatchState};
pub use options::{AvatarOptions, OrbitOptions, PickOptions, ProjectileOptions, ViewerOptions};
pub use smoothing::{Smoothed, SmoothedVec3};
pub use snapshot::SceneSnapshot;
pub use store::{PointCloudStore, SceneBounds};
pub use transform::ModelTransform;

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
