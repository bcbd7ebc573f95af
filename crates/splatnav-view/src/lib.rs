//! Camera, orbit navigation, and point picking for splatnav.
//!
//! [`Camera`] is the raw pose plus projection; [`OrbitCamera`] drives it in
//! orbit mode with smoothed spherical coordinates; [`PointPicker`] resolves
//! cursor clicks against the point cloud store.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod camera;
pub mod orbit;
pub mod pick;

pub use camera::{AxisDirection, Camera, ProjectionMode, RenderView};
pub use orbit::{DragState, OrbitCamera};
pub use pick::{screen_ray, PickHit, PointPicker, Ray};
