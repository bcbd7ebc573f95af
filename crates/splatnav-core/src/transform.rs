//! Model transform for the loaded point cloud.
//!
//! The store keeps point positions in local space; this transform maps them
//! to world space for picking, collision, and rendering. It is part of the
//! persisted scene state.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A transformation represented as separate components.
///
/// Kept decomposed (rather than as a bare `Mat4`) so UI manipulation and
/// persistence can address translation and rotation independently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelTransform {
    /// Translation component.
    pub translation: Vec3,
    /// Rotation component as a quaternion.
    pub rotation: Quat,
    /// Scale component.
    pub scale: Vec3,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl ModelTransform {
    /// Creates a new identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Creates a transform from a translation.
    #[must_use]
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Creates a transform from a rotation.
    #[must_use]
    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Default::default()
        }
    }

    /// Creates a transform from a Mat4.
    ///
    /// This decomposition may not be exact for matrices with shear.
    #[must_use]
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Converts this transform to a Mat4.
    #[must_use]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Maps a local-space point to world space.
    #[must_use]
    pub fn apply(&self, local: Vec3) -> Vec3 {
        self.rotation * (local * self.scale) + self.translation
    }

    /// Maps a world-space direction back to local space (ignores translation).
    ///
    /// Components with zero scale are left untouched rather than divided.
    #[must_use]
    pub fn inverse_direction(&self, world: Vec3) -> Vec3 {
        let unrotated = self.rotation.inverse() * world;
        let safe = |d: f32, s: f32| if s.abs() > f32::EPSILON { d / s } else { d };
        Vec3::new(
            safe(unrotated.x, self.scale.x),
            safe(unrotated.y, self.scale.y),
            safe(unrotated.z, self.scale.z),
        )
    }

    /// Returns the rotation as Euler angles (in radians).
    #[must_use]
    pub fn euler_angles(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(glam::EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    /// Sets the rotation from Euler angles (in radians).
    pub fn set_euler_angles(&mut self, angles: Vec3) {
        self.rotation = Quat::from_euler(glam::EulerRot::XYZ, angles.x, angles.y, angles.z);
    }

    /// Returns the rotation as Euler angles (in degrees).
    #[must_use]
    pub fn euler_angles_degrees(&self) -> Vec3 {
        self.euler_angles() * (180.0 / std::f32::consts::PI)
    }

    /// Sets the rotation from Euler angles (in degrees).
    pub fn set_euler_angles_degrees(&mut self, degrees: Vec3) {
        self.set_euler_angles(degrees * (std::f32::consts::PI / 180.0));
    }

    /// Applies snap to translation.
    pub fn snap_translation(&mut self, snap: f32) {
        if snap > 0.0 {
            self.translation = (self.translation / snap).round() * snap;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_matrix_roundtrip() {
        let t = ModelTransform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        };
        let matrix = t.to_matrix();
        let back = ModelTransform::from_matrix(matrix);
        assert!((back.translation - t.translation).length() < 1e-6);
    }

    #[test]
    fn test_transform_euler_angles() {
        let mut t = ModelTransform::identity();
        t.set_euler_angles_degrees(Vec3::new(0.0, 90.0, 0.0));
        let angles = t.euler_angles_degrees();
        assert!((angles.y - 90.0).abs() < 0.1);
    }

    #[test]
    fn test_apply_matches_matrix() {
        let mut t = ModelTransform::from_translation(Vec3::new(1.0, 0.0, -2.0));
        t.set_euler_angles_degrees(Vec3::new(0.0, 45.0, 0.0));
        t.scale = Vec3::splat(2.0);
        let p = Vec3::new(0.3, -1.2, 0.7);
        let via_matrix = (t.to_matrix() * p.extend(1.0)).truncate();
        assert!((t.apply(p) - via_matrix).length() < 1e-5);
    }

    #[test]
    fn test_inverse_direction_undoes_rotation() {
        let mut t = ModelTransform::identity();
        t.set_euler_angles_degrees(Vec3::new(0.0, 90.0, 0.0));
        let world = Vec3::X;
        let local = t.inverse_direction(world);
        // Rotating the local direction forward should recover the world one.
        assert!((t.rotation * local - world).length() < 1e-5);
    }

    #[test]
    fn test_snap_translation() {
        let mut t = ModelTransform::from_translation(Vec3::new(1.2, 2.7, 3.1));
        t.snap_translation(0.5);
        assert_eq!(t.translation, Vec3::new(1.0, 2.5, 3.0));
    }
}
