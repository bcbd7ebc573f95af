//! Camera and view management.

use glam::{Mat4, Vec3};

/// Camera projection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    /// Perspective projection.
    #[default]
    Perspective,
    /// Orthographic projection.
    Orthographic,
}

/// Axis-aligned view directions for the orbit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisDirection {
    /// Positive X axis.
    PosX,
    /// Negative X axis.
    NegX,
    /// Positive Y axis (top view).
    PosY,
    /// Negative Y axis (bottom view).
    NegY,
    /// Positive Z axis (default front).
    #[default]
    PosZ,
    /// Negative Z axis.
    NegZ,
}

impl AxisDirection {
    /// Returns display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            AxisDirection::PosX => "+X",
            AxisDirection::NegX => "-X",
            AxisDirection::PosY => "+Y",
            AxisDirection::NegY => "-Y",
            AxisDirection::PosZ => "+Z",
            AxisDirection::NegZ => "-Z",
        }
    }
}

/// Per-frame camera output handed to the rendering collaborator.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// View matrix.
    pub view: Mat4,
    /// Projection matrix.
    pub projection: Mat4,
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
}

impl RenderView {
    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// A 3D camera for viewing the scene.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Projection mode.
    pub projection_mode: ProjectionMode,
    /// Half height of the orthographic view volume.
    pub ortho_height: f32,
}

impl Camera {
    /// Creates a new camera with default settings.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect_ratio,
            near: 0.01,
            far: 1000.0,
            projection_mode: ProjectionMode::Perspective,
            ortho_height: 1.0,
        }
    }

    /// Sets the aspect ratio.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio.max(1e-3);
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection_mode {
            ProjectionMode::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_height = self.ortho_height;
                let half_width = half_height * self.aspect_ratio;
                // Symmetric depth range around the target so geometry between
                // camera and target never clips out.
                let dist = (self.position - self.target).length();
                let ortho_depth = (dist + self.far).max(self.ortho_height * 100.0);
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    -ortho_depth,
                    ortho_depth,
                )
            }
        }
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Snapshots the matrices and pose for the renderer.
    #[must_use]
    pub fn render_view(&self) -> RenderView {
        RenderView {
            view: self.view_matrix(),
            projection: self.projection_matrix(),
            eye: self.position,
            target: self.target,
        }
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize()
    }

    /// Returns the camera's right direction.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize()
    }

    /// World-space length covered by one pixel at the given view depth.
    ///
    /// The picker uses this to translate its pixel threshold into a search
    /// radius around the cursor ray.
    #[must_use]
    pub fn world_units_per_pixel(&self, depth: f32, viewport_height: f32) -> f32 {
        let viewport_height = viewport_height.max(1.0);
        match self.projection_mode {
            ProjectionMode::Perspective => {
                2.0 * depth.max(self.near) * (self.fov * 0.5).tan() / viewport_height
            }
            ProjectionMode::Orthographic => 2.0 * self.ortho_height / viewport_height,
        }
    }

    /// Sets the projection mode.
    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.projection_mode = mode;
    }

    /// Sets the half height of the orthographic view volume.
    pub fn set_ortho_height(&mut self, height: f32) {
        self.ortho_height = height.max(0.01);
    }

    /// Sets the field of view in radians.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov.clamp(0.1, std::f32::consts::PI - 0.1);
    }

    /// Sets the near clipping plane.
    pub fn set_near(&mut self, near: f32) {
        self.near = near.max(0.001);
    }

    /// Sets the far clipping plane.
    pub fn set_far(&mut self, far: f32) {
        self.far = far.max(self.near + 0.1);
    }

    /// Returns FOV in degrees.
    #[must_use]
    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    /// Sets FOV from degrees.
    pub fn set_fov_degrees(&mut self, degrees: f32) {
        self.set_fov(degrees.to_radians());
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let camera = Camera::default();
        assert_eq!(camera.projection_mode, ProjectionMode::Perspective);
        assert_eq!(camera.target, Vec3::ZERO);
        assert_eq!(camera.up, Vec3::Y);
    }

    #[test]
    fn test_projection_mode_perspective() {
        let camera = Camera::new(1.0);
        let proj = camera.projection_matrix();
        // Perspective matrix has non-zero w division
        assert!(proj.w_axis.z != 0.0);
    }

    #[test]
    fn test_projection_mode_orthographic() {
        let mut camera = Camera::new(1.0);
        camera.set_projection_mode(ProjectionMode::Orthographic);
        camera.set_ortho_height(5.0);
        let proj = camera.projection_matrix();
        // Orthographic matrix has w_axis.w = 1.0
        assert!((proj.w_axis.w - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_set_fov_clamping() {
        let mut camera = Camera::new(1.0);
        camera.set_fov(0.0); // Too small
        assert!(camera.fov >= 0.1);

        camera.set_fov(std::f32::consts::PI); // Too large
        assert!(camera.fov < std::f32::consts::PI);
    }

    #[test]
    fn test_set_ortho_height_clamping() {
        let mut camera = Camera::new(1.0);
        camera.set_ortho_height(0.0); // Degenerate
        assert!(camera.ortho_height >= 0.01);

        camera.set_ortho_height(-2.0); // Negative
        assert!(camera.ortho_height >= 0.01);
    }

    #[test]
    fn test_fov_degrees_conversion() {
        let mut camera = Camera::new(1.0);
        camera.set_fov_degrees(90.0);
        assert!((camera.fov_degrees() - 90.0).abs() < 0.1);
    }

    #[test]
    fn test_far_stays_beyond_near() {
        let mut camera = Camera::new(1.0);
        camera.set_near(5.0);
        camera.set_far(1.0);
        assert!(camera.far > camera.near);
    }

    #[test]
    fn test_world_units_per_pixel_grows_with_depth() {
        let camera = Camera::new(1.0);
        let near = camera.world_units_per_pixel(1.0, 800.0);
        let far = camera.world_units_per_pixel(10.0, 800.0);
        assert!(far > near);
    }

    #[test]
    fn test_world_units_per_pixel_ortho_ignores_depth() {
        let mut camera = Camera::new(1.0);
        camera.set_projection_mode(ProjectionMode::Orthographic);
        camera.set_ortho_height(4.0);
        let a = camera.world_units_per_pixel(1.0, 800.0);
        let b = camera.world_units_per_pixel(50.0, 800.0);
        assert!((a - b).abs() < 1e-6);
        assert!((a - 8.0 / 800.0).abs() < 1e-6);
    }

    #[test]
    fn test_render_view_matches_camera() {
        let camera = Camera::new(1.0);
        let view = camera.render_view();
        assert_eq!(view.eye, camera.position);
        assert_eq!(view.view_projection(), camera.view_projection_matrix());
    }
}
