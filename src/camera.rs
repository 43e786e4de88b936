use glam::{Mat4, Vec2, Vec3};

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
    /// World-space right vector, used to orient billboards.
    pub right: Vec3,
    /// World-space up vector, used to orient billboards.
    pub up: Vec3,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY,
            position: Vec3::ZERO,
            right: Vec3::X,
            up: Vec3::Y,
        }
    }
}

/// Camera orbiting a target point, steered with pointer drags and the wheel.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    target: Vec3,
    distance: f32,
    /// Rotation around the world Y axis, radians.
    yaw: f32,
    /// Elevation above the XZ plane, radians.
    pitch: f32,
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitCamera {
    const ORBIT_SPEED: f32 = 0.01;
    const ZOOM_STEP: f32 = 0.9;
    const MIN_DISTANCE: f32 = 0.1;
    const MAX_DISTANCE: f32 = 50.0;
    const PITCH_LIMIT: f32 = 1.55;

    /// Camera two units in front of the origin, looking down -Z.
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 2.0,
            yaw: 0.0,
            pitch: 0.0,
            fov_y: 60f32.to_radians(),
            aspect: 4.0 / 3.0,
            near: 0.05,
            far: 100.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + self.distance * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Rotates around the target by a pointer delta in pixels.
    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw -= delta.x * Self::ORBIT_SPEED;
        self.pitch = (self.pitch + delta.y * Self::ORBIT_SPEED)
            .clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// Moves toward the target for positive `lines`, away for negative.
    pub fn zoom(&mut self, lines: f32) {
        self.distance = (self.distance * Self::ZOOM_STEP.powf(lines))
            .clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect.max(0.01), self.near, self.far)
    }

    pub fn params(&self) -> CameraParams {
        let view = self.view();
        let world = view.inverse();
        CameraParams {
            view_proj: self.projection() * view,
            position: self.position(),
            right: world.x_axis.truncate().normalize_or_zero(),
            up: world.y_axis.truncate().normalize_or_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_front_of_origin() {
        let camera = OrbitCamera::new();
        assert!((camera.position() - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-6);
        let params = camera.params();
        assert!((params.right - Vec3::X).length() < 1e-5);
        assert!((params.up - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn orbit_keeps_distance_and_clamps_pitch() {
        let mut camera = OrbitCamera::new();
        camera.orbit(Vec2::new(120.0, 10_000.0));
        assert!((camera.position().length() - 2.0).abs() < 1e-5);
        assert!(camera.position().y < 2.0);
        assert!(camera.position().y > 1.9);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = OrbitCamera::new();
        camera.zoom(1_000.0);
        assert_eq!(camera.distance(), 0.1);
        camera.zoom(-1_000.0);
        assert_eq!(camera.distance(), 50.0);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let camera = OrbitCamera::new();
        let clip = camera.params().view_proj * Vec3::ZERO.extend(1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }
}
