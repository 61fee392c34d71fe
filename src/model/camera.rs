use glam::{Mat4, Vec3};

pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 5.0, 12.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 75f32.to_radians(),
            aspect: aspect_ratio(width, height),
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn set_look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }
}

// Zero-sized viewports happen while a window is minimised
fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_tracks_viewport() {
        let mut cam = Camera::new(800, 600);
        assert!((cam.aspect - 4.0 / 3.0).abs() < 1e-6);
        cam.set_aspect(1920, 1080);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-6);
        cam.set_aspect(640, 0);
        assert!(cam.aspect.is_finite());
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let mut cam = Camera::new(800, 600);
        cam.eye = Vec3::new(3.0, 5.0, 12.0);
        cam.set_look_at(Vec3::new(-2.0, 0.5, 1.0));
        let clip = cam.view_proj() * cam.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
    }
}
