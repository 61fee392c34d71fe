use glam::Vec3;

use crate::config::GameConfig;
use crate::model::{Camera, Vehicle};

/// Third-person follow camera.
///
/// The eye moves a fixed fraction of the way to its goal every frame, so the
/// lag depends on frame rate rather than elapsed time.
pub struct ChaseCamera {
    pub offset: Vec3,
    pub smoothing: f32,
}

impl ChaseCamera {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            offset: config.camera_offset,
            smoothing: config.camera_smoothing,
        }
    }

    /// Where the eye wants to be: the offset rotated into the vehicle's frame.
    pub fn desired_position(&self, vehicle: &Vehicle) -> Vec3 {
        vehicle.position + vehicle.rotation() * self.offset
    }

    pub fn update(&self, camera: &mut Camera, vehicle: &Vehicle) {
        let desired = self.desired_position(vehicle);
        camera.eye += (desired - camera.eye) * self.smoothing;
        camera.set_look_at(vehicle.position);
    }

    /// Jump straight to the desired pose (used once at startup).
    pub fn snap(&self, camera: &mut Camera, vehicle: &Vehicle) {
        camera.eye = self.desired_position(vehicle);
        camera.set_look_at(vehicle.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn setup() -> (ChaseCamera, Camera, Vehicle) {
        let cfg = GameConfig::default();
        (
            ChaseCamera::new(&cfg),
            Camera::new(800, 600),
            Vehicle::new(cfg.ground_offset, cfg.vehicle_half_extents),
        )
    }

    #[test]
    fn test_desired_position_behind_and_above() {
        let (chase, _, mut v) = setup();
        assert!((chase.desired_position(&v) - Vec3::new(0.0, 5.5, 12.0)).length() < 1e-5);

        // Facing -X, so "behind" is +X
        v.yaw = FRAC_PI_2;
        assert!((chase.desired_position(&v) - Vec3::new(12.0, 5.5, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_resting_camera_is_fixed_point() {
        let (chase, mut cam, v) = setup();
        chase.snap(&mut cam, &v);
        let start = cam.eye;
        for _ in 0..100 {
            chase.update(&mut cam, &v);
            assert_eq!(cam.eye, start);
        }
    }

    #[test]
    fn test_eye_moves_five_percent_per_frame() {
        let (chase, mut cam, mut v) = setup();
        chase.snap(&mut cam, &v);
        let before = cam.eye;
        v.position.z -= 10.0;
        chase.update(&mut cam, &v);

        let desired = chase.desired_position(&v);
        let expected = before + (desired - before) * 0.05;
        assert!((cam.eye - expected).length() < 1e-5);
    }

    #[test]
    fn test_looks_at_current_vehicle_position() {
        let (chase, mut cam, mut v) = setup();
        chase.snap(&mut cam, &v);
        v.position = Vec3::new(20.0, 0.5, -30.0);
        chase.update(&mut cam, &v);
        assert_eq!(cam.target, v.position);
    }
}
