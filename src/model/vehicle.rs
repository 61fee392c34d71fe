use glam::{Mat4, Quat, Vec3};

/// The single drivable box.
///
/// Orientation is a yaw angle about +Y; local forward is -Z, so a negative
/// forward input advances the vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vehicle {
    pub position: Vec3,
    pub yaw: f32,
    pub half_extents: Vec3,
}

impl Vehicle {
    pub fn new(ground_offset: f32, half_extents: Vec3) -> Self {
        Self {
            position: Vec3::new(0.0, ground_offset, 0.0),
            yaw: 0.0,
            half_extents,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// World-space direction the vehicle drives towards with forward input.
    pub fn heading(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    /// Model matrix for drawing a unit cube as this vehicle.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.half_extents * 2.0, self.rotation(), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_vehicle_rests_on_ground() {
        let v = Vehicle::new(0.5, Vec3::new(1.0, 0.5, 2.0));
        assert_eq!(v.position, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(v.yaw, 0.0);
    }

    #[test]
    fn test_heading_follows_yaw() {
        let mut v = Vehicle::new(0.5, Vec3::ONE);
        assert!((v.heading() - Vec3::NEG_Z).length() < 1e-6);

        // Quarter turn left faces -X
        v.yaw = std::f32::consts::FRAC_PI_2;
        assert!((v.heading() - Vec3::NEG_X).length() < 1e-6);
    }
}
