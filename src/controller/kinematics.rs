use crate::config::GameConfig;
use crate::controller::input::InputSnapshot;
use crate::model::Vehicle;

/// Constant-speed driving: yaw, then translate along the new heading, then clamp.
pub struct VehicleKinematics {
    pub move_speed: f32,
    pub turn_speed: f32,
    pub ground_offset: f32,
    pub bound: f32,
}

impl VehicleKinematics {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            move_speed: config.move_speed,
            turn_speed: config.turn_speed,
            ground_offset: config.ground_offset,
            bound: config.bound(),
        }
    }

    /// Advance the vehicle by `dt` seconds of the given input.
    pub fn update(&self, vehicle: &mut Vehicle, input: InputSnapshot, dt: f32) {
        let dt = dt.max(0.0);

        vehicle.yaw += self.turn_speed * dt * input.turn;

        // Local -Z after this frame's rotation; negative forward advances
        let distance = -self.move_speed * dt * input.forward;
        vehicle.position += vehicle.heading() * distance;

        vehicle.position.x = vehicle.position.x.clamp(-self.bound, self.bound);
        vehicle.position.z = vehicle.position.z.clamp(-self.bound, self.bound);
        vehicle.position.y = self.ground_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn setup() -> (VehicleKinematics, Vehicle) {
        let cfg = GameConfig::default();
        (VehicleKinematics::new(&cfg), Vehicle::new(cfg.ground_offset, cfg.vehicle_half_extents))
    }

    #[test]
    fn test_turn_one_second_is_half_revolution() {
        let (kin, mut v) = setup();
        kin.update(&mut v, InputSnapshot { forward: 0.0, turn: 1.0 }, 1.0);
        assert!((v.yaw - PI).abs() < 1e-6);
        assert_eq!(v.position, Vec3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn test_forward_moves_along_negative_z() {
        let (kin, mut v) = setup();
        kin.update(&mut v, InputSnapshot { forward: -1.0, turn: 0.0 }, 0.5);
        assert!((v.position - Vec3::new(0.0, 0.5, -5.0)).length() < 1e-5);

        kin.update(&mut v, InputSnapshot { forward: 0.6, turn: 0.0 }, 1.0);
        assert!((v.position - Vec3::new(0.0, 0.5, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_rotate_then_translate() {
        let (kin, mut v) = setup();
        // Half a second at full left turn is a quarter turn; heading is now -X
        kin.update(&mut v, InputSnapshot { forward: -1.0, turn: 1.0 }, 0.5);
        assert!((v.yaw - FRAC_PI_2).abs() < 1e-6);
        assert!((v.position - Vec3::new(-5.0, 0.5, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_position_clamped_for_any_input() {
        let (kin, mut v) = setup();
        let inputs = [
            InputSnapshot { forward: -1.0, turn: 0.0 },
            InputSnapshot { forward: 0.6, turn: 0.3 },
            InputSnapshot { forward: -1.0, turn: -0.7 },
            InputSnapshot { forward: -0.4, turn: 1.0 },
        ];
        for dt in [0.0, 0.016, 0.5, 3.0, 1.0e4] {
            for input in inputs {
                kin.update(&mut v, input, dt);
                assert!(v.position.x.abs() <= 98.0);
                assert!(v.position.z.abs() <= 98.0);
                assert_eq!(v.position.y, 0.5);
            }
        }
    }

    #[test]
    fn test_stalled_frame_pins_to_boundary() {
        let (kin, mut v) = setup();
        kin.update(&mut v, InputSnapshot { forward: -1.0, turn: 0.0 }, 60.0);
        assert_eq!(v.position.z, -98.0);
    }

    #[test]
    fn test_vertical_drift_is_overridden() {
        let (kin, mut v) = setup();
        v.position.y = 42.0;
        kin.update(&mut v, InputSnapshot::default(), 0.016);
        assert_eq!(v.position.y, 0.5);
    }

    #[test]
    fn test_reverse_moves_against_heading() {
        let (kin, mut v) = setup();
        v.yaw = FRAC_PI_2;
        kin.update(&mut v, InputSnapshot { forward: 0.6, turn: 0.0 }, 1.0);
        // Facing -X, reversing at 0.6 backs off towards +X
        assert!((v.position - Vec3::new(6.0, 0.5, 0.0)).length() < 1e-4);
        assert!(v.heading().dot(Vec3::X) < -0.99);
    }

    #[test]
    fn test_negative_dt_treated_as_zero() {
        let (kin, mut v) = setup();
        kin.update(&mut v, InputSnapshot { forward: -1.0, turn: 1.0 }, -1.0);
        assert_eq!(v.yaw, 0.0);
        assert_eq!(v.position, Vec3::new(0.0, 0.5, 0.0));
    }
}
