use glam::Vec3;
use std::f32::consts::PI;
use std::str::FromStr;

/// Tunables for the world, the vehicle and the chase camera.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Edge length of the square ground plane.
    pub world_size: f32,
    pub obstacle_count: usize,
    /// Upper limit accepted for `obstacle_count`.
    pub max_obstacles: usize,
    pub dead_zone: f32,

    // Vehicle
    pub move_speed: f32,
    pub turn_speed: f32,
    pub reverse_factor: f32,
    pub ground_offset: f32,
    pub boundary_margin: f32,
    pub vehicle_half_extents: Vec3,

    // Obstacle placement
    pub spawn_fraction: f32,
    pub spawn_exclusion: f32,
    pub obstacle_scale_min: f32,
    pub obstacle_scale_max: f32,
    pub max_placement_attempts: u32,

    // Chase camera
    pub camera_offset: Vec3,
    /// Blend factor applied once per frame, independent of elapsed time.
    pub camera_smoothing: f32,

    /// Fixed RNG seed for the obstacle field; random per run when `None`.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_size: 200.0,
            obstacle_count: 30,
            max_obstacles: 10_000,
            dead_zone: 0.15,
            move_speed: 10.0,
            turn_speed: PI,
            reverse_factor: 0.6,
            ground_offset: 0.5,
            boundary_margin: 2.0,
            vehicle_half_extents: Vec3::new(1.0, 0.5, 2.0),
            spawn_fraction: 0.9,
            spawn_exclusion: 5.0,
            obstacle_scale_min: 1.0,
            obstacle_scale_max: 4.0,
            max_placement_attempts: 64,
            camera_offset: Vec3::new(0.0, 5.0, 12.0),
            camera_smoothing: 0.05,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Largest absolute horizontal coordinate the vehicle may reach.
    pub fn bound(&self) -> f32 {
        (self.world_size / 2.0 - self.boundary_margin).max(0.0)
    }

    /// Apply string overrides (`world_size`, `obstacles`, `dead_zone`, `seed`).
    ///
    /// Bad values are logged and skipped; the defaults stay in place.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_key::<f32, _>(&lookup, "world_size") {
            if v.is_finite() && v > 2.0 * self.boundary_margin {
                self.world_size = v;
            } else {
                tracing::warn!(value = v, "world_size out of range, keeping {}", self.world_size);
            }
        }
        if let Some(v) = parse_key::<usize, _>(&lookup, "obstacles") {
            if v <= self.max_obstacles {
                self.obstacle_count = v;
            } else {
                tracing::warn!(value = v, max = self.max_obstacles, "too many obstacles, keeping {}", self.obstacle_count);
            }
        }
        if let Some(v) = parse_key::<f32, _>(&lookup, "dead_zone") {
            if (0.0..1.0).contains(&v) {
                self.dead_zone = v;
            } else {
                tracing::warn!(value = v, "dead_zone must be in [0, 1), keeping {}", self.dead_zone);
            }
        }
        if let Some(v) = parse_key::<u64, _>(&lookup, "seed") {
            self.seed = Some(v);
        }
    }
}

fn parse_key<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, raw = raw.as_str(), "ignoring unparsable config override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_world_constants() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.obstacle_count, 30);
        assert_eq!(cfg.dead_zone, 0.15);
        assert_eq!(cfg.bound(), 98.0);
        assert_eq!(cfg.camera_offset, Vec3::new(0.0, 5.0, 12.0));
    }

    #[test]
    fn test_overrides_applied() {
        let mut cfg = GameConfig::default();
        cfg.apply_overrides(lookup_from(&[
            ("world_size", "100"),
            ("obstacles", "12"),
            ("dead_zone", "0.2"),
            ("seed", "42"),
        ]));
        assert_eq!(cfg.world_size, 100.0);
        assert_eq!(cfg.obstacle_count, 12);
        assert_eq!(cfg.dead_zone, 0.2);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.bound(), 48.0);
    }

    #[test]
    fn test_bad_overrides_keep_defaults() {
        let mut cfg = GameConfig::default();
        cfg.apply_overrides(lookup_from(&[
            ("world_size", "-5"),
            ("obstacles", "many"),
            ("dead_zone", "3"),
        ]));
        assert_eq!(cfg, GameConfig::default());

        let huge = usize::MAX.to_string();
        cfg.apply_overrides(lookup_from(&[("obstacles", huge.as_str())]));
        assert_eq!(cfg.obstacle_count, 30);
        cfg.apply_overrides(lookup_from(&[("obstacles", "10001")]));
        assert_eq!(cfg.obstacle_count, 30);
    }

    #[test]
    fn test_obstacle_limit_is_inclusive() {
        let mut cfg = GameConfig::default();
        cfg.apply_overrides(lookup_from(&[("obstacles", "10000")]));
        assert_eq!(cfg.obstacle_count, 10_000);
        cfg.apply_overrides(lookup_from(&[("obstacles", "0")]));
        assert_eq!(cfg.obstacle_count, 0);
    }
}
