use glam::{Mat4, Vec3};
use rand::Rng;

use crate::config::GameConfig;

/// A static box resting on the ground. Never moved after creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub position: Vec3,
    pub scale: f32,
}

impl Obstacle {
    pub fn new(x: f32, z: f32, scale: f32) -> Self {
        Self {
            position: Vec3::new(x, scale / 2.0, z),
            scale,
        }
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), glam::Quat::IDENTITY, self.position)
    }
}

/// The set of obstacles generated once at startup.
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    /// Scatter `config.obstacle_count` boxes over the central part of the world,
    /// keeping the spawn square around the origin clear.
    ///
    /// Placement uses rejection sampling with a bounded number of attempts per
    /// box. If every attempt lands in the exclusion square the last draw is
    /// pushed out along its dominant axis.
    pub fn generate<R: Rng>(config: &GameConfig, rng: &mut R) -> Self {
        let half = (config.world_size * config.spawn_fraction / 2.0).max(0.0);
        let exclusion = config.spawn_exclusion;
        let (lo, hi) = if config.obstacle_scale_min <= config.obstacle_scale_max {
            (config.obstacle_scale_min, config.obstacle_scale_max)
        } else {
            (config.obstacle_scale_max, config.obstacle_scale_min)
        };

        let count = config.obstacle_count.min(config.max_obstacles);
        if count < config.obstacle_count {
            tracing::warn!(requested = config.obstacle_count, count, "obstacle count capped");
        }

        let mut obstacles = Vec::with_capacity(count);
        let mut fallbacks = 0usize;

        for _ in 0..count {
            let mut placed = None;
            let mut last = (0.0, 0.0);

            for _ in 0..config.max_placement_attempts.max(1) {
                let x = rng.random_range(-half..=half);
                let z = rng.random_range(-half..=half);
                if !in_exclusion(x, z, exclusion) {
                    placed = Some((x, z));
                    break;
                }
                last = (x, z);
            }

            let (x, z) = placed.unwrap_or_else(|| {
                fallbacks += 1;
                push_out_of_exclusion(last.0, last.1, exclusion)
            });
            let scale = rng.random_range(lo..=hi);
            obstacles.push(Obstacle::new(x, z, scale));
        }

        if fallbacks > 0 {
            tracing::warn!(fallbacks, "obstacle placement exhausted its attempts; pushed boxes out of the spawn area");
        }
        tracing::info!(count = obstacles.len(), "generated obstacle field");

        Self { obstacles }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}

fn in_exclusion(x: f32, z: f32, exclusion: f32) -> bool {
    x.abs() <= exclusion && z.abs() <= exclusion
}

fn push_out_of_exclusion(x: f32, z: f32, exclusion: f32) -> (f32, f32) {
    let edge = exclusion + 1.0;
    if x.abs() >= z.abs() {
        (edge.copysign(x), z)
    } else {
        (x, edge.copysign(z))
    }
}
