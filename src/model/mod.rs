// MODEL: Game state and data
pub mod camera;
pub mod vehicle;
pub mod obstacle;

pub use camera::Camera;
pub use vehicle::Vehicle;
pub use obstacle::{Obstacle, ObstacleField};
