// CONTROLLER: Input, game logic, and update loop
pub mod input;
pub mod kinematics;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{InputEvent, InputState, InputSnapshot, GamepadState, GamepadSource, GamepadReading, NoGamepads};
pub use kinematics::VehicleKinematics;
pub use camera_controller::ChaseCamera;
pub use frame_loop::{Simulation, FrameLoop, FrameClock, TimeSource, CameraUniform, LightingUniform};
