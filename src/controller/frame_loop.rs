use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::controller::camera_controller::ChaseCamera;
use crate::controller::input::{GamepadSource, InputState};
use crate::controller::kinematics::VehicleKinematics;
use crate::model::{Camera, ObstacleField, Vehicle};

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub sun_dir: [f32; 3],
    pub sun_intensity: f32,
    pub ambient: f32,
    pub _pad1: f32,
    pub _pad2: f32,
    pub _pad3: f32,
}

impl Default for LightingUniform {
    fn default() -> Self {
        Self {
            sun_dir: [0.4, 1.0, 0.3],
            sun_intensity: 0.7,
            ambient: 0.35,
            _pad1: 0.0,
            _pad2: 0.0,
            _pad3: 0.0,
        }
    }
}

/// Monotonic time in milliseconds.
pub trait TimeSource {
    fn now_ms(&self) -> f64;
}

/// Turns successive timestamps into frame deltas in seconds.
///
/// The first frame has a zero delta and going backwards in time is treated as
/// no time passing. Long stalls are passed through unchanged.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last {
            Some(last) => ((now_ms - last) / 1000.0).max(0.0) as f32,
            None => 0.0,
        };
        self.last = Some(now_ms);
        dt
    }
}

/// All mutable game state, touched only from the per-frame step.
pub struct Simulation {
    pub config: GameConfig,
    pub vehicle: Vehicle,
    pub obstacles: ObstacleField,
    pub camera: Camera,
    pub input: InputState,
    pub kinematics: VehicleKinematics,
    pub chase: ChaseCamera,
}

impl Simulation {
    /// Build the world. The obstacle field is seeded from `config.seed`,
    /// falling back to `entropy`.
    pub fn new(config: GameConfig, width: u32, height: u32, entropy: u64) -> Self {
        let seed = config.seed.unwrap_or(entropy);
        let mut rng = SmallRng::seed_from_u64(seed);
        let obstacles = ObstacleField::generate(&config, &mut rng);

        let vehicle = Vehicle::new(config.ground_offset, config.vehicle_half_extents);
        let chase = ChaseCamera::new(&config);
        let mut camera = Camera::new(width, height);
        chase.snap(&mut camera, &vehicle);

        tracing::info!(
            seed,
            world_size = config.world_size,
            obstacles = obstacles.len(),
            "simulation ready"
        );

        Self {
            kinematics: VehicleKinematics::new(&config),
            input: InputState::new(config.dead_zone),
            config,
            vehicle,
            obstacles,
            camera,
            chase,
        }
    }

    /// One frame: refresh the gamepad, drive the vehicle, follow with the camera.
    pub fn step(&mut self, dt: f32, gamepads: &dyn GamepadSource) {
        self.input.gamepad.poll(gamepads);
        let snapshot = self.input.snapshot(self.config.reverse_factor);
        self.kinematics.update(&mut self.vehicle, snapshot, dt);
        self.chase.update(&mut self.camera, &self.vehicle);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    pub fn camera_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.camera.view_proj().to_cols_array_2d(),
        }
    }
}

/// Drives a [`Simulation`] from an injected clock and gamepad source.
pub struct FrameLoop<T: TimeSource, G: GamepadSource> {
    pub sim: Simulation,
    clock: FrameClock,
    time: T,
    gamepads: G,
}

impl<T: TimeSource, G: GamepadSource> FrameLoop<T, G> {
    pub fn new(sim: Simulation, time: T, gamepads: G) -> Self {
        Self {
            sim,
            clock: FrameClock::new(),
            time,
            gamepads,
        }
    }

    /// Run one iteration and return the delta it used.
    pub fn tick(&mut self) -> f32 {
        let dt = self.clock.delta(self.time.now_ms());
        self.sim.step(dt, &self.gamepads);
        dt
    }
}

pub mod platform {
    use super::TimeSource;

    /// `performance.now()` in the browser.
    pub struct PerformanceTime {
        performance: Option<web_sys::Performance>,
    }

    impl PerformanceTime {
        pub fn new(window: &web_sys::Window) -> Self {
            Self { performance: window.performance() }
        }
    }

    impl TimeSource for PerformanceTime {
        fn now_ms(&self) -> f64 {
            self.performance.as_ref().map(|p| p.now()).unwrap_or(0.0)
        }
    }

    /// Milliseconds since construction, for native builds.
    pub struct InstantTime {
        start: std::time::Instant,
    }

    impl InstantTime {
        pub fn new() -> Self {
            Self { start: std::time::Instant::now() }
        }
    }

    impl TimeSource for InstantTime {
        fn now_ms(&self) -> f64 {
            self.start.elapsed().as_secs_f64() * 1000.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::{GamepadReading, InputEvent, NoGamepads};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Clone)]
    struct ManualTime(Rc<Cell<f64>>);

    impl TimeSource for ManualTime {
        fn now_ms(&self) -> f64 {
            self.0.get()
        }
    }

    #[derive(Clone, Default)]
    struct ScriptedPads(Rc<RefCell<Option<GamepadReading>>>);

    impl GamepadSource for ScriptedPads {
        fn read(&self, _index: u32) -> Option<GamepadReading> {
            self.0.borrow().clone()
        }
    }

    fn sim() -> Simulation {
        let cfg = GameConfig { seed: Some(11), ..GameConfig::default() };
        Simulation::new(cfg, 800, 600, 0)
    }

    #[test]
    fn test_frame_clock_deltas() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.delta(1000.0), 0.0);
        assert!((clock.delta(1016.0) - 0.016).abs() < 1e-6);
        assert_eq!(clock.delta(1000.0), 0.0);
        assert!((clock.delta(6000.0) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_seeded_worlds_are_reproducible() {
        let a = sim();
        let b = sim();
        let pa: Vec<_> = a.obstacles.iter().copied().collect();
        let pb: Vec<_> = b.obstacles.iter().copied().collect();
        assert_eq!(pa, pb);
        assert_eq!(pa.len(), 30);
    }

    #[test]
    fn test_idle_frames_leave_camera_at_rest() {
        let mut s = sim();
        let eye = s.camera.eye;
        for _ in 0..10 {
            s.step(0.016, &NoGamepads);
        }
        assert_eq!(s.camera.eye, eye);
        assert_eq!(s.camera.target, s.vehicle.position);
    }

    #[test]
    fn test_loop_uses_injected_time() {
        let now = Rc::new(Cell::new(0.0));
        let mut frames = FrameLoop::new(sim(), ManualTime(now.clone()), NoGamepads);
        frames.sim.input.process_event(&InputEvent::KeyDown("w".into()));

        assert_eq!(frames.tick(), 0.0);
        assert_eq!(frames.sim.vehicle.position.z, 0.0);

        now.set(1000.0);
        assert!((frames.tick() - 1.0).abs() < 1e-6);
        assert!((frames.sim.vehicle.position.z - -10.0).abs() < 1e-4);
        assert!(frames.sim.camera.eye.z < 12.0);
    }

    #[test]
    fn test_gamepad_disconnect_falls_back_to_keyboard() {
        let now = Rc::new(Cell::new(0.0));
        let pads = ScriptedPads::default();
        *pads.0.borrow_mut() = Some(GamepadReading { axes: vec![-1.0, 0.0], buttons: vec![] });

        let mut frames = FrameLoop::new(sim(), ManualTime(now.clone()), pads.clone());
        frames.sim.input.process_event(&InputEvent::GamepadConnected { index: 0, buttons: 0 });
        frames.sim.input.process_event(&InputEvent::KeyDown("d".into()));
        frames.tick();

        // Stick hard left overrides the right key
        now.set(500.0);
        frames.tick();
        assert!(frames.sim.vehicle.yaw > 0.0);
        let yaw = frames.sim.vehicle.yaw;

        // Device vanishes from the list
        *pads.0.borrow_mut() = None;
        now.set(1000.0);
        frames.tick();
        assert_eq!(frames.sim.input.gamepad.active(), None);
        assert_eq!(frames.sim.input.gamepad.axis(0), 0.0);
        assert!((frames.sim.vehicle.yaw - (yaw - std::f32::consts::PI * 0.5)).abs() < 1e-5);
    }
}
