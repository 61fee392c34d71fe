use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};
use std::error::Error;
use std::sync::Arc;

// Import from the library crate
use chase_drive::{config::GameConfig, logging, utils, view, controller};

use controller::frame_loop::platform::InstantTime;
use controller::{FrameLoop, InputEvent, NoGamepads, Simulation};
use view::{GpuContext, RenderState};

struct App {
    gpu: GpuContext,
    window: Arc<Window>,
    render_state: RenderState,
    frames: FrameLoop<InstantTime, NoGamepads>,
}

impl App {
    async fn new(window: Arc<Window>, config: GameConfig) -> Result<Self, Box<dyn Error>> {
        let size = window.inner_size();
        let gpu = GpuContext::new_native(window.clone(), size.width, size.height).await?;

        let render_state = RenderState::new(
            gpu.device.as_ref(),
            gpu.queue.as_ref(),
            gpu.format,
            gpu.config.alpha_mode,
            gpu.config.width,
            gpu.config.height,
        );

        // No gamepad backend on desktop; keyboard only
        let sim = Simulation::new(config, size.width, size.height, clock_entropy());
        let frames = FrameLoop::new(sim, InstantTime::new(), NoGamepads);

        Ok(Self { gpu, window, render_state, frames })
    }

    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key, .. }, .. } => {
                let PhysicalKey::Code(code) = physical_key else { return false };
                let Some(key) = key_name(*code) else { return false };
                let event = match state {
                    ElementState::Pressed => InputEvent::KeyDown(key.to_string()),
                    ElementState::Released => InputEvent::KeyUp(key.to_string()),
                };
                self.frames.sim.input.process_event(&event);
                true
            }
            WindowEvent::Focused(false) => {
                self.frames.sim.input.process_event(&InputEvent::FocusLost);
                true
            }
            _ => false,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.frames.sim.resize(new_size.width, new_size.height);
            self.render_state.resize(&self.gpu.device, &self.gpu.surface, new_size.width, new_size.height);
        }
    }

    fn frame(&mut self) {
        self.frames.tick();
        let instances = utils::scene_instances(&self.frames.sim);
        self.render_state.update(&self.gpu.device, &self.gpu.queue, &self.frames.sim.camera_uniform(), &instances);
        self.render_state.draw_frame(&self.gpu.device, &self.gpu.queue, &self.gpu.surface);
    }
}

/// Browser-style key names for the keys we bind.
fn key_name(code: KeyCode) -> Option<&'static str> {
    Some(match code {
        KeyCode::KeyW => "w",
        KeyCode::KeyA => "a",
        KeyCode::KeyS => "s",
        KeyCode::KeyD => "d",
        KeyCode::ArrowUp => "ArrowUp",
        KeyCode::ArrowDown => "ArrowDown",
        KeyCode::ArrowLeft => "ArrowLeft",
        KeyCode::ArrowRight => "ArrowRight",
        _ => return None,
    })
}

fn clock_entropy() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let mut config = GameConfig::default();
    config.apply_overrides(|key| std::env::var(format!("CHASE_DRIVE_{}", key.to_ascii_uppercase())).ok());
    tracing::info!(?config, "starting");

    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("Chase Drive")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window, config))?;

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => app.resize(*physical_size),
                        WindowEvent::RedrawRequested => app.frame(),
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
