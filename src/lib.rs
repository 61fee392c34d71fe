// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod logging;
pub mod utils;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Document, Event, GamepadEvent, HtmlCanvasElement, KeyboardEvent, UrlSearchParams, Window};

    use crate::config::GameConfig;
    use crate::controller::frame_loop::platform::PerformanceTime;
    use crate::controller::input::wasm::{gamepad_event_to_input, keyboard_event_to_input, NavigatorGamepads};
    use crate::controller::{FrameLoop, InputEvent, Simulation};
    use crate::logging;
    use crate::utils::scene_instances;
    use crate::view::{GpuContext, RenderState};

    type Frames = Rc<RefCell<FrameLoop<PerformanceTime, NavigatorGamepads>>>;
    type PendingResize = Rc<Cell<Option<(u32, u32)>>>;

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();

        let window = web_sys::window().ok_or(js_error("no global `window`"))?;
        let document = window.document().ok_or(js_error("no document on window"))?;

        let mut config = GameConfig::default();
        config.apply_overrides(query_lookup(&window));
        tracing::info!(?config, "starting");

        let (width, height) = viewport_size(&window);
        let canvas = init_canvas(&document, width, height)?;
        setup_app(&window, &document, &canvas, config, width, height).await
    }

    /// Main application setup for WASM
    async fn setup_app(
        window: &Window,
        document: &Document,
        canvas: &HtmlCanvasElement,
        config: GameConfig,
        width: u32,
        height: u32,
    ) -> Result<(), JsValue> {
        let gpu = GpuContext::new(canvas, width, height)
            .await
            .map_err(|e| js_error(format!("GPU init failed: {e}")))?;

        let mut render_state = RenderState::new(
            gpu.device.as_ref(),
            gpu.queue.as_ref(),
            gpu.format,
            gpu.config.alpha_mode,
            gpu.config.width,
            gpu.config.height,
        );

        let sim = Simulation::new(config, width, height, browser_entropy());
        let navigator = window.navigator();
        let frames: Frames = Rc::new(RefCell::new(FrameLoop::new(
            sim,
            PerformanceTime::new(window),
            NavigatorGamepads::new(navigator),
        )));
        let pending_resize: PendingResize = Rc::new(Cell::new(None));

        setup_input_listeners(document, window, canvas, frames.clone(), pending_resize.clone())?;

        // Continuous redraw using requestAnimationFrame
        let f = RcCellCallback::new(window.clone(), move || {
            let mut frames = frames.borrow_mut();

            // Resizes are applied between frames
            if let Some((w, h)) = pending_resize.take() {
                frames.sim.resize(w, h);
                render_state.resize(gpu.device.as_ref(), &gpu.surface, w, h);
            }

            frames.tick();

            let instances = scene_instances(&frames.sim);
            render_state.update(gpu.device.as_ref(), gpu.queue.as_ref(), &frames.sim.camera_uniform(), &instances);
            render_state.draw_frame(gpu.device.as_ref(), gpu.queue.as_ref(), &gpu.surface);
        });
        f.start();

        Ok(())
    }

    fn setup_input_listeners(
        document: &Document,
        window: &Window,
        canvas: &HtmlCanvasElement,
        frames: Frames,
        pending_resize: PendingResize,
    ) -> Result<(), JsValue> {
        // Keyboard down
        {
            let frames = frames.clone();
            let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                let mut frames = frames.borrow_mut();
                let input = &mut frames.sim.input;
                // Keep arrow keys from scrolling the page
                if input.bindings().direction_for(&e.key()).is_some() {
                    e.prevent_default();
                }
                input.process_event(&keyboard_event_to_input(&e, true));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
            keydown.forget();
        }

        // Keyboard up
        {
            let frames = frames.clone();
            let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                frames.borrow_mut().sim.input.process_event(&keyboard_event_to_input(&e, false));
            }) as Box<dyn FnMut(KeyboardEvent)>);
            document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
            keyup.forget();
        }

        // Gamepads
        for (name, connected) in [("gamepadconnected", true), ("gamepaddisconnected", false)] {
            let frames = frames.clone();
            let handler = Closure::wrap(Box::new(move |e: GamepadEvent| {
                if let Some(event) = gamepad_event_to_input(&e, connected) {
                    frames.borrow_mut().sim.input.process_event(&event);
                }
            }) as Box<dyn FnMut(GamepadEvent)>);
            window.add_event_listener_with_callback(name, handler.as_ref().unchecked_ref())?;
            handler.forget();
        }

        // Focus loss - clear all keys
        {
            let frames = frames.clone();
            let blur = Closure::wrap(Box::new(move |_e: Event| {
                frames.borrow_mut().sim.input.process_event(&InputEvent::FocusLost);
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
            blur.forget();
        }

        // Visibility change - clear all keys when hidden
        {
            let frames = frames.clone();
            let doc = document.clone();
            let visibility = Closure::wrap(Box::new(move |_e: Event| {
                let visible = !doc.hidden();
                frames.borrow_mut().sim.input.process_event(&InputEvent::VisibilityChanged { visible });
            }) as Box<dyn FnMut(Event)>);
            document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
            visibility.forget();
        }

        // Resize - resize the canvas now, the camera and surface on the next frame
        {
            let win = window.clone();
            let canvas = canvas.clone();
            let resize = Closure::wrap(Box::new(move |_e: Event| {
                let (w, h) = viewport_size(&win);
                canvas.set_width(w);
                canvas.set_height(h);
                pending_resize.set(Some((w, h)));
            }) as Box<dyn FnMut(Event)>);
            window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
            resize.forget();
        }

        Ok(())
    }

    fn init_canvas(document: &Document, width: u32, height: u32) -> Result<HtmlCanvasElement, JsValue> {
        let body = document.body().ok_or(js_error("no body on document"))?;
        let canvas_el = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| js_error("failed to create canvas"))?;
        canvas_el.set_width(width);
        canvas_el.set_height(height);
        canvas_el.set_attribute("style", "display:block;width:100vw;height:100vh")?;
        body.append_child(&canvas_el)?;
        Ok(canvas_el)
    }

    /// Drawable size of the viewport in physical pixels.
    fn viewport_size(window: &Window) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let css = |v: Result<JsValue, JsValue>, fallback: f64| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
        let w = css(window.inner_width(), 800.0) * dpr;
        let h = css(window.inner_height(), 600.0) * dpr;
        (w.max(1.0) as u32, h.max(1.0) as u32)
    }

    /// Config overrides from the page URL, e.g. `?obstacles=60&seed=7`.
    fn query_lookup(window: &Window) -> impl Fn(&str) -> Option<String> {
        let params = window
            .location()
            .search()
            .ok()
            .and_then(|s| UrlSearchParams::new_with_str(&s).ok());
        move |key| params.as_ref().and_then(|p| p.get(key))
    }

    fn browser_entropy() -> u64 {
        (js_sys::Math::random() * (1u64 << 53) as f64) as u64
    }

    fn js_error<E: Into<String>>(msg: E) -> JsValue {
        JsValue::from_str(&msg.into())
    }

    struct RcCellCallback {
        inner: Rc<RefCell<Box<dyn FnMut()>>>,
        window: Window,
    }

    impl RcCellCallback {
        fn new(window: Window, f: impl FnMut() + 'static) -> Self {
            Self {
                inner: Rc::new(RefCell::new(Box::new(f))),
                window,
            }
        }

        fn start(self) {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                inner.borrow_mut().as_mut()();

                // Recursively schedule next frame
                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        tracing::error!("requestAnimationFrame failed: {e:?}");
                    }
                }
            }) as Box<dyn FnMut()>));

            if let Some(cb) = callback.borrow().as_ref() {
                if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!("requestAnimationFrame start failed: {e:?}");
                }
            }

            // Leak the closure to keep it alive
            std::mem::forget(callback);
        }
    }
}
