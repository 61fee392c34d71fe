//! Platform-agnostic input handling: latched keys, one tracked gamepad, and
//! resolution of both into a per-frame [`InputSnapshot`].

use std::collections::HashSet;

/// Logical driving directions keys are bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
}

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),

    GamepadConnected { index: u32, buttons: usize },
    GamepadDisconnected { index: u32 },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
}

/// Resolved driving input for one frame.
///
/// `forward` is negative when advancing (local -Z), positive when reversing.
/// `turn` is positive for a left (counter-clockwise) turn.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    pub forward: f32,
    pub turn: f32,
}

/// Last-known state of a gamepad as reported by the platform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamepadReading {
    pub axes: Vec<f32>,
    pub buttons: Vec<bool>,
}

/// Something that can report the current state of a gamepad by device index.
///
/// `None` means the device is no longer present.
pub trait GamepadSource {
    fn read(&self, index: u32) -> Option<GamepadReading>;
}

/// Platforms without gamepad support.
pub struct NoGamepads;

impl GamepadSource for NoGamepads {
    fn read(&self, _index: u32) -> Option<GamepadReading> {
        None
    }
}

pub const GAMEPAD_AXES: usize = 4;
const AXIS_TURN: usize = 0;
const AXIS_FORWARD: usize = 1;

/// Tracks a single active gamepad. The first device to connect wins.
#[derive(Debug, Clone)]
pub struct GamepadState {
    active: Option<u32>,
    axes: [f32; GAMEPAD_AXES],
    buttons: Vec<bool>,
    dead_zone: f32,
}

impl GamepadState {
    pub fn new(dead_zone: f32) -> Self {
        Self {
            active: None,
            axes: [0.0; GAMEPAD_AXES],
            buttons: Vec::new(),
            dead_zone,
        }
    }

    pub fn active(&self) -> Option<u32> {
        self.active
    }

    /// Dead-zone filtered axis value, 0 for unknown axes.
    pub fn axis(&self, i: usize) -> f32 {
        self.axes.get(i).copied().unwrap_or(0.0)
    }

    pub fn button(&self, i: usize) -> bool {
        self.buttons.get(i).copied().unwrap_or(false)
    }

    /// Returns true if the device became the active one.
    pub fn connect(&mut self, index: u32, buttons: usize) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(index);
        self.axes = [0.0; GAMEPAD_AXES];
        self.buttons = vec![false; buttons];
        tracing::info!(index, buttons, "gamepad connected");
        true
    }

    /// Returns true if the active device was dropped.
    pub fn disconnect(&mut self, index: u32) -> bool {
        if self.active != Some(index) {
            return false;
        }
        self.active = None;
        self.axes = [0.0; GAMEPAD_AXES];
        self.buttons.iter_mut().for_each(|b| *b = false);
        tracing::info!(index, "gamepad disconnected");
        true
    }

    /// Refresh axes and buttons from the active device.
    ///
    /// A device that has vanished from the source is treated as disconnected.
    pub fn poll(&mut self, source: &dyn GamepadSource) {
        let Some(index) = self.active else { return };
        match source.read(index) {
            Some(reading) => {
                self.axes = [0.0; GAMEPAD_AXES];
                for (slot, value) in self.axes.iter_mut().zip(reading.axes.iter()) {
                    *slot = apply_dead_zone(*value, self.dead_zone);
                }
                self.buttons = reading.buttons;
            }
            None => {
                tracing::info!(index, "active gamepad missing from device list");
                self.disconnect(index);
            }
        }
    }

    fn exceeds_dead_zone(&self, value: f32) -> bool {
        value.abs() > self.dead_zone
    }
}

pub fn apply_dead_zone(value: f32, dead_zone: f32) -> f32 {
    if !value.is_finite() || value.abs() < dead_zone {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// Key mapping configuration
#[derive(Clone)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub back: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let keys = |ks: &[&str]| ks.iter().map(|k| k.to_string()).collect();
        Self {
            forward: keys(&["w", "ArrowUp"]),
            back: keys(&["s", "ArrowDown"]),
            left: keys(&["a", "ArrowLeft"]),
            right: keys(&["d", "ArrowRight"]),
        }
    }
}

impl KeyBindings {
    /// Case-insensitive lookup of the direction bound to a key name.
    pub fn direction_for(&self, key: &str) -> Option<Direction> {
        let hit = |ks: &[String]| ks.iter().any(|k| k.eq_ignore_ascii_case(key));
        if hit(&self.forward) {
            Some(Direction::Forward)
        } else if hit(&self.back) {
            Some(Direction::Back)
        } else if hit(&self.left) {
            Some(Direction::Left)
        } else if hit(&self.right) {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

/// Unified input state
pub struct InputState {
    pub pressed: HashSet<Direction>,
    pub gamepad: GamepadState,
    bindings: KeyBindings,
}

impl InputState {
    pub fn new(dead_zone: f32) -> Self {
        Self::with_bindings(dead_zone, KeyBindings::default())
    }

    pub fn with_bindings(dead_zone: f32, bindings: KeyBindings) -> Self {
        Self {
            pressed: HashSet::new(),
            gamepad: GamepadState::new(dead_zone),
            bindings,
        }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                if let Some(dir) = self.bindings.direction_for(key) {
                    self.pressed.insert(dir);
                }
            }
            InputEvent::KeyUp(key) => {
                if let Some(dir) = self.bindings.direction_for(key) {
                    self.pressed.remove(&dir);
                }
            }
            InputEvent::GamepadConnected { index, buttons } => {
                self.gamepad.connect(*index, *buttons);
            }
            InputEvent::GamepadDisconnected { index } => {
                self.gamepad.disconnect(*index);
            }
            InputEvent::FocusLost => self.clear_keys(),
            InputEvent::VisibilityChanged { visible } => {
                if !visible {
                    self.clear_keys();
                }
            }
        }
    }

    pub fn is_pressed(&self, dir: Direction) -> bool {
        self.pressed.contains(&dir)
    }

    pub fn clear_keys(&mut self) {
        self.pressed.clear();
    }

    /// Resolve keys and gamepad into this frame's driving input.
    ///
    /// Opposite keys add up per axis. A gamepad axis outside the dead zone
    /// replaces the keyboard value for its axis; reverse is scaled by
    /// `reverse_factor` for both devices.
    ///
    /// Sign convention: advancing is negative, reversing positive. A pulled-back
    /// stick yields `+|value| * reverse_factor`, the same as the back key.
    pub fn snapshot(&self, reverse_factor: f32) -> InputSnapshot {
        let mut forward = 0.0;
        let mut turn = 0.0;

        if self.is_pressed(Direction::Forward) {
            forward -= 1.0;
        }
        if self.is_pressed(Direction::Back) {
            forward += reverse_factor;
        }
        if self.is_pressed(Direction::Left) {
            turn += 1.0;
        }
        if self.is_pressed(Direction::Right) {
            turn -= 1.0;
        }

        let pad = &self.gamepad;
        let axis_x = pad.axis(AXIS_TURN);
        if pad.exceeds_dead_zone(axis_x) {
            turn = -axis_x;
        }

        // Stick up reports negative values
        let push = -pad.axis(AXIS_FORWARD);
        if pad.exceeds_dead_zone(push) {
            forward = if push > 0.0 { -push } else { -push * reverse_factor };
        }

        InputSnapshot { forward, turn }
    }
}

pub mod wasm {
    use super::*;
    use wasm_bindgen::JsCast;
    use web_sys::{Gamepad, GamepadButton, GamepadEvent, KeyboardEvent, Navigator};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn gamepad_event_to_input(e: &GamepadEvent, connected: bool) -> Option<InputEvent> {
        let pad = e.gamepad()?;
        let index = pad.index();
        Some(if connected {
            InputEvent::GamepadConnected { index, buttons: pad.buttons().length() as usize }
        } else {
            InputEvent::GamepadDisconnected { index }
        })
    }

    /// Reads `navigator.getGamepads()` on every poll.
    pub struct NavigatorGamepads {
        navigator: Navigator,
    }

    impl NavigatorGamepads {
        pub fn new(navigator: Navigator) -> Self {
            Self { navigator }
        }
    }

    impl GamepadSource for NavigatorGamepads {
        fn read(&self, index: u32) -> Option<GamepadReading> {
            let pads = self.navigator.get_gamepads().ok()?;
            let pad: Gamepad = pads.get(index).dyn_into().ok()?;
            if !pad.connected() {
                return None;
            }
            let axes = pad
                .axes()
                .iter()
                .map(|v| v.as_f64().unwrap_or(0.0) as f32)
                .collect();
            let buttons = pad
                .buttons()
                .iter()
                .map(|b| b.dyn_into::<GamepadButton>().map(|b| b.pressed()).unwrap_or(false))
                .collect();
            Some(GamepadReading { axes, buttons })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPad(Option<GamepadReading>);

    impl GamepadSource for FixedPad {
        fn read(&self, _index: u32) -> Option<GamepadReading> {
            self.0.clone()
        }
    }

    fn pad_with_axes(axes: &[f32]) -> FixedPad {
        FixedPad(Some(GamepadReading { axes: axes.to_vec(), buttons: vec![true, false] }))
    }

    fn key_down(input: &mut InputState, key: &str) {
        input.process_event(&InputEvent::KeyDown(key.to_string()));
    }

    #[test]
    fn test_forward_and_back_keys() {
        let mut input = InputState::new(0.15);
        key_down(&mut input, "w");
        assert_eq!(input.snapshot(0.6).forward, -1.0);

        input.clear_keys();
        key_down(&mut input, "ArrowDown");
        assert_eq!(input.snapshot(0.6).forward, 0.6);
    }

    #[test]
    fn test_opposite_keys_add_up() {
        let mut input = InputState::new(0.15);
        key_down(&mut input, "W");
        key_down(&mut input, "s");
        key_down(&mut input, "a");
        key_down(&mut input, "d");
        let snap = input.snapshot(0.6);
        assert!((snap.forward - -0.4).abs() < 1e-6);
        assert_eq!(snap.turn, 0.0);
    }

    #[test]
    fn test_key_events_idempotent_and_case_insensitive() {
        let mut input = InputState::new(0.15);
        key_down(&mut input, "A");
        key_down(&mut input, "a");
        key_down(&mut input, "ArrowLeft");
        assert_eq!(input.pressed.len(), 1);
        assert_eq!(input.snapshot(0.6).turn, 1.0);

        input.process_event(&InputEvent::KeyUp("a".to_string()));
        input.process_event(&InputEvent::KeyUp("a".to_string()));
        assert!(input.pressed.is_empty());

        key_down(&mut input, "q");
        assert!(input.pressed.is_empty());
    }

    #[test]
    fn test_gamepad_turn_overrides_keyboard() {
        let mut input = InputState::new(0.15);
        input.process_event(&InputEvent::GamepadConnected { index: 0, buttons: 2 });
        key_down(&mut input, "a");
        input.gamepad.poll(&pad_with_axes(&[0.5, 0.0]));
        assert_eq!(input.snapshot(0.6).turn, -0.5);
    }

    #[test]
    fn test_axis_below_dead_zone_falls_back_to_keyboard() {
        let mut input = InputState::new(0.15);
        input.process_event(&InputEvent::GamepadConnected { index: 0, buttons: 2 });
        key_down(&mut input, "d");
        key_down(&mut input, "w");
        input.gamepad.poll(&pad_with_axes(&[0.10, -0.10]));
        assert_eq!(input.gamepad.axis(0), 0.0);
        assert_eq!(input.gamepad.axis(1), 0.0);
        let snap = input.snapshot(0.6);
        assert_eq!(snap.turn, -1.0);
        assert_eq!(snap.forward, -1.0);
    }

    #[test]
    fn test_gamepad_forward_axis() {
        let mut input = InputState::new(0.15);
        input.process_event(&InputEvent::GamepadConnected { index: 0, buttons: 2 });

        // Stick pushed up
        input.gamepad.poll(&pad_with_axes(&[0.0, -0.8]));
        assert!((input.snapshot(0.6).forward - -0.8).abs() < 1e-6);

        // Stick pulled back, reverse scaled down
        input.gamepad.poll(&pad_with_axes(&[0.0, 0.5]));
        assert!((input.snapshot(0.6).forward - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_first_connected_gamepad_wins() {
        let mut pad = GamepadState::new(0.15);
        assert!(pad.connect(2, 4));
        assert!(!pad.connect(0, 4));
        assert_eq!(pad.active(), Some(2));
        assert!(!pad.disconnect(0));
        assert_eq!(pad.active(), Some(2));
    }

    #[test]
    fn test_disconnect_resets_to_neutral() {
        let mut input = InputState::new(0.15);
        input.process_event(&InputEvent::GamepadConnected { index: 1, buttons: 2 });
        input.gamepad.poll(&pad_with_axes(&[0.9, -0.9]));
        assert!(input.gamepad.button(0));

        input.process_event(&InputEvent::GamepadDisconnected { index: 1 });
        assert_eq!(input.gamepad.active(), None);
        assert_eq!(input.gamepad.axis(0), 0.0);
        assert_eq!(input.gamepad.axis(1), 0.0);
        assert!(!input.gamepad.button(0));

        key_down(&mut input, "d");
        assert_eq!(input.snapshot(0.6), InputSnapshot { forward: 0.0, turn: -1.0 });
    }

    #[test]
    fn test_missing_gamepad_is_implicit_disconnect() {
        let mut pad = GamepadState::new(0.15);
        pad.connect(0, 1);
        pad.poll(&pad_with_axes(&[0.7, 0.7]));
        assert_eq!(pad.axis(0), 0.7);

        pad.poll(&FixedPad(None));
        assert_eq!(pad.active(), None);
        assert_eq!(pad.axis(0), 0.0);

        // A new device may take over afterwards
        assert!(pad.connect(3, 1));
    }

    #[test]
    fn test_focus_loss_clears_keys() {
        let mut input = InputState::new(0.15);
        key_down(&mut input, "w");
        input.process_event(&InputEvent::VisibilityChanged { visible: true });
        assert!(input.is_pressed(Direction::Forward));
        input.process_event(&InputEvent::FocusLost);
        assert!(!input.is_pressed(Direction::Forward));
    }
}
