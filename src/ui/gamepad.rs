/// Gamepad input via gilrs, mapped onto the same intents as the keyboard.
///
/// Button mapping comes from the `[gamepad]` config section.
/// Default mapping:
///   A / Start             →  Activate focused button
///   B / Select            →  BACK
///   R1                    →  Next button
///   L1                    →  Previous button
///   D-pad / Left Stick    →  Next / previous button

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use super::input::Intent;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.5;

/// Logical button identifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    Start,
    Select,
}

const BTN_COUNT: usize = 8;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East  => Some(Btn::B),
            Button::West  => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start  => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Intent-to-button mapping (loaded from config).
struct ActionMap {
    confirm: Vec<Btn>,
    back: Vec<Btn>,
    next: Vec<Btn>,
    prev: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm: vec![Btn::A, Btn::Start],
            back:    vec![Btn::B, Btn::Select],
            next:    vec![Btn::R1],
            prev:    vec![Btn::L1],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Buttons pressed since the last `update`.
    just_pressed: [bool; BTN_COUNT],
    dpad_next: bool,
    dpad_prev: bool,

    /// Stick direction last frame: -1, 0 or 1. Edges become focus moves.
    stick_dir: i8,
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg_attr(not(feature = "gamepad"), allow(unused_mut))]
        let mut state = GamepadState::detached();

        #[cfg(feature = "gamepad")]
        match Gilrs::new() {
            Ok(g) => {
                state.connected = g.gamepads().next().is_some();
                state.gilrs = Some(g);
            }
            Err(e) => log::warn!("gamepad support unavailable: {e}"),
        }

        state
    }

    /// A tracker with no backend attached.
    fn detached() -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            just_pressed: [false; BTN_COUNT],
            dpad_next: false,
            dpad_prev: false,
            stick_dir: 0,
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected: false,
        }
    }

    /// Load button mapping from config. Empty or unrecognized lists keep
    /// the default for that intent.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let map = &mut self.action_map;
        for (target, names) in [
            (&mut map.confirm, &cfg.confirm),
            (&mut map.back, &cfg.back),
            (&mut map.next, &cfg.next_button),
            (&mut map.prev, &cfg.prev_button),
        ] {
            let parsed = parse_list(names);
            if !parsed.is_empty() {
                *target = parsed;
            }
        }
    }

    /// Clear last frame's edges and pull new events.
    pub fn update(&mut self) {
        self.just_pressed = [false; BTN_COUNT];
        self.dpad_next = false;
        self.dpad_prev = false;

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }

        self.update_stick();
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, btn: Button) {
        match btn {
            Button::DPadRight | Button::DPadDown => self.dpad_next = true,
            Button::DPadLeft | Button::DPadUp => self.dpad_prev = true,
            other => {
                if let Some(b) = Btn::from_gilrs(other) {
                    self.just_pressed[b as usize] = true;
                }
            }
        }
    }

    /// Turn the stick into a digital direction; only a change of direction
    /// moves focus. Right/down (negative y in gilrs) is forward.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn update_stick(&mut self) {
        let dir = if self.stick_x > STICK_DEADZONE || self.stick_y < -STICK_DEADZONE {
            1
        } else if self.stick_x < -STICK_DEADZONE || self.stick_y > STICK_DEADZONE {
            -1
        } else {
            0
        };
        if dir != self.stick_dir {
            match dir {
                1 => self.dpad_next = true,
                -1 => self.dpad_prev = true,
                _ => {}
            }
            self.stick_dir = dir;
        }
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.just_pressed[b as usize])
    }

    /// Intents from this frame's presses.
    pub fn intents(&self) -> Vec<Intent> {
        let mut out = Vec::new();
        let map = &self.action_map;
        if self.dpad_next || self.any_just_pressed(&map.next) {
            out.push(Intent::FocusNext);
        }
        if self.dpad_prev || self.any_just_pressed(&map.prev) {
            out.push(Intent::FocusPrev);
        }
        if self.any_just_pressed(&map.confirm) {
            out.push(Intent::Activate);
        }
        if self.any_just_pressed(&map.back) {
            out.push(Intent::Back);
        }
        out
    }
}
