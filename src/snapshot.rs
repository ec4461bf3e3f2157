//! Per-tick snapshot of every input the resolver can read.
//!
//! [`InputState`] is an **owned** value: the input system keeps two of them,
//! *current* and *previous*, and copies current into previous at the start of
//! every tick. Because the type owns all of its maps, that copy is a plain
//! `clone()` and the two generations never share anything.
//!
//! # Semantics
//! - Keyboard: key code → `0.0`/`1.0`. Codes never seen are absent and read as `0.0`.
//! - Mouse: one [`MouseState`] with button levels, normalised position and the
//!   latest movement delta.
//! - Gamepad: slot index → [`GamepadState`]. Values are keyed by logical
//!   [`GamepadControl`]s; raw indices are translated before they get here.
//!   Dual axes are stored as directional magnitudes, never as signed scalars.
//!
//! # Example
//! ```
//! use actionpad::snapshot::{AxisSubtype, Direction, GamepadControl, GamepadState};
//!
//! let mut pad = GamepadState::new("XBOX 360");
//! pad.write_axis("lStick", AxisSubtype::Y, -0.8, 0.35);
//! assert_eq!(pad.value(&GamepadControl::axis("lStick", Direction::Up)), 0.8);
//! assert_eq!(pad.value(&GamepadControl::axis("lStick", Direction::Down)), 0.0);
//! ```

use crate::event::MouseButton;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Which hardware axis of a stick a raw axis index drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSubtype {
    X,
    Y,
}

impl AxisSubtype {
    /// Direction pair for this axis as `(negative, positive)`.
    pub fn directions(self) -> (Direction, Direction) {
        match self {
            AxisSubtype::X => (Direction::Left, Direction::Right),
            AxisSubtype::Y => (Direction::Up, Direction::Down),
        }
    }
}

/// One of the four directional halves of a dual axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn subtype(self) -> AxisSubtype {
        match self {
            Direction::Up | Direction::Down => AxisSubtype::Y,
            Direction::Left | Direction::Right => AxisSubtype::X,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// `true` for the directions a per-axis inversion flag swaps.
    pub fn is_vertical(self) -> bool {
        self.subtype() == AxisSubtype::Y
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Logical key of a value in a [`GamepadState`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GamepadControl {
    Button(String),
    Axis { id: String, direction: Direction },
}

impl GamepadControl {
    pub fn button(id: impl Into<String>) -> Self {
        GamepadControl::Button(id.into())
    }

    pub fn axis(id: impl Into<String>, direction: Direction) -> Self {
        GamepadControl::Axis {
            id: id.into(),
            direction,
        }
    }
}

/// Pointer state as seen by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseState {
    pub left: f32,
    pub middle: f32,
    pub right: f32,
    /// Normalised position in `[-1, 1]`.
    pub x: f32,
    pub y: f32,
    /// Movement since the previous move event; zeroed once stale.
    pub dx: f32,
    pub dy: f32,
}

impl MouseState {
    pub fn button(&self, button: MouseButton) -> f32 {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Middle => self.middle,
            MouseButton::Right => self.right,
        }
    }

    pub fn set_button(&mut self, button: MouseButton, value: f32) {
        match button {
            MouseButton::Left => self.left = value,
            MouseButton::Middle => self.middle = value,
            MouseButton::Right => self.right = value,
        }
    }
}

/// Logical values of one connected pad for one tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GamepadState {
    /// Resolved layout name (the raw id for unknown pads).
    pub gpad_type: String,
    pub values: HashMap<GamepadControl, f32>,
}

impl GamepadState {
    pub fn new(gpad_type: impl Into<String>) -> Self {
        Self {
            gpad_type: gpad_type.into(),
            values: HashMap::new(),
        }
    }

    /// Value of a logical control (`0.0` if missing).
    pub fn value(&self, control: &GamepadControl) -> f32 {
        self.values.get(control).copied().unwrap_or(0.0)
    }

    pub fn write_button(&mut self, id: &str, value: f32) {
        self.values.insert(GamepadControl::button(id), value);
    }

    /// Split a raw axis reading into its two directional halves.
    ///
    /// Magnitudes at or below `threshold` become `0.0`. A negative reading
    /// lands on up/left, a positive one on down/right; the opposite half is
    /// always written as `0.0`.
    pub fn write_axis(&mut self, id: &str, subtype: AxisSubtype, raw: f32, threshold: f32) {
        let magnitude = if raw.abs() > threshold { raw.abs() } else { 0.0 };
        let (negative, positive) = subtype.directions();
        let (hit, other) = if raw <= 0.0 {
            (negative, positive)
        } else {
            (positive, negative)
        };
        self.values.insert(GamepadControl::axis(id, hit), magnitude);
        self.values.insert(GamepadControl::axis(id, other), 0.0);
    }
}

/// One generation of unified input state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputState {
    pub mouse: MouseState,
    pub keyboard: HashMap<u32, f32>,
    pub gamepad: BTreeMap<usize, GamepadState>,
}

impl InputState {
    /// Level of a key (`0.0` if never observed).
    #[inline]
    pub fn key(&self, code: u32) -> f32 {
        self.keyboard.get(&code).copied().unwrap_or(0.0)
    }

    /// Value of a logical control on a pad slot (`0.0` if either is missing).
    #[inline]
    pub fn gamepad_value(&self, slot: usize, control: &GamepadControl) -> f32 {
        self.gamepad
            .get(&slot)
            .map(|pad| pad.value(control))
            .unwrap_or(0.0)
    }

    /// Zero a key, keeping it present in the table.
    pub fn clear_key(&mut self, code: u32) {
        self.keyboard.insert(code, 0.0);
    }

    /// Zero a logical pad control if the slot exists.
    pub fn clear_gamepad(&mut self, slot: usize, control: &GamepadControl) {
        if let Some(pad) = self.gamepad.get_mut(&slot) {
            pad.values.insert(control.clone(), 0.0);
        }
    }
}
