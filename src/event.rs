//! Raw keyboard and mouse events.
//!
//! Keyboard and mouse input is event driven: the host forwards what its window
//! system reports as [`InputKind`] values and the samplers turn those edges
//! into level state. Gamepads have no event model and are polled instead
//! (see [`GamepadSource`](crate::device::GamepadSource)).
//!
//! ## Value conventions
//! - **Keys:** identified by the platform key code (`u32`), state is `0.0` or `1.0`.
//! - **Mouse buttons:** `1..=3` at the platform level, mapped to [`MouseButton`].
//! - **Mouse movement:** either relative counts (pointer lock) or an absolute
//!   client position plus the viewport size, see [`MouseMove`].

use serde::{Deserialize, Serialize};

/// Physical mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Maps the platform button number (`1` left, `2` middle, `3` right).
    pub fn from_which(which: u8) -> Option<Self> {
        match which {
            1 => Some(MouseButton::Left),
            2 => Some(MouseButton::Middle),
            3 => Some(MouseButton::Right),
            _ => None,
        }
    }
}

/// One pointer movement report.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseMove {
    /// Relative movement counts, when the platform reports them (pointer lock).
    pub movement: (f32, f32),
    /// Pointer position in client coordinates.
    pub client: (f32, f32),
    /// Viewport size used to normalise `client` into `[-1, 1]`.
    pub viewport: (f32, f32),
}

impl MouseMove {
    /// A relative-only report, as produced under pointer lock.
    pub fn relative(dx: f32, dy: f32) -> Self {
        Self {
            movement: (dx, dy),
            ..Self::default()
        }
    }

    /// An absolute report with no relative movement.
    pub fn absolute(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            movement: (0.0, 0.0),
            client: (x, y),
            viewport: (width, height),
        }
    }

    /// `true` if the platform supplied non-zero relative movement.
    pub fn has_movement(&self) -> bool {
        self.movement.0 != 0.0 || self.movement.1 != 0.0
    }
}

/// Raw keyboard/mouse change reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputKind {
    KeyDown { code: u32 },
    KeyUp { code: u32 },
    MouseDown { button: MouseButton },
    MouseUp { button: MouseButton },
    MouseMoved(MouseMove),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_button_from_which() {
        assert_eq!(MouseButton::from_which(1), Some(MouseButton::Left));
        assert_eq!(MouseButton::from_which(2), Some(MouseButton::Middle));
        assert_eq!(MouseButton::from_which(3), Some(MouseButton::Right));
        assert_eq!(MouseButton::from_which(0), None);
        assert_eq!(MouseButton::from_which(4), None);
    }

    #[test]
    fn test_relative_move_has_movement() {
        assert!(MouseMove::relative(2.0, 0.0).has_movement());
        assert!(!MouseMove::absolute(10.0, 10.0, 100.0, 100.0).has_movement());
    }
}
