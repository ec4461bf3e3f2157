//! Gamepad polling seam.
//!
//! Gamepads are not event driven: every tick the input system re-reads the
//! full raw state of every connected pad through a [`GamepadSource`]. Hosts
//! plug in whatever platform API they have; tests and demos use
//! [`VirtualGamepads`](crate::backends::virtual_input::VirtualGamepads).

/// Raw state of one connected gamepad, as reported by the platform.
///
/// Button and axis indices are hardware positions and only meaningful for
/// this physical layout. Translation to logical ids happens through a
/// [`GamepadBindingTable`](crate::calibration::GamepadBindingTable).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawGamepad {
    /// Platform slot the pad occupies.
    pub index: usize,
    /// Platform identifier string (usually carries vendor/product ids).
    pub id: String,
    /// Button values in `[0, 1]`.
    pub buttons: Vec<f32>,
    /// Axis values in `[-1, 1]`.
    pub axes: Vec<f32>,
}

impl RawGamepad {
    pub fn new(index: usize, id: impl Into<String>, buttons: usize, axes: usize) -> Self {
        Self {
            index,
            id: id.into(),
            buttons: vec![0.0; buttons],
            axes: vec![0.0; axes],
        }
    }
}

/// Something that can report the raw state of all connected gamepads.
pub trait GamepadSource {
    /// Returns the current raw state of every connected pad.
    fn poll(&mut self) -> Vec<RawGamepad>;

    /// Short label used in logs.
    fn name(&self) -> &str;
}

/// Source with nothing connected, for keyboard/mouse-only hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGamepads;

impl GamepadSource for NoGamepads {
    fn poll(&mut self) -> Vec<RawGamepad> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "none"
    }
}
