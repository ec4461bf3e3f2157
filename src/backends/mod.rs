//! Gamepad sources for `actionpad`.
//!
//! Implementations of [`GamepadSource`](crate::device::GamepadSource).
//! Platform gamepad APIs belong to the host; this crate only ships the
//! in-memory [`virtual_input::VirtualGamepads`] used by demos and tests.

pub mod virtual_input;

pub use virtual_input::VirtualGamepads;
