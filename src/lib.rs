//! Device-agnostic input normalisation for games.
//!
//! Keyboard and mouse events from the host and polled gamepads are folded into
//! per-tick snapshots, and named actions are resolved against them through
//! user-editable action maps. See [`InputSystem`] for the host API.

pub mod backends;
pub mod binding;
pub mod calibration;
pub mod capture;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod keyboards;
pub mod manager;
pub mod menu;
pub mod metadata;
pub mod player;
pub mod poll;
pub mod profiles;
pub mod resolver;
pub mod sampler;
pub mod snapshot;
pub mod store;

pub use binding::{ActionMap, InputBinding, MouseControl};
pub use config::InputConfig;
pub use device::*;
pub use error::{Error, Result};
pub use event::*;
pub use manager::*;
pub use menu::{Menu, MenuEvent, View};
pub use player::Player;
pub use resolver::{ActionResult, ResolveOptions};
