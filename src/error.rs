//! Crate-wide error type.
//!
//! Per-tick paths ([`InputSystem::tick`](crate::manager::InputSystem::tick) and
//! [`InputSystem::action`](crate::manager::InputSystem::action)) never return
//! errors; misses there resolve to zero values. Everything that edits
//! configuration or touches the store reports failures through [`Error`].

use thiserror::Error;

/// Errors raised by configuration, persistence and editing operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No [`GamepadTypeProfile`](crate::profiles::GamepadTypeProfile) exists for this layout name.
    #[error("no layout is configured for gamepad type `{0}`")]
    UnknownGamepadType(String),

    #[error("gamepad type `{gpad_type}` has no control `{control}`")]
    UnknownControl { gpad_type: String, control: String },

    #[error("action map {0} does not exist")]
    UnknownActionMap(u32),

    #[error("action `{0}` is not part of this action map")]
    UnknownAction(String),

    #[error("input combination {0} does not exist")]
    UnknownInputCombination(u32),

    /// The highest id in use is already `u32::MAX`.
    #[error("no free {0} id left")]
    IdsExhausted(&'static str),

    #[error("player {0} is outside 1..={1}")]
    UnknownPlayer(u8, u8),

    /// A player's gamepad slot must hold a pad of the layout its action map uses.
    #[error("gamepad slot {slot} holds `{found}`, expected `{expected}`")]
    GamepadTypeMismatch {
        slot: usize,
        expected: String,
        found: String,
    },

    #[error("gamepad slot {0} is empty")]
    EmptyGamepadSlot(usize),

    #[error("player {0} has no action map with a gamepad layout")]
    NoGamepadLayout(u8),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
