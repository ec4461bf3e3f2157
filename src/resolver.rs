//! Action evaluation against two generations of input state.
//!
//! For every binding the resolver reads the *current* and *previous* value
//! and derives:
//! - `val`: the current value,
//! - `delta`: current minus previous,
//! - `pressed`: `true` on the **release** edge (current is zero, previous was
//!   not).
//!
//! # Evaluation order
//! Every binding of every combination is evaluated in order and each one
//! overwrites the result of the one before. The value returned is therefore
//! the value of the last binding that could be evaluated, not an AND or OR
//! across bindings. Gamepad bindings are skipped (and do not overwrite) when
//! the player has no connected pad slot.
//!
//! # Mouse directions
//! `mouse_up`/`down`/`left`/`right` are derived from the movement delta of
//! the respective snapshot, divided by the mouse normaliser and clamped to
//! `[0, 1]`.

use crate::binding::{ActionMapping, InputBinding, MouseControl};
use crate::player::Player;
use crate::snapshot::{Direction, GamepadControl, InputState, MouseState};

/// Result of one action query. All fields are zero for unresolved actions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActionResult {
    pub pressed: bool,
    pub delta: f32,
    pub val: f32,
}

impl ActionResult {
    /// `pressed` as `1.0` or `0.0`, for hosts that sum or scale it.
    pub fn pressed_value(&self) -> f32 {
        if self.pressed {
            1.0
        } else {
            0.0
        }
    }

    fn edge(current: f32, previous: f32) -> Self {
        Self {
            pressed: current == 0.0 && previous != 0.0,
            delta: current - previous,
            val: current,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveOptions {
    /// On a release edge, zero the input in both generations so a repeated
    /// query in the same tick reports no press.
    pub clear: bool,
}

impl ResolveOptions {
    pub fn clear() -> Self {
        Self { clear: true }
    }
}

/// Value of a directional mouse pseudo-input for one snapshot.
///
/// A resting mouse reads `0` whatever the normaliser.
pub fn mouse_direction(mouse: &MouseState, direction: Direction, normalizer: f32) -> f32 {
    let scale = |magnitude: f32| {
        if magnitude == 0.0 {
            0.0
        } else {
            (magnitude / normalizer).min(1.0)
        }
    };
    match direction {
        Direction::Up if mouse.dy < 0.0 => scale(mouse.dy.abs()),
        Direction::Down if mouse.dy >= 0.0 => scale(mouse.dy),
        Direction::Left if mouse.dx < 0.0 => scale(mouse.dx.abs()),
        Direction::Right if mouse.dx >= 0.0 => scale(mouse.dx),
        _ => 0.0,
    }
}

fn mouse_value(mouse: &MouseState, control: MouseControl, normalizer: f32) -> f32 {
    if let Some(direction) = control.direction() {
        return mouse_direction(mouse, direction, normalizer);
    }
    if let Some(button) = control.button() {
        return mouse.button(button);
    }
    match control {
        MouseControl::MouseX => mouse.x,
        MouseControl::MouseY => mouse.y,
        MouseControl::MouseDx => mouse.dx,
        MouseControl::MouseDy => mouse.dy,
        _ => 0.0,
    }
}

/// Evaluates bindings for one player against a current/previous pair.
pub struct Resolver<'a> {
    pub current: &'a mut InputState,
    pub previous: &'a mut InputState,
    pub mouse_normalizer: f32,
}

impl Resolver<'_> {
    /// Evaluate every binding of `mapping` for `player`.
    pub fn resolve(
        &mut self,
        mapping: &ActionMapping,
        player: &Player,
        options: ResolveOptions,
    ) -> ActionResult {
        let mut result = ActionResult::default();
        for combination in &mapping.inputs {
            for input in &combination.inputs {
                if let Some(next) = self.evaluate(input, player, options) {
                    result = next;
                }
            }
        }
        result
    }

    /// `None` when the binding cannot be read for this player.
    fn evaluate(
        &mut self,
        input: &InputBinding,
        player: &Player,
        options: ResolveOptions,
    ) -> Option<ActionResult> {
        match input {
            InputBinding::Keyboard { code, .. } => {
                let result = ActionResult::edge(self.current.key(*code), self.previous.key(*code));
                if result.pressed && options.clear {
                    self.current.clear_key(*code);
                    self.previous.clear_key(*code);
                }
                Some(result)
            }
            InputBinding::Mouse { control, .. } => Some(ActionResult::edge(
                mouse_value(&self.current.mouse, *control, self.mouse_normalizer),
                mouse_value(&self.previous.mouse, *control, self.mouse_normalizer),
            )),
            InputBinding::GamepadButton { button, .. } => {
                self.evaluate_gamepad(player, GamepadControl::button(button.clone()), options)
            }
            InputBinding::GamepadAxis {
                axis, direction, ..
            } => {
                let read = if direction.is_vertical() && player.is_inverted(axis) {
                    direction.opposite()
                } else {
                    *direction
                };
                self.evaluate_gamepad(player, GamepadControl::axis(axis.clone(), read), options)
            }
        }
    }

    fn evaluate_gamepad(
        &mut self,
        player: &Player,
        control: GamepadControl,
        options: ResolveOptions,
    ) -> Option<ActionResult> {
        let slot = player.gamepad_index?;
        if !self.current.gamepad.contains_key(&slot) {
            return None;
        }
        let result = ActionResult::edge(
            self.current.gamepad_value(slot, &control),
            self.previous.gamepad_value(slot, &control),
        );
        if result.pressed && options.clear {
            self.current.clear_gamepad(slot, &control);
            self.previous.clear_gamepad(slot, &control);
        }
        Some(result)
    }
}
