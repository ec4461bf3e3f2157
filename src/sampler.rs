//! Level-state samplers for event-driven devices.
//!
//! Keyboard and mouse events are edges; the resolver needs levels. The
//! samplers hold that level state between events and hand a copy to the
//! snapshot engine once per tick.

use crate::event::{MouseButton, MouseMove};
use crate::snapshot::MouseState;
use std::collections::HashMap;

/// Persistent key code → `0.0`/`1.0` table.
///
/// Only a key-up resets a key, so a held key reads `1.0` on every tick.
#[derive(Debug, Clone, Default)]
pub struct KeyboardSampler {
    keys: HashMap<u32, f32>,
}

impl KeyboardSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: u32) {
        self.keys.insert(code, 1.0);
    }

    pub fn key_up(&mut self, code: u32) {
        self.keys.insert(code, 0.0);
    }

    pub fn is_down(&self, code: u32) -> bool {
        self.keys.get(&code).copied().unwrap_or(0.0) != 0.0
    }

    /// Codes currently held down.
    pub fn held(&self) -> impl Iterator<Item = u32> + '_ {
        self.keys
            .iter()
            .filter(|(_, v)| **v != 0.0)
            .map(|(code, _)| *code)
    }

    /// Independent copy of the table for this tick's snapshot.
    pub fn snapshot(&self) -> HashMap<u32, f32> {
        self.keys.clone()
    }
}

/// Mouse button levels plus position/delta tracking.
#[derive(Debug, Clone, Default)]
pub struct MouseSampler {
    state: MouseState,
    last_position: Option<(f32, f32)>,
    idle_ticks: u32,
}

impl MouseSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button_down(&mut self, button: MouseButton) {
        self.state.set_button(button, 1.0);
    }

    pub fn button_up(&mut self, button: MouseButton) {
        self.state.set_button(button, 0.0);
    }

    /// Record one move report.
    ///
    /// Relative movement is used as the delta when the platform supplies it.
    /// Otherwise the client position is normalised to `[-1, 1]` and the delta
    /// is taken against the previous normalised position (zero on the first
    /// report). A zero-sized viewport leaves position and delta untouched.
    pub fn on_move(&mut self, report: &MouseMove) {
        self.idle_ticks = 0;

        if report.has_movement() {
            self.state.dx = report.movement.0;
            self.state.dy = report.movement.1;
            return;
        }

        let (width, height) = report.viewport;
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let x = (report.client.0 / width) * 2.0 - 1.0;
        let y = (report.client.1 / height) * 2.0 - 1.0;
        let (last_x, last_y) = self.last_position.unwrap_or((x, y));

        self.state.dx = x - last_x;
        self.state.dy = y - last_y;
        self.state.x = x;
        self.state.y = y;
        self.last_position = Some((x, y));
    }

    /// Advance the staleness counter by one tick.
    ///
    /// Deltas survive exactly one tick after the last move event.
    pub fn advance(&mut self) {
        self.idle_ticks = self.idle_ticks.saturating_add(1);
        if self.idle_ticks > 1 {
            self.state.dx = 0.0;
            self.state.dy = 0.0;
        }
    }

    pub fn state(&self) -> MouseState {
        self.state
    }
}
