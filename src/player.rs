//! Player records.
//!
//! A player is identified by a 1-based number and points at an
//! [`ActionMap`](crate::binding::ActionMap) by id. Gamepad input is read from
//! the pad slot the player is bound to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub number: u8,
    #[serde(default)]
    pub action_map_id: Option<u32>,
    /// Pad slot this player reads, if any.
    #[serde(default)]
    pub gamepad_index: Option<usize>,
    /// Dual axes whose vertical directions are swapped for this player.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub invert: BTreeMap<String, bool>,
}

impl Player {
    /// An unconfigured player.
    pub fn blank(number: u8) -> Self {
        Self {
            number,
            action_map_id: None,
            gamepad_index: None,
            invert: BTreeMap::new(),
        }
    }

    pub fn is_inverted(&self, axis: &str) -> bool {
        self.invert.get(axis).copied().unwrap_or(false)
    }

    /// Flip the inversion flag of `axis` and return the new value.
    pub fn toggle_invert(&mut self, axis: &str) -> bool {
        let flag = !self.is_inverted(axis);
        self.invert.insert(axis.to_string(), flag);
        flag
    }
}

/// One record per player number in `1..=max_players`, in order.
///
/// Stored records are reused (the last one wins on duplicate numbers),
/// missing numbers get a [`Player::blank`], numbers above `max_players` are
/// dropped.
pub fn normalize_roster(stored: &[Player], max_players: u8) -> Vec<Player> {
    (1..=max_players)
        .map(|number| {
            stored
                .iter()
                .rev()
                .find(|p| p.number == number)
                .cloned()
                .unwrap_or_else(|| Player::blank(number))
        })
        .collect()
}
