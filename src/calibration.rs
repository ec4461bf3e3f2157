//! Raw index ↔ logical control translation for one gamepad layout.
//!
//! A [`GamepadBindingTable`] is created blank for a
//! [`GamepadTypeProfile`](crate::profiles::GamepadTypeProfile) and filled in by
//! calibration. It is kept in both directions:
//! - `logical_to_raw` answers "which raw index did we assign to `A`?" while
//!   calibrating,
//! - `raw_to_logical` is read every tick to translate a polled pad.
//!
//! A raw axis index is always bound to an axis *and* a subtype (`x` or `y`),
//! so it expands to two directional values at sampling time.

use crate::device::RawGamepad;
use crate::profiles::GamepadTypeProfile;
use crate::snapshot::{AxisSubtype, Direction, GamepadControl, GamepadState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw axis indices assigned to one dual axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisPair {
    pub x: Option<usize>,
    pub y: Option<usize>,
}

impl AxisPair {
    pub fn get(&self, subtype: AxisSubtype) -> Option<usize> {
        match subtype {
            AxisSubtype::X => self.x,
            AxisSubtype::Y => self.y,
        }
    }

    fn set(&mut self, subtype: AxisSubtype, raw: Option<usize>) {
        match subtype {
            AxisSubtype::X => self.x = raw,
            AxisSubtype::Y => self.y = raw,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicalToRaw {
    pub button: BTreeMap<String, Option<usize>>,
    pub axis_dual: BTreeMap<String, AxisPair>,
}

/// Logical side of a raw axis index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisTarget {
    pub id: String,
    pub subtype: AxisSubtype,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawToLogical {
    pub buttons: BTreeMap<usize, String>,
    pub axes: BTreeMap<usize, AxisTarget>,
}

/// Persisted translation table for one layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GamepadBindingTable {
    pub gpad_type: String,
    pub logical_to_raw: LogicalToRaw,
    pub raw_to_logical: RawToLogical,
}

impl GamepadBindingTable {
    /// Every button and dual axis of `profile`, none assigned yet.
    pub fn blank(profile: &GamepadTypeProfile) -> Self {
        let button = profile
            .button
            .iter()
            .map(|c| (c.id.clone(), None))
            .collect();
        let axis_dual = profile
            .axis_dual
            .iter()
            .map(|c| (c.id.clone(), AxisPair::default()))
            .collect();
        Self {
            gpad_type: profile.gpad_type.clone(),
            logical_to_raw: LogicalToRaw { button, axis_dual },
            raw_to_logical: RawToLogical::default(),
        }
    }

    pub fn button_for_raw(&self, raw: usize) -> Option<&str> {
        self.raw_to_logical.buttons.get(&raw).map(String::as_str)
    }

    pub fn axis_for_raw(&self, raw: usize) -> Option<&AxisTarget> {
        self.raw_to_logical.axes.get(&raw)
    }

    pub fn raw_for_button(&self, id: &str) -> Option<usize> {
        self.logical_to_raw.button.get(id).copied().flatten()
    }

    pub fn raw_for_axis(&self, id: &str, subtype: AxisSubtype) -> Option<usize> {
        self.logical_to_raw
            .axis_dual
            .get(id)
            .and_then(|pair| pair.get(subtype))
    }

    /// Logical control driven by raw button `raw`.
    pub fn control_for_button(&self, raw: usize) -> Option<GamepadControl> {
        self.button_for_raw(raw).map(GamepadControl::button)
    }

    /// Logical direction driven by raw axis `raw` deflected to the given sign.
    pub fn control_for_axis(&self, raw: usize, positive: bool) -> Option<GamepadControl> {
        let target = self.axis_for_raw(raw)?;
        let (negative_dir, positive_dir) = target.subtype.directions();
        let direction = if positive { positive_dir } else { negative_dir };
        Some(GamepadControl::axis(target.id.clone(), direction))
    }

    /// Bind raw button `raw` to logical button `id`.
    ///
    /// Any previous owner of `raw` and any previous raw index of `id` are
    /// unbound first, so both directions stay consistent.
    pub fn record_button(&mut self, raw: usize, id: &str) {
        if let Some(old) = self.raw_for_button(id) {
            self.raw_to_logical.buttons.remove(&old);
        }
        if let Some(previous_owner) = self.raw_to_logical.buttons.remove(&raw) {
            self.logical_to_raw.button.insert(previous_owner, None);
        }
        self.logical_to_raw.button.insert(id.to_string(), Some(raw));
        self.raw_to_logical.buttons.insert(raw, id.to_string());
    }

    /// Bind raw axis `raw` to the `subtype` half of dual axis `id`.
    pub fn record_axis(&mut self, raw: usize, id: &str, subtype: AxisSubtype) {
        if let Some(old) = self.raw_for_axis(id, subtype) {
            self.raw_to_logical.axes.remove(&old);
        }
        if let Some(previous_owner) = self.raw_to_logical.axes.remove(&raw) {
            if let Some(pair) = self.logical_to_raw.axis_dual.get_mut(&previous_owner.id) {
                pair.set(previous_owner.subtype, None);
            }
        }
        self.logical_to_raw
            .axis_dual
            .entry(id.to_string())
            .or_default()
            .set(subtype, Some(raw));
        self.raw_to_logical.axes.insert(
            raw,
            AxisTarget {
                id: id.to_string(),
                subtype,
            },
        );
    }

    /// Translate one polled pad into logical values.
    ///
    /// Raw buttons and axes without a logical counterpart are skipped.
    pub fn apply(&self, raw: &RawGamepad, threshold: f32, state: &mut GamepadState) {
        for (index, value) in raw.buttons.iter().enumerate() {
            if let Some(id) = self.button_for_raw(index) {
                state.write_button(id, *value);
            }
        }
        for (index, value) in raw.axes.iter().enumerate() {
            if let Some(target) = self.axis_for_raw(index) {
                state.write_axis(&target.id, target.subtype, *value, threshold);
            }
        }
    }
}

/// Calibration order for a layout: every button, then each dual axis as
/// `up`, `down`, `left`, `right`.
pub fn calibration_targets(profile: &GamepadTypeProfile) -> Vec<GamepadControl> {
    let buttons = profile
        .button
        .iter()
        .map(|c| GamepadControl::button(c.id.clone()));
    let axes = profile.axis_dual.iter().flat_map(|c| {
        Direction::ALL
            .iter()
            .map(move |d| GamepadControl::axis(c.id.clone(), *d))
    });
    buttons.chain(axes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::builtin_profiles;

    fn xbox() -> GamepadTypeProfile {
        builtin_profiles().remove(0)
    }

    #[test]
    fn test_blank_table_lists_every_control_unassigned() {
        let table = GamepadBindingTable::blank(&xbox());
        assert_eq!(table.gpad_type, "XBOX 360");
        assert_eq!(table.logical_to_raw.button.len(), 17);
        assert!(table.logical_to_raw.button.values().all(Option::is_none));
        assert_eq!(
            table.logical_to_raw.axis_dual.get("lStick"),
            Some(&AxisPair::default())
        );
        assert!(table.raw_to_logical.buttons.is_empty());
        assert!(table.raw_to_logical.axes.is_empty());
    }

    #[test]
    fn test_record_button_keeps_both_directions_consistent() {
        let mut table = GamepadBindingTable::blank(&xbox());
        table.record_button(0, "A");
        table.record_button(1, "B");
        // Re-assign raw 0 to B: A loses it, B's old raw index is freed.
        table.record_button(0, "B");

        assert_eq!(table.raw_for_button("A"), None);
        assert_eq!(table.raw_for_button("B"), Some(0));
        assert_eq!(table.button_for_raw(0), Some("B"));
        assert_eq!(table.button_for_raw(1), None);
    }

    #[test]
    fn test_record_axis_and_apply() {
        let mut table = GamepadBindingTable::blank(&xbox());
        table.record_axis(1, "lStick", AxisSubtype::Y);
        table.record_button(0, "A");

        let raw = RawGamepad {
            index: 0,
            id: "xbox".into(),
            buttons: vec![1.0, 1.0],
            axes: vec![0.9, -0.5],
        };
        let mut state = GamepadState::new("XBOX 360");
        table.apply(&raw, 0.35, &mut state);

        assert_eq!(state.value(&GamepadControl::button("A")), 1.0);
        assert_eq!(state.value(&GamepadControl::axis("lStick", Direction::Up)), 0.5);
        assert_eq!(state.value(&GamepadControl::axis("lStick", Direction::Down)), 0.0);
        // Unmapped raw button 1 and raw axis 0 are not represented.
        assert_eq!(state.values.len(), 3);

        assert_eq!(table.control_for_button(0), Some(GamepadControl::button("A")));
        assert_eq!(table.control_for_button(1), None);
        assert_eq!(
            table.control_for_axis(1, true),
            Some(GamepadControl::axis("lStick", Direction::Down))
        );
        assert_eq!(table.control_for_axis(0, true), None);
    }

    #[test]
    fn test_table_survives_json() {
        let mut table = GamepadBindingTable::blank(&xbox());
        table.record_axis(3, "rStick", AxisSubtype::X);
        table.record_button(7, "start");

        let json = serde_json::to_string(&table).unwrap();
        let back: GamepadBindingTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_calibration_targets_order() {
        let targets = calibration_targets(&xbox());
        assert_eq!(targets.len(), 17 + 2 * 4);
        assert_eq!(targets[0], GamepadControl::button("dpadUp"));
        assert_eq!(targets[17], GamepadControl::axis("lStick", Direction::Up));
        assert_eq!(targets[20], GamepadControl::axis("lStick", Direction::Right));
        assert_eq!(targets[24], GamepadControl::axis("rStick", Direction::Right));
    }
}
