//! Previously seen gamepad units.
//!
//! [`KnownGamepad`] is a lightweight, cloneable description of a physical pad
//! the system has met at least once. The list is persisted so the menu can
//! show units (and their layout) across sessions, even while unplugged.
//!
//! # Conventions
//! - `id` is the raw platform id string and identifies the unit.
//! - `gpad_type` is the resolved layout name, or the raw id for unknown pads.
//! - `display_name` is the layout's display name, or `"Unknown gamepad"`.

use crate::device::RawGamepad;
use crate::profiles::GamepadTypeResolver;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownGamepad {
    pub id: String,
    pub gpad_type: String,
    pub display_name: String,
}

/// One entry of the gamepad listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamepadListing {
    pub gamepad: KnownGamepad,
    /// Slot of the pad if it is connected right now.
    pub slot: Option<usize>,
}

impl GamepadListing {
    pub fn is_active(&self) -> bool {
        self.slot.is_some()
    }
}

/// Merge stored units with connected ones.
///
/// Stored units keep their order; connected units not seen before are
/// appended. Returns the listing and whether `known` gained new units.
pub fn merge_known(
    known: &mut Vec<KnownGamepad>,
    connected: &[RawGamepad],
    resolver: &mut GamepadTypeResolver,
) -> (Vec<GamepadListing>, bool) {
    let mut added = false;
    for pad in connected {
        if known.iter().any(|k| k.id == pad.id) {
            continue;
        }
        let resolved = resolver.resolve(&pad.id);
        tracing::info!(id = %pad.id, gpad_type = %resolved.gpad_type, "new gamepad unit");
        known.push(KnownGamepad {
            id: pad.id.clone(),
            gpad_type: resolved.gpad_type,
            display_name: resolved.display_name,
        });
        added = true;
    }

    let listing = known
        .iter()
        .map(|k| GamepadListing {
            gamepad: k.clone(),
            slot: connected.iter().find(|p| p.id == k.id).map(|p| p.index),
        })
        .collect();
    (listing, added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_appends_new_units_and_flags_active() {
        let mut resolver = GamepadTypeResolver::with_builtin();
        let mut known = vec![KnownGamepad {
            id: "54c-268-PLAYSTATION(R)3 Controller".into(),
            gpad_type: "Playstation 3".into(),
            display_name: "Playstation 3 Controller".into(),
        }];
        let connected = vec![RawGamepad::new(1, "45e-28e-Xbox 360 Wired Controller", 4, 2)];

        let (listing, added) = merge_known(&mut known, &connected, &mut resolver);
        assert!(added);
        assert_eq!(known.len(), 2);
        assert_eq!(known[1].gpad_type, "XBOX 360");
        assert!(!listing[0].is_active());
        assert_eq!(listing[1].slot, Some(1));

        let (_, added) = merge_known(&mut known, &connected, &mut resolver);
        assert!(!added);
    }
}
