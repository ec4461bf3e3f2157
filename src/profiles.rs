//! Physical gamepad layouts and raw-id resolution.
//!
//! A [`GamepadTypeProfile`] is static configuration: a display name, the id
//! substrings that recognise the layout, and the logical controls it offers.
//! Logical controls come in two kinds:
//! - **buttons**: a single value in `[0, 1]` (triggers included),
//! - **dual axes**: a 2D stick, exposed as four directional inputs
//!   (`up`/`down`/`left`/`right`).
//!
//! [`GamepadTypeResolver`] turns a platform id string into a layout name. The
//! first profile with a fully matching id group wins; there is no scoring.
//!
//! ```
//! use actionpad::profiles::GamepadTypeResolver;
//!
//! let mut resolver = GamepadTypeResolver::with_builtin();
//! let pad = resolver.resolve("45e-28e-Xbox 360 Wired Controller");
//! assert_eq!(pad.gpad_type, "XBOX 360");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display name given to pads no profile recognises.
pub const UNKNOWN_GAMEPAD: &str = "Unknown gamepad";

/// Presentation metadata for one logical control.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlInfo {
    /// Human-readable name (`"left bumper"`). Falls back to the control id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Short label printed on the control (`"LB"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Which face of the pad the control sits on; `front` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<String>,
    /// Horizontal position on the face, in percent.
    pub x: f32,
    /// Vertical position on the face, in percent.
    pub y: f32,
}

/// A logical control id with its metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutControl {
    pub id: String,
    #[serde(flatten)]
    pub info: ControlInfo,
}

/// Static description of one physical gamepad layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GamepadTypeProfile {
    /// Layout name, used as the key of binding tables and action maps.
    pub gpad_type: String,
    pub display_name: String,
    /// A raw id matches iff it contains every substring of at least one group.
    pub id_matches: Vec<Vec<String>>,
    /// Logical buttons, in calibration order.
    pub button: Vec<LayoutControl>,
    /// Logical dual axes, in calibration order.
    pub axis_dual: Vec<LayoutControl>,
}

impl GamepadTypeProfile {
    /// `true` if every substring of some id group occurs in `raw_id`.
    pub fn matches(&self, raw_id: &str) -> bool {
        self.id_matches
            .iter()
            .any(|group| group.iter().all(|needle| raw_id.contains(needle.as_str())))
    }

    pub fn button(&self, id: &str) -> Option<&ControlInfo> {
        self.button.iter().find(|c| c.id == id).map(|c| &c.info)
    }

    pub fn axis(&self, id: &str) -> Option<&ControlInfo> {
        self.axis_dual.iter().find(|c| c.id == id).map(|c| &c.info)
    }

    /// Display name of a button, falling back to its id.
    pub fn button_name(&self, id: &str) -> String {
        self.button(id)
            .and_then(|info| info.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Display name of a dual axis, falling back to its id.
    pub fn axis_name(&self, id: &str) -> String {
        self.axis(id)
            .and_then(|info| info.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

/// Result of resolving a raw gamepad id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedType {
    /// Layout name, or the raw id itself for unknown pads.
    pub gpad_type: String,
    pub display_name: String,
    /// `false` when no profile matched.
    pub known: bool,
}

/// Maps raw gamepad ids to layouts, caching each id after its first lookup.
#[derive(Clone, Debug, Default)]
pub struct GamepadTypeResolver {
    profiles: Vec<GamepadTypeProfile>,
    cache: HashMap<String, ResolvedType>,
}

impl GamepadTypeResolver {
    pub fn new(profiles: Vec<GamepadTypeProfile>) -> Self {
        Self {
            profiles,
            cache: HashMap::new(),
        }
    }

    /// Resolver over [`builtin_profiles`].
    pub fn with_builtin() -> Self {
        Self::new(builtin_profiles())
    }

    /// Resolve `raw_id`, reusing the cached answer for ids seen before.
    pub fn resolve(&mut self, raw_id: &str) -> ResolvedType {
        if let Some(hit) = self.cache.get(raw_id) {
            return hit.clone();
        }
        let resolved = self.match_id(raw_id);
        if resolved.known {
            tracing::debug!(raw_id, gpad_type = %resolved.gpad_type, "resolved gamepad type");
        } else {
            tracing::warn!(raw_id, "no layout matches this gamepad; it stays unmapped");
        }
        self.cache.insert(raw_id.to_string(), resolved.clone());
        resolved
    }

    /// Uncached lookup: first matching profile in declaration order.
    pub fn match_id(&self, raw_id: &str) -> ResolvedType {
        self.profiles
            .iter()
            .find(|profile| profile.matches(raw_id))
            .map(|profile| ResolvedType {
                gpad_type: profile.gpad_type.clone(),
                display_name: profile.display_name.clone(),
                known: true,
            })
            .unwrap_or_else(|| ResolvedType {
                gpad_type: raw_id.to_string(),
                display_name: UNKNOWN_GAMEPAD.to_string(),
                known: false,
            })
    }

    pub fn profile(&self, gpad_type: &str) -> Option<&GamepadTypeProfile> {
        self.profiles.iter().find(|p| p.gpad_type == gpad_type)
    }

    pub fn profiles(&self) -> &[GamepadTypeProfile] {
        &self.profiles
    }
}

fn control(
    id: &str,
    name: Option<&str>,
    style: &str,
    text: Option<&str>,
    face: Option<&str>,
    x: f32,
    y: f32,
) -> LayoutControl {
    LayoutControl {
        id: id.to_string(),
        info: ControlInfo {
            name: name.map(str::to_string),
            text: text.map(str::to_string),
            style: Some(style.to_string()),
            face: face.map(str::to_string),
            x,
            y,
        },
    }
}

fn groups(raw: &[&[&str]]) -> Vec<Vec<String>> {
    raw.iter()
        .map(|group| group.iter().map(|s| s.to_string()).collect())
        .collect()
}

/// The layouts shipped with the crate, in match priority order.
pub fn builtin_profiles() -> Vec<GamepadTypeProfile> {
    vec![xbox_360(), playstation_3(), logitech_f310()]
}

fn xbox_360() -> GamepadTypeProfile {
    GamepadTypeProfile {
        gpad_type: "XBOX 360".to_string(),
        display_name: "XBOX 360 Controller".to_string(),
        id_matches: groups(&[&["45e", "28e"], &["45e", "2a1"], &["XInput", "GAMEPAD"]]),
        button: vec![
            control("dpadUp", Some("dpad up"), "dpadUp", None, None, 30.0, 45.0),
            control("dpadDown", Some("dpad down"), "dpadDown", None, None, 30.0, 65.0),
            control("dpadLeft", Some("dpad left"), "dpadLeft", None, None, 25.0, 55.0),
            control("dpadRight", Some("dpad right"), "dpadRight", None, None, 35.0, 55.0),
            control("start", None, "round_small", Some("s"), None, 60.0, 20.0),
            control("back", None, "round_small", Some("b"), None, 40.0, 20.0),
            control("on", None, "round_large", Some("ON"), None, 50.0, 20.0),
            control("A", None, "round", Some("A"), None, 80.0, 30.0),
            control("B", None, "round", Some("B"), None, 86.0, 20.0),
            control("X", None, "round", Some("X"), None, 74.0, 20.0),
            control("Y", None, "round", Some("Y"), None, 80.0, 10.0),
            control("lBumper", Some("left bumper"), "bumper", Some("LB"), Some("top"), 25.0, 70.0),
            control("rBumper", Some("right bumper"), "bumper", Some("RB"), Some("top"), 75.0, 70.0),
            control("lStickClick", Some("left stick click"), "stick_click", None, None, 20.0, 20.0),
            control("rStickClick", Some("right stick click"), "stick_click", None, None, 70.0, 55.0),
            control("lTrigger", Some("left trigger"), "trigger", Some("LT"), Some("top"), 25.0, 20.0),
            control("rTrigger", Some("right trigger"), "trigger", Some("RT"), Some("top"), 75.0, 20.0),
        ],
        axis_dual: vec![
            control("lStick", Some("left stick"), "axis", None, None, 20.0, 20.0),
            control("rStick", Some("right stick"), "axis", None, None, 70.0, 55.0),
        ],
    }
}

fn playstation_3() -> GamepadTypeProfile {
    GamepadTypeProfile {
        gpad_type: "Playstation 3".to_string(),
        display_name: "Playstation 3 Controller".to_string(),
        id_matches: groups(&[&["54c", "268"]]),
        button: vec![
            control("dpadUp", None, "dpadUp", None, None, 20.0, 12.0),
            control("dpadDown", None, "dpadDown", None, None, 20.0, 28.0),
            control("dpadLeft", None, "dpadLeft", None, None, 15.0, 20.0),
            control("dpadRight", None, "dpadRight", None, None, 25.0, 20.0),
            control("start", None, "round_small", Some("st"), None, 60.0, 20.0),
            control("back", None, "round_small", Some("sl"), None, 40.0, 20.0),
            control("on", None, "round", Some("ON"), None, 50.0, 32.0),
            control("X", None, "round", Some("X"), None, 80.0, 30.0),
            control("SQUARE", None, "round", Some("[]"), None, 74.0, 20.0),
            control("CIRCLE", None, "round", Some("O"), None, 86.0, 20.0),
            control("TRIANGLE", None, "round", Some("^"), None, 80.0, 10.0),
            control("lBumper", None, "bumper", Some("L1"), Some("top"), 25.0, 70.0),
            control("rBumper", None, "bumper", Some("R1"), Some("top"), 75.0, 70.0),
            control("lStickClick", None, "stick_click", None, None, 30.0, 45.0),
            control("rStickClick", None, "stick_click", None, None, 70.0, 45.0),
            control("lTrigger", None, "trigger", Some("L2"), Some("top"), 25.0, 20.0),
            control("rTrigger", None, "trigger", Some("R2"), Some("top"), 75.0, 20.0),
        ],
        axis_dual: vec![
            control("lStick", None, "axis", None, None, 30.0, 45.0),
            control("rStick", None, "axis", None, None, 70.0, 45.0),
        ],
    }
}

fn logitech_f310() -> GamepadTypeProfile {
    GamepadTypeProfile {
        gpad_type: "Logitech F310".to_string(),
        display_name: "Logitech F310 Controller".to_string(),
        id_matches: groups(&[&["46d", "c21d"], &["46d", "c21e"], &["46d", "c216"]]),
        button: Vec::new(),
        axis_dual: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_substrings_of_a_group_must_match() {
        let resolver = GamepadTypeResolver::with_builtin();

        let hit = resolver.match_id("45e-2a1-Xbox 360 Wireless Receiver");
        assert_eq!(hit.gpad_type, "XBOX 360");
        assert_eq!(hit.display_name, "XBOX 360 Controller");
        assert!(hit.known);

        // "45e" alone is not a full group.
        let miss = resolver.match_id("45e-0b12-Xbox Series Controller");
        assert!(!miss.known);
    }

    #[test]
    fn test_later_group_of_same_profile_matches() {
        let resolver = GamepadTypeResolver::with_builtin();
        let hit = resolver.match_id("Xbox 360 Controller (XInput STANDARD GAMEPAD)");
        assert_eq!(hit.gpad_type, "XBOX 360");
    }

    #[test]
    fn test_unknown_id_resolves_to_itself() {
        let resolver = GamepadTypeResolver::with_builtin();
        let miss = resolver.match_id("Mystery Pad 9000");
        assert_eq!(miss.gpad_type, "Mystery Pad 9000");
        assert_eq!(miss.display_name, UNKNOWN_GAMEPAD);
    }

    #[test]
    fn test_first_profile_in_order_wins() {
        let first = GamepadTypeProfile {
            gpad_type: "first".into(),
            display_name: "First".into(),
            id_matches: vec![vec!["abc".into()]],
            button: vec![],
            axis_dual: vec![],
        };
        let second = GamepadTypeProfile {
            gpad_type: "second".into(),
            id_matches: vec![vec!["abc".into(), "def".into()]],
            ..first.clone()
        };
        let resolver = GamepadTypeResolver::new(vec![first, second]);
        assert_eq!(resolver.match_id("abc-def").gpad_type, "first");
    }

    #[test]
    fn test_resolve_caches_answers() {
        let mut resolver = GamepadTypeResolver::with_builtin();
        let a = resolver.resolve("54c-268-PLAYSTATION(R)3 Controller");
        let b = resolver.resolve("54c-268-PLAYSTATION(R)3 Controller");
        assert_eq!(a, b);
        assert_eq!(a.gpad_type, "Playstation 3");
    }

    #[test]
    fn test_control_names_fall_back_to_id() {
        let resolver = GamepadTypeResolver::with_builtin();
        let xbox = resolver.profile("XBOX 360").unwrap();
        assert_eq!(xbox.button_name("lBumper"), "left bumper");
        assert_eq!(xbox.button_name("A"), "A");
        assert_eq!(xbox.axis_name("rStick"), "right stick");

        let ps3 = resolver.profile("Playstation 3").unwrap();
        assert_eq!(ps3.axis_name("lStick"), "lStick");
    }
}
