//! Action maps: which physical inputs drive which named actions.
//!
//! The model is serialisable as-is; the JSON produced here is what
//! [`InputSystem::get_mappings`](crate::manager::InputSystem::get_mappings)
//! returns and what the store persists.
//!
//! # Shape
//! - An [`ActionMap`] maps action names to an [`ActionMapping`].
//! - An [`ActionMapping`] holds a list of [`InputCombination`]s.
//! - An [`InputCombination`] holds an ordered list of [`InputBinding`]s.
//!
//! How combinations and bindings are evaluated is described in
//! [`resolver`](crate::resolver).

use crate::error::{Error, Result};
use crate::event::MouseButton;
use crate::snapshot::Direction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fallback category for actions that declare none.
pub const DEFAULT_CATEGORY: &str = "other";

/// Name given to freshly created action maps.
pub const NEW_MAP_NAME: &str = "New Mapping";

/// Device class a binding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Keyboard,
    Mouse,
    Gamepad,
}

/// Mouse inputs an action can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseControl {
    /// Upward movement, normalised to `[0, 1]`.
    MouseUp,
    MouseDown,
    MouseLeft,
    MouseRight,
    MouseButtonLeft,
    MouseButtonMiddle,
    MouseButtonRight,
    /// Normalised pointer position.
    MouseX,
    MouseY,
    /// Raw movement delta.
    MouseDx,
    MouseDy,
}

impl MouseControl {
    /// Directional pseudo-input, if this is one.
    pub fn direction(self) -> Option<Direction> {
        match self {
            MouseControl::MouseUp => Some(Direction::Up),
            MouseControl::MouseDown => Some(Direction::Down),
            MouseControl::MouseLeft => Some(Direction::Left),
            MouseControl::MouseRight => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn button(self) -> Option<MouseButton> {
        match self {
            MouseControl::MouseButtonLeft => Some(MouseButton::Left),
            MouseControl::MouseButtonMiddle => Some(MouseButton::Middle),
            MouseControl::MouseButtonRight => Some(MouseButton::Right),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MouseControl::MouseUp => "mouse up",
            MouseControl::MouseDown => "mouse down",
            MouseControl::MouseLeft => "mouse left",
            MouseControl::MouseRight => "mouse right",
            MouseControl::MouseButtonLeft => "left button",
            MouseControl::MouseButtonMiddle => "middle button",
            MouseControl::MouseButtonRight => "right button",
            MouseControl::MouseX => "mouse x",
            MouseControl::MouseY => "mouse y",
            MouseControl::MouseDx => "mouse dx",
            MouseControl::MouseDy => "mouse dy",
        }
    }
}

/// One physical input bound to an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputBinding {
    Keyboard {
        code: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Mouse {
        control: MouseControl,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// Logical button of the action map's gamepad layout.
    GamepadButton {
        button: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// One directional half of a logical dual axis.
    GamepadAxis {
        axis: String,
        direction: Direction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl InputBinding {
    pub fn key(code: u32) -> Self {
        InputBinding::Keyboard { code, text: None }
    }

    pub fn mouse(control: MouseControl) -> Self {
        InputBinding::Mouse {
            control,
            text: None,
        }
    }

    pub fn gamepad_button(button: impl Into<String>) -> Self {
        InputBinding::GamepadButton {
            button: button.into(),
            text: None,
        }
    }

    pub fn gamepad_axis(axis: impl Into<String>, direction: Direction) -> Self {
        InputBinding::GamepadAxis {
            axis: axis.into(),
            direction,
            text: None,
        }
    }

    /// Same binding with a display label attached.
    pub fn with_text(mut self, label: impl Into<String>) -> Self {
        let slot = match &mut self {
            InputBinding::Keyboard { text, .. }
            | InputBinding::Mouse { text, .. }
            | InputBinding::GamepadButton { text, .. }
            | InputBinding::GamepadAxis { text, .. } => text,
        };
        *slot = Some(label.into());
        self
    }

    pub fn device(&self) -> DeviceClass {
        match self {
            InputBinding::Keyboard { .. } => DeviceClass::Keyboard,
            InputBinding::Mouse { .. } => DeviceClass::Mouse,
            InputBinding::GamepadButton { .. } | InputBinding::GamepadAxis { .. } => {
                DeviceClass::Gamepad
            }
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            InputBinding::Keyboard { text, .. }
            | InputBinding::Mouse { text, .. }
            | InputBinding::GamepadButton { text, .. }
            | InputBinding::GamepadAxis { text, .. } => text.as_deref(),
        }
    }

    /// Equality on the physical input only, ignoring the label.
    pub fn same_input(&self, other: &InputBinding) -> bool {
        match (self, other) {
            (InputBinding::Keyboard { code: a, .. }, InputBinding::Keyboard { code: b, .. }) => {
                a == b
            }
            (InputBinding::Mouse { control: a, .. }, InputBinding::Mouse { control: b, .. }) => {
                a == b
            }
            (
                InputBinding::GamepadButton { button: a, .. },
                InputBinding::GamepadButton { button: b, .. },
            ) => a == b,
            (
                InputBinding::GamepadAxis {
                    axis: a,
                    direction: da,
                    ..
                },
                InputBinding::GamepadAxis {
                    axis: b,
                    direction: db,
                    ..
                },
            ) => a == b && da == db,
            _ => false,
        }
    }
}

/// Ordered inputs bound together; see [`resolver`](crate::resolver) for how
/// they are evaluated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputCombination {
    pub id: u32,
    #[serde(default)]
    pub inputs: Vec<InputBinding>,
}

/// Catalog entry describing an action the host exposes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionInfo {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// The bindings of one action inside an [`ActionMap`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionMapping {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub inputs: Vec<InputCombination>,
}

impl ActionMapping {
    pub fn from_info(info: &ActionInfo) -> Self {
        Self {
            description: info.description.clone(),
            category: info.category.clone(),
            inputs: Vec::new(),
        }
    }

    pub fn combination(&self, id: u32) -> Option<&InputCombination> {
        self.inputs.iter().find(|c| c.id == id)
    }

    pub fn combination_mut(&mut self, id: u32) -> Option<&mut InputCombination> {
        self.inputs.iter_mut().find(|c| c.id == id)
    }
}

/// A user-editable set of bindings, referenced by players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMap {
    pub id: u32,
    pub name: String,
    pub keyboard: bool,
    pub mouse: bool,
    /// Layout name of the gamepad this map binds, `None` when gamepads are off.
    #[serde(default)]
    pub gamepad: Option<String>,
    #[serde(default)]
    pub mapping: BTreeMap<String, ActionMapping>,
}

impl ActionMap {
    /// A fresh map with one empty entry per catalog action.
    pub fn from_catalog(id: u32, catalog: &BTreeMap<String, ActionInfo>) -> Self {
        Self {
            id,
            name: NEW_MAP_NAME.to_string(),
            keyboard: true,
            mouse: true,
            gamepad: None,
            mapping: catalog
                .iter()
                .map(|(name, info)| (name.clone(), ActionMapping::from_info(info)))
                .collect(),
        }
    }

    pub fn action(&self, name: &str) -> Option<&ActionMapping> {
        self.mapping.get(name)
    }

    fn action_mut(&mut self, name: &str) -> Result<&mut ActionMapping> {
        self.mapping
            .get_mut(name)
            .ok_or_else(|| Error::UnknownAction(name.to_string()))
    }

    pub fn enables(&self, device: DeviceClass) -> bool {
        match device {
            DeviceClass::Keyboard => self.keyboard,
            DeviceClass::Mouse => self.mouse,
            DeviceClass::Gamepad => self.gamepad.is_some(),
        }
    }

    /// Turning the keyboard off removes every keyboard binding.
    pub fn set_keyboard(&mut self, enabled: bool) {
        self.keyboard = enabled;
        if !enabled {
            self.strip(DeviceClass::Keyboard);
        }
    }

    /// Turning the mouse off removes every mouse binding.
    pub fn set_mouse(&mut self, enabled: bool) {
        self.mouse = enabled;
        if !enabled {
            self.strip(DeviceClass::Mouse);
        }
    }

    /// Choose the gamepad layout. Any change of layout removes the existing
    /// gamepad bindings, which would name controls of the old layout.
    pub fn set_gamepad(&mut self, gpad_type: Option<String>) {
        if self.gamepad != gpad_type {
            self.strip(DeviceClass::Gamepad);
        }
        self.gamepad = gpad_type;
    }

    fn strip(&mut self, device: DeviceClass) {
        for mapping in self.mapping.values_mut() {
            for combination in &mut mapping.inputs {
                combination.inputs.retain(|input| input.device() != device);
            }
        }
    }

    /// Add an empty combination to `action` and return its id.
    pub fn add_combination(&mut self, action: &str) -> Result<u32> {
        let mapping = self.action_mut(action)?;
        let id = mapping
            .inputs
            .iter()
            .map(|c| c.id)
            .max()
            .map_or(Some(0), |highest| highest.checked_add(1))
            .ok_or(Error::IdsExhausted("input combination"))?;
        mapping.inputs.push(InputCombination {
            id,
            inputs: Vec::new(),
        });
        Ok(id)
    }

    pub fn delete_combination(&mut self, action: &str, combination: u32) -> Result<()> {
        let mapping = self.action_mut(action)?;
        let before = mapping.inputs.len();
        mapping.inputs.retain(|c| c.id != combination);
        if mapping.inputs.len() == before {
            return Err(Error::UnknownInputCombination(combination));
        }
        Ok(())
    }

    /// Append a binding to a combination. Duplicates of the same physical
    /// input are ignored.
    pub fn add_input(&mut self, action: &str, combination: u32, input: InputBinding) -> Result<()> {
        let target = self
            .action_mut(action)?
            .combination_mut(combination)
            .ok_or(Error::UnknownInputCombination(combination))?;
        if !target.inputs.iter().any(|existing| existing.same_input(&input)) {
            target.inputs.push(input);
        }
        Ok(())
    }

    /// Remove the binding at `position` in a combination.
    pub fn remove_input(&mut self, action: &str, combination: u32, position: usize) -> Result<()> {
        let target = self
            .action_mut(action)?
            .combination_mut(combination)
            .ok_or(Error::UnknownInputCombination(combination))?;
        if position < target.inputs.len() {
            target.inputs.remove(position);
        }
        Ok(())
    }

    /// Action names grouped by category (`"other"` when none is set).
    pub fn grouped_actions(&self) -> BTreeMap<String, Vec<String>> {
        let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, mapping) in &self.mapping {
            let category = mapping
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
            groups.entry(category).or_default().push(name.clone());
        }
        groups
    }
}

/// Next free action map id (`0` for an empty list).
pub fn next_action_map_id(maps: &[ActionMap]) -> Result<u32> {
    maps.iter()
        .map(|m| m.id)
        .max()
        .map_or(Some(0), |highest| highest.checked_add(1))
        .ok_or(Error::IdsExhausted("action map"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> BTreeMap<String, ActionInfo> {
        BTreeMap::from([
            (
                "jump".to_string(),
                ActionInfo {
                    description: "Jump".into(),
                    category: Some("movement".into()),
                },
            ),
            (
                "fire".to_string(),
                ActionInfo {
                    description: "Fire".into(),
                    category: None,
                },
            ),
        ])
    }

    #[test]
    fn test_new_map_from_catalog() {
        let map = ActionMap::from_catalog(3, &catalog());
        assert_eq!(map.id, 3);
        assert_eq!(map.name, NEW_MAP_NAME);
        assert!(map.keyboard && map.mouse);
        assert_eq!(map.gamepad, None);
        assert_eq!(map.action("jump").unwrap().description, "Jump");
        assert!(map.action("fire").unwrap().inputs.is_empty());
    }

    #[test]
    fn test_combination_ids_and_inputs() {
        let mut map = ActionMap::from_catalog(0, &catalog());
        assert_eq!(map.add_combination("fire").unwrap(), 0);
        assert_eq!(map.add_combination("fire").unwrap(), 1);

        map.add_input("fire", 1, InputBinding::key(32).with_text("Spacebar"))
            .unwrap();
        map.add_input("fire", 1, InputBinding::key(32)).unwrap();
        map.add_input("fire", 1, InputBinding::mouse(MouseControl::MouseButtonLeft))
            .unwrap();
        assert_eq!(map.action("fire").unwrap().combination(1).unwrap().inputs.len(), 2);

        map.remove_input("fire", 1, 0).unwrap();
        let left = &map.action("fire").unwrap().combination(1).unwrap().inputs;
        assert_eq!(left, &vec![InputBinding::mouse(MouseControl::MouseButtonLeft)]);

        map.delete_combination("fire", 0).unwrap();
        assert!(matches!(
            map.delete_combination("fire", 0),
            Err(Error::UnknownInputCombination(0))
        ));
        assert!(matches!(
            map.add_combination("crouch"),
            Err(Error::UnknownAction(_))
        ));
    }

    #[test]
    fn test_disabling_a_device_strips_its_bindings() {
        let mut map = ActionMap::from_catalog(0, &catalog());
        map.set_gamepad(Some("XBOX 360".into()));
        let id = map.add_combination("jump").unwrap();
        map.add_input("jump", id, InputBinding::key(87)).unwrap();
        map.add_input("jump", id, InputBinding::mouse(MouseControl::MouseUp))
            .unwrap();
        map.add_input("jump", id, InputBinding::gamepad_button("A"))
            .unwrap();

        map.set_mouse(false);
        map.set_gamepad(Some("XBOX 360".into()));
        assert_eq!(map.action("jump").unwrap().inputs[0].inputs.len(), 2);

        map.set_gamepad(Some("Playstation 3".into()));
        assert_eq!(
            map.action("jump").unwrap().inputs[0].inputs,
            vec![InputBinding::key(87)]
        );
    }

    #[test]
    fn test_grouped_actions_default_category() {
        let map = ActionMap::from_catalog(0, &catalog());
        let groups = map.grouped_actions();
        assert_eq!(groups["movement"], vec!["jump".to_string()]);
        assert_eq!(groups[DEFAULT_CATEGORY], vec!["fire".to_string()]);
    }

    #[test]
    fn test_binding_json_shape() {
        let binding = InputBinding::gamepad_axis("lStick", Direction::Up).with_text("left stick up");
        let json = serde_json::to_value(&binding).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "gamepad_axis",
                "axis": "lStick",
                "direction": "up",
                "text": "left stick up"
            })
        );

        let mouse: InputBinding =
            serde_json::from_str(r#"{"type":"mouse","control":"mouse_button_right"}"#).unwrap();
        assert_eq!(mouse, InputBinding::mouse(MouseControl::MouseButtonRight));
    }

    #[test]
    fn test_next_action_map_id() {
        assert_eq!(next_action_map_id(&[]).unwrap(), 0);
        let mut maps = vec![
            ActionMap::from_catalog(4, &catalog()),
            ActionMap::from_catalog(1, &catalog()),
        ];
        assert_eq!(next_action_map_id(&maps).unwrap(), 5);

        maps.push(ActionMap::from_catalog(u32::MAX, &catalog()));
        assert!(matches!(
            next_action_map_id(&maps),
            Err(Error::IdsExhausted(_))
        ));
    }

    #[test]
    fn test_combination_id_at_limit_is_an_error() {
        let mut map = ActionMap::from_catalog(0, &catalog());
        map.mapping.get_mut("fire").unwrap().inputs.push(InputCombination {
            id: u32::MAX,
            inputs: Vec::new(),
        });
        assert!(matches!(
            map.add_combination("fire"),
            Err(Error::IdsExhausted(_))
        ));
        assert_eq!(map.action("fire").unwrap().inputs.len(), 1);
    }
}
