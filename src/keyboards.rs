//! Key code → display label tables.
//!
//! Labels are only used for presentation (the `text` of a captured keyboard
//! binding); resolution always works on raw key codes.

use std::collections::HashMap;

/// Name of the layout selected by default.
pub const DEFAULT_LAYOUT: &str = "wasd";

const WASD: &[(u32, &str)] = &[
    (8, "Backspace"),
    (9, "Tab"),
    (13, "Enter"),
    (16, "Shift"),
    (17, "Ctrl"),
    (18, "Alt"),
    (19, "Pause/Break"),
    (20, "Caps Lock"),
    (27, "Esc"),
    (32, "Spacebar"),
    (33, "Page Up"),
    (34, "Page Down"),
    (35, "End"),
    (36, "Home"),
    (37, "Arrow Left"),
    (38, "Arrow Up"),
    (39, "Arrow Right"),
    (40, "Arrow Down"),
    (45, "Insert"),
    (46, "Delete"),
    (48, "0"),
    (49, "1"),
    (50, "2"),
    (51, "3"),
    (52, "4"),
    (53, "5"),
    (54, "6"),
    (55, "7"),
    (56, "8"),
    (57, "9"),
    (59, ";:"),
    (61, "=+"),
    (65, "a"),
    (66, "b"),
    (67, "c"),
    (68, "d"),
    (69, "e"),
    (70, "f"),
    (71, "g"),
    (72, "h"),
    (73, "i"),
    (74, "j"),
    (75, "k"),
    (76, "l"),
    (77, "m"),
    (78, "n"),
    (79, "o"),
    (80, "p"),
    (81, "q"),
    (82, "r"),
    (83, "s"),
    (84, "t"),
    (85, "u"),
    (86, "v"),
    (87, "w"),
    (88, "x"),
    (89, "y"),
    (90, "z"),
    (91, "Windows"),
    (96, "0 (Num Lock)"),
    (97, "1 (Num Lock)"),
    (98, "2 (Num Lock)"),
    (99, "3 (Num Lock)"),
    (100, "4 (Num Lock)"),
    (101, "5 (Num Lock)"),
    (102, "6 (Num Lock)"),
    (103, "7 (Num Lock)"),
    (104, "8 (Num Lock)"),
    (105, "9 (Num Lock)"),
    (106, "* (Num Lock)"),
    (107, "+ (Num Lock)"),
    (109, "- (Num Lock)"),
    (110, ". (Num Lock)"),
    (111, "/ (Num Lock)"),
    (112, "F1"),
    (113, "F2"),
    (114, "F3"),
    (115, "F4"),
    (116, "F5"),
    (117, "F6"),
    (118, "F7"),
    (119, "F8"),
    (120, "F9"),
    (121, "F10"),
    (122, "F11"),
    (123, "F12"),
    (144, "Num Lock"),
    (145, "Scroll Lock"),
    (182, "My Computer"),
    (183, "My Calculator"),
    (186, ";:"),
    (187, "=+"),
    (188, ",<"),
    (189, "_-"),
    (190, ".>"),
    (191, "/?"),
    (192, "`~"),
    (219, "[{"),
    (220, "|"),
    (221, "]}"),
    (222, "'\""),
];

/// Registry of keyboard layouts with one selected layout.
#[derive(Debug, Clone)]
pub struct KeyboardLayouts {
    layouts: HashMap<String, HashMap<u32, String>>,
    current: String,
}

impl Default for KeyboardLayouts {
    fn default() -> Self {
        let mut layouts = HashMap::new();
        layouts.insert(
            DEFAULT_LAYOUT.to_string(),
            WASD.iter().map(|(code, label)| (*code, label.to_string())).collect(),
        );
        Self {
            layouts,
            current: DEFAULT_LAYOUT.to_string(),
        }
    }
}

impl KeyboardLayouts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a layout.
    pub fn insert(&mut self, name: impl Into<String>, labels: HashMap<u32, String>) {
        self.layouts.insert(name.into(), labels);
    }

    /// Select the layout used by [`label`](Self::label). Unknown names are
    /// accepted; lookups then fall back to the numeric code.
    pub fn set_current(&mut self, name: impl Into<String>) {
        self.current = name.into();
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Display label of `code` in the current layout.
    pub fn get(&self, code: u32) -> Option<&str> {
        self.layouts
            .get(&self.current)
            .and_then(|labels| labels.get(&code))
            .map(String::as_str)
    }

    /// Like [`get`](Self::get), falling back to the code as text.
    pub fn label(&self, code: u32) -> String {
        self.get(code)
            .map(str::to_string)
            .unwrap_or_else(|| code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_labels() {
        let layouts = KeyboardLayouts::new();
        assert_eq!(layouts.current(), "wasd");
        assert_eq!(layouts.label(87), "w");
        assert_eq!(layouts.label(32), "Spacebar");
        assert_eq!(layouts.label(123), "F12");
    }

    #[test]
    fn test_unknown_code_falls_back_to_number() {
        let layouts = KeyboardLayouts::new();
        assert_eq!(layouts.get(255), None);
        assert_eq!(layouts.label(255), "255");
    }

    #[test]
    fn test_switch_layout() {
        let mut layouts = KeyboardLayouts::new();
        layouts.insert("azerty", HashMap::from([(90, "w".to_string())]));
        layouts.set_current("azerty");
        assert_eq!(layouts.label(90), "w");
        assert_eq!(layouts.label(87), "87");
    }
}
