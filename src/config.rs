//! Initialisation settings.
//!
//! [`InputConfig`] is plain data with defaults for every field, so a host can
//! build it in code, deserialize it from any serde format, or load TOML with
//! [`InputConfig::from_toml_str`] / [`InputConfig::load_from_file`].
//!
//! ```
//! use actionpad::config::InputConfig;
//!
//! let cfg = InputConfig::from_toml_str(r#"
//!     max_players = 2
//!
//!     [actions.jump]
//!     description = "Jump"
//!     category = "movement"
//! "#).unwrap();
//! assert_eq!(cfg.max_players, 2);
//! assert_eq!(cfg.threshold, 0.35);
//! ```

use crate::binding::{ActionInfo, ActionMap};
use crate::error::Result;
use crate::player::Player;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Fallback for a missing or unusable mouse normaliser.
pub const DEFAULT_MOUSE_NORMALIZER: f32 = 3.0;

/// Timing and thresholds of the live-binding capture loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Live-mapping poll period.
    pub poll_interval_ms: u64,
    /// Calibration poll period.
    pub calibration_poll_ms: u64,
    /// Pause after a capture before the next one is accepted.
    pub cooldown_ms: u64,
    /// Raw button value that counts as a press.
    pub button_threshold: f32,
    /// Raw axis magnitude that counts as a deflection.
    pub axis_threshold: f32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            calibration_poll_ms: 50,
            cooldown_ms: 300,
            button_threshold: 0.5,
            axis_threshold: 0.7,
        }
    }
}

impl CaptureSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn calibration_poll(&self) -> Duration {
        Duration::from_millis(self.calibration_poll_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Canonical catalog of actions the host queries.
    pub actions: BTreeMap<String, ActionInfo>,
    pub max_players: u8,
    /// Mouse delta that maps to a full `1.0` on the directional mouse inputs.
    pub mouse_normalizer: f32,
    /// Gamepad axis deadzone.
    pub threshold: f32,
    /// Ticks between gamepad re-enumeration and cache reloads.
    pub refresh_interval: u32,
    pub capture: CaptureSettings,
    /// Seed for the stored action maps on first run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mappings: Option<Vec<ActionMap>>,
    /// Seed for the stored players on first run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<Player>>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            actions: BTreeMap::new(),
            max_players: 1,
            mouse_normalizer: DEFAULT_MOUSE_NORMALIZER,
            threshold: 0.35,
            refresh_interval: 1000,
            capture: CaptureSettings::default(),
            mappings: None,
            players: None,
        }
    }
}

impl InputConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Add an action to the catalog (builder style).
    pub fn with_action(mut self, name: &str, description: &str, category: Option<&str>) -> Self {
        self.actions.insert(
            name.to_string(),
            ActionInfo {
                description: description.to_string(),
                category: category.map(str::to_string),
            },
        );
        self
    }

    fn has_usable_normalizer(&self) -> bool {
        self.mouse_normalizer.is_finite() && self.mouse_normalizer > 0.0
    }

    /// Replace values the system cannot run with by their defaults.
    pub fn sanitize(&mut self) {
        if !self.has_usable_normalizer() {
            self.mouse_normalizer = DEFAULT_MOUSE_NORMALIZER;
        }
    }

    /// Non-fatal warnings for suspicious values.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.max_players == 0 {
            warnings.push("max_players is 0: no player can resolve actions".to_string());
        }
        if !self.has_usable_normalizer() {
            warnings.push(format!(
                "mouse_normalizer {} must be positive, using {DEFAULT_MOUSE_NORMALIZER}",
                self.mouse_normalizer
            ));
        }
        if !(0.0..1.0).contains(&self.threshold) {
            warnings.push(format!("threshold {} outside [0, 1)", self.threshold));
        }
        if self.refresh_interval == 0 {
            warnings.push("refresh_interval 0 refreshes on every tick".to_string());
        }
        if let Some(maps) = &self.mappings {
            for map in maps {
                for name in map.mapping.keys() {
                    if !self.actions.contains_key(name) {
                        warnings.push(format!(
                            "action map {} binds `{name}`, which is not in the action catalog",
                            map.id
                        ));
                    }
                }
            }
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = InputConfig::default();
        assert_eq!(cfg.max_players, 1);
        assert_eq!(cfg.mouse_normalizer, 3.0);
        assert_eq!(cfg.refresh_interval, 1000);
        assert_eq!(cfg.capture.cooldown(), Duration::from_millis(300));
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn test_unusable_normalizer_falls_back_to_default() {
        for bad in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            let mut cfg = InputConfig {
                mouse_normalizer: bad,
                ..InputConfig::default()
            };
            assert_eq!(cfg.validate().len(), 1);
            cfg.sanitize();
            assert_eq!(cfg.mouse_normalizer, DEFAULT_MOUSE_NORMALIZER);
            assert!(cfg.validate().is_empty());
        }
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = InputConfig::from_toml_str(
            r#"
            mouse_normalizer = 5.0

            [capture]
            cooldown_ms = 150

            [actions.fire]
            description = "Fire"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.mouse_normalizer, 5.0);
        assert_eq!(cfg.capture.cooldown_ms, 150);
        assert_eq!(cfg.capture.poll_interval_ms, 100);
        assert_eq!(cfg.actions["fire"].category, None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_players = 4").unwrap();
        let cfg = InputConfig::load_from_file(file.path()).unwrap();
        assert_eq!(cfg.max_players, 4);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(InputConfig::from_toml_str("max_players = \"two\"").is_err());
    }

    #[test]
    fn test_validate_flags_suspicious_values() {
        let mut cfg = InputConfig::default();
        cfg.max_players = 0;
        cfg.threshold = 1.5;
        cfg.mappings = Some(vec![ActionMap::from_catalog(
            0,
            &BTreeMap::from([("ghost".to_string(), ActionInfo::default())]),
        )]);
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 3, "{warnings:?}");
    }
}
