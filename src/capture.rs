//! Live-binding capture.
//!
//! While the configuration menu is open, capture sessions watch the input
//! stream for "this control just went active" and report it.
//!
//! ```text
//! Idle ──arm──▶ WaitingForInput ──first new input──▶ Captured ──cool-down──▶ Idle
//! ```
//!
//! Inputs that are already active when a session arms form its *baseline* and
//! are ignored until they are released, so a control still held from the
//! previous capture is never captured twice.
//!
//! Three flows sit on top of the state machine:
//! - **calibration** walks a list of logical targets and pairs each one with
//!   the raw button or axis the user moves,
//! - **monitor** reports raw presses on an already calibrated pad,
//! - **action mapping** turns key presses and logical pad controls into new
//!   bindings for one action.

use crate::binding::InputBinding;
use crate::config::CaptureSettings;
use crate::device::RawGamepad;
use crate::snapshot::{GamepadControl, InputState};
use std::collections::{BTreeSet, VecDeque};
use std::time::{Duration, Instant};

/// Pause before the calibration monitor accepts the next press.
pub const MONITOR_REARM: Duration = Duration::from_millis(100);

/// Something a capture session can observe going active.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObservedInput {
    Key(u32),
    RawButton { slot: usize, index: usize },
    /// `positive` is the sign of the deflection.
    RawAxis { slot: usize, index: usize, positive: bool },
    /// Translated control of a pad, as found in the current snapshot.
    Control { slot: usize, control: GamepadControl },
}

/// Raw buttons above the button threshold and raw axes beyond the axis
/// threshold, for every pad in `pads`.
pub fn observe_raw(pads: &[RawGamepad], settings: &CaptureSettings) -> BTreeSet<ObservedInput> {
    let mut active = BTreeSet::new();
    for pad in pads {
        for (index, value) in pad.buttons.iter().enumerate() {
            if *value > settings.button_threshold {
                active.insert(ObservedInput::RawButton {
                    slot: pad.index,
                    index,
                });
            }
        }
        for (index, value) in pad.axes.iter().enumerate() {
            if value.abs() > settings.axis_threshold {
                active.insert(ObservedInput::RawAxis {
                    slot: pad.index,
                    index,
                    positive: *value > 0.0,
                });
            }
        }
    }
    active
}

/// Held keys plus logical controls of pads of `gpad_type` in `state`.
///
/// Buttons count above the button threshold; axis directions above the axis
/// threshold.
pub fn observe_live(
    state: &InputState,
    keys: bool,
    gpad_type: Option<&str>,
    settings: &CaptureSettings,
) -> BTreeSet<ObservedInput> {
    let mut active = BTreeSet::new();
    if keys {
        active.extend(
            state
                .keyboard
                .iter()
                .filter(|(_, v)| **v != 0.0)
                .map(|(code, _)| ObservedInput::Key(*code)),
        );
    }
    let Some(gpad_type) = gpad_type else {
        return active;
    };
    for (slot, pad) in state.gamepad.iter().filter(|(_, p)| p.gpad_type == gpad_type) {
        for (control, value) in &pad.values {
            let threshold = match control {
                GamepadControl::Button(_) => settings.button_threshold,
                GamepadControl::Axis { .. } => settings.axis_threshold,
            };
            if value.abs() > threshold {
                active.insert(ObservedInput::Control {
                    slot: *slot,
                    control: control.clone(),
                });
            }
        }
    }
    active
}

/// Which observations a waiting capture accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    Any,
    RawButtons,
    RawAxes,
}

impl Accept {
    fn admits(self, input: &ObservedInput) -> bool {
        match self {
            Accept::Any => true,
            Accept::RawButtons => matches!(input, ObservedInput::RawButton { .. }),
            Accept::RawAxes => matches!(input, ObservedInput::RawAxis { .. }),
        }
    }

    /// Raw kind a calibration target needs.
    pub fn for_target(target: &GamepadControl) -> Self {
        match target {
            GamepadControl::Button(_) => Accept::RawButtons,
            GamepadControl::Axis { .. } => Accept::RawAxes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    Idle,
    WaitingForInput,
    Captured { input: ObservedInput, at: Instant },
}

/// Single capture state machine.
#[derive(Debug, Clone)]
pub struct Capture {
    state: CaptureState,
    baseline: BTreeSet<ObservedInput>,
    accept: Accept,
    cooldown: Duration,
}

impl Capture {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: CaptureState::Idle,
            baseline: BTreeSet::new(),
            accept: Accept::Any,
            cooldown,
        }
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Start waiting. Everything in `active` is ignored until released.
    pub fn arm(&mut self, accept: Accept, active: &BTreeSet<ObservedInput>) {
        self.accept = accept;
        self.baseline = active.clone();
        self.state = CaptureState::WaitingForInput;
    }

    pub fn disarm(&mut self) {
        self.baseline.clear();
        self.state = CaptureState::Idle;
    }

    /// Advance with the inputs active at `now`.
    ///
    /// Returns the captured input on the poll that captures it. Among several
    /// new inputs the smallest in [`ObservedInput`] order wins.
    pub fn poll(&mut self, now: Instant, active: &BTreeSet<ObservedInput>) -> Option<ObservedInput> {
        match &self.state {
            CaptureState::Idle => None,
            CaptureState::WaitingForInput => {
                self.baseline.retain(|held| active.contains(held));
                let hit = active
                    .iter()
                    .find(|input| !self.baseline.contains(*input) && self.accept.admits(input))
                    .cloned()?;
                self.state = CaptureState::Captured {
                    input: hit.clone(),
                    at: now,
                };
                Some(hit)
            }
            CaptureState::Captured { at, .. } => {
                if now.saturating_duration_since(*at) >= self.cooldown {
                    self.state = CaptureState::Idle;
                }
                None
            }
        }
    }
}

/// What a session is capturing for.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureFlow {
    Calibration {
        gpad_type: String,
        remaining: VecDeque<GamepadControl>,
    },
    Monitor {
        gpad_type: String,
    },
    ActionMapping {
        map_id: u32,
        action: String,
        combination: u32,
    },
}

/// Outcome of one session poll.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureStep {
    /// Calibration paired `target` with `input`.
    Calibrated {
        gpad_type: String,
        target: GamepadControl,
        input: ObservedInput,
    },
    /// The last calibration target was handled; the session now monitors.
    CalibrationFinished { gpad_type: String },
    Monitored { gpad_type: String, input: ObservedInput },
    /// Live mapping captured `input` for an action.
    Bound {
        map_id: u32,
        action: String,
        combination: u32,
        input: ObservedInput,
    },
}

/// Result of a capture step once the input system has applied it.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    /// `control` is now driven by raw index `raw_index`; the table is saved.
    Calibrated {
        gpad_type: String,
        control: GamepadControl,
        raw_index: usize,
    },
    CalibrationFinished { gpad_type: String },
    /// Monitor press, translated when the table knows the raw input.
    Pressed {
        gpad_type: String,
        input: ObservedInput,
        control: Option<GamepadControl>,
    },
    /// `binding` was appended to the combination and saved.
    Bound {
        map_id: u32,
        action: String,
        combination: u32,
        binding: InputBinding,
    },
}

/// A capture flow driven by a [`Capture`].
#[derive(Debug, Clone)]
pub struct CaptureSession {
    flow: CaptureFlow,
    capture: Capture,
    target: Option<GamepadControl>,
    calibration_cooldown: Duration,
}

impl CaptureSession {
    /// Calibrate `targets` in order, arming the first one immediately.
    pub fn calibration(
        gpad_type: impl Into<String>,
        targets: Vec<GamepadControl>,
        settings: &CaptureSettings,
        active: &BTreeSet<ObservedInput>,
    ) -> Self {
        let mut session = Self {
            flow: CaptureFlow::Calibration {
                gpad_type: gpad_type.into(),
                remaining: targets.into(),
            },
            capture: Capture::new(settings.cooldown()),
            target: None,
            calibration_cooldown: settings.cooldown(),
        };
        session.arm_next_target(active);
        session
    }

    pub fn monitor(
        gpad_type: impl Into<String>,
        settings: &CaptureSettings,
        active: &BTreeSet<ObservedInput>,
    ) -> Self {
        let mut capture = Capture::new(MONITOR_REARM);
        capture.arm(Accept::Any, active);
        Self {
            flow: CaptureFlow::Monitor {
                gpad_type: gpad_type.into(),
            },
            capture,
            target: None,
            calibration_cooldown: settings.cooldown(),
        }
    }

    pub fn action_mapping(
        map_id: u32,
        action: impl Into<String>,
        combination: u32,
        settings: &CaptureSettings,
        active: &BTreeSet<ObservedInput>,
    ) -> Self {
        let mut capture = Capture::new(settings.cooldown());
        capture.arm(Accept::Any, active);
        Self {
            flow: CaptureFlow::ActionMapping {
                map_id,
                action: action.into(),
                combination,
            },
            capture,
            target: None,
            calibration_cooldown: settings.cooldown(),
        }
    }

    pub fn flow(&self) -> &CaptureFlow {
        &self.flow
    }

    pub fn state(&self) -> &CaptureState {
        self.capture.state()
    }

    /// Calibration target currently waiting for input.
    pub fn target(&self) -> Option<&GamepadControl> {
        self.target.as_ref()
    }

    /// `true` for calibration and monitor sessions, which observe raw pads.
    pub fn observes_raw(&self) -> bool {
        !matches!(self.flow, CaptureFlow::ActionMapping { .. })
    }

    /// Layout whose pads this session watches, if it is a gamepad flow.
    pub fn gpad_type(&self) -> Option<&str> {
        match &self.flow {
            CaptureFlow::Calibration { gpad_type, .. } | CaptureFlow::Monitor { gpad_type } => {
                Some(gpad_type)
            }
            CaptureFlow::ActionMapping { .. } => None,
        }
    }

    fn arm_next_target(&mut self, active: &BTreeSet<ObservedInput>) -> bool {
        let CaptureFlow::Calibration { remaining, .. } = &mut self.flow else {
            return false;
        };
        match remaining.pop_front() {
            Some(next) => {
                self.capture.arm(Accept::for_target(&next), active);
                self.target = Some(next);
                true
            }
            None => {
                self.target = None;
                false
            }
        }
    }

    /// Advance the session with the inputs active at `now`.
    pub fn poll(&mut self, now: Instant, active: &BTreeSet<ObservedInput>) -> Option<CaptureStep> {
        if let Some(input) = self.capture.poll(now, active) {
            return Some(match &self.flow {
                CaptureFlow::Calibration { gpad_type, .. } => CaptureStep::Calibrated {
                    gpad_type: gpad_type.clone(),
                    target: self.target.clone()?,
                    input,
                },
                CaptureFlow::Monitor { gpad_type } => CaptureStep::Monitored {
                    gpad_type: gpad_type.clone(),
                    input,
                },
                CaptureFlow::ActionMapping {
                    map_id,
                    action,
                    combination,
                } => CaptureStep::Bound {
                    map_id: *map_id,
                    action: action.clone(),
                    combination: *combination,
                    input,
                },
            });
        }

        if *self.capture.state() != CaptureState::Idle {
            return None;
        }

        // Cool-down is over.
        match &self.flow {
            CaptureFlow::Calibration { gpad_type, .. } => {
                let gpad_type = gpad_type.clone();
                if self.arm_next_target(active) {
                    return None;
                }
                self.flow = CaptureFlow::Monitor {
                    gpad_type: gpad_type.clone(),
                };
                self.capture = Capture::new(MONITOR_REARM);
                self.capture.arm(Accept::Any, active);
                Some(CaptureStep::CalibrationFinished { gpad_type })
            }
            CaptureFlow::Monitor { .. } | CaptureFlow::ActionMapping { .. } => {
                self.capture.arm(Accept::Any, active);
                None
            }
        }
    }

    /// Restart calibration for `targets` on a monitor session's layout.
    pub fn recalibrate(&mut self, targets: Vec<GamepadControl>, active: &BTreeSet<ObservedInput>) {
        let gpad_type = self.gpad_type().unwrap_or_default().to_string();
        self.flow = CaptureFlow::Calibration {
            gpad_type,
            remaining: targets.into(),
        };
        self.capture = Capture::new(self.calibration_cooldown);
        self.arm_next_target(active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Direction, GamepadState};

    const MS: Duration = Duration::from_millis(1);

    fn set(inputs: &[ObservedInput]) -> BTreeSet<ObservedInput> {
        inputs.iter().cloned().collect()
    }

    fn button(index: usize) -> ObservedInput {
        ObservedInput::RawButton { slot: 0, index }
    }

    #[test]
    fn test_observe_raw_thresholds() {
        let pad = RawGamepad {
            index: 2,
            id: "pad".into(),
            buttons: vec![0.5, 0.51],
            axes: vec![0.7, -0.71],
        };
        let active = observe_raw(&[pad], &CaptureSettings::default());
        assert_eq!(
            active,
            set(&[
                ObservedInput::RawButton { slot: 2, index: 1 },
                ObservedInput::RawAxis {
                    slot: 2,
                    index: 1,
                    positive: false
                },
            ])
        );
    }

    #[test]
    fn test_observe_live_filters_by_layout() {
        let mut state = InputState::default();
        state.keyboard.insert(65, 1.0);
        state.keyboard.insert(66, 0.0);
        let mut xbox = GamepadState::new("XBOX 360");
        xbox.write_button("A", 1.0);
        xbox.write_axis("lStick", crate::snapshot::AxisSubtype::X, 0.6, 0.35);
        state.gamepad.insert(0, xbox);
        let mut ps3 = GamepadState::new("Playstation 3");
        ps3.write_button("X", 1.0);
        state.gamepad.insert(1, ps3);

        let settings = CaptureSettings::default();
        let active = observe_live(&state, true, Some("XBOX 360"), &settings);
        assert_eq!(
            active,
            set(&[
                ObservedInput::Key(65),
                ObservedInput::Control {
                    slot: 0,
                    control: GamepadControl::button("A")
                },
            ])
        );
        assert!(observe_live(&state, false, None, &settings).is_empty());
    }

    #[test]
    fn test_capture_lifecycle() {
        let t0 = Instant::now();
        let mut capture = Capture::new(300 * MS);
        assert_eq!(capture.poll(t0, &set(&[button(0)])), None);

        capture.arm(Accept::Any, &BTreeSet::new());
        assert_eq!(capture.state(), &CaptureState::WaitingForInput);
        assert_eq!(capture.poll(t0, &BTreeSet::new()), None);

        let hit = capture.poll(t0 + 50 * MS, &set(&[button(3), button(1)]));
        assert_eq!(hit, Some(button(1)));

        assert_eq!(capture.poll(t0 + 100 * MS, &set(&[button(2)])), None);
        assert!(matches!(capture.state(), CaptureState::Captured { .. }));

        capture.poll(t0 + 350 * MS, &BTreeSet::new());
        assert_eq!(capture.state(), &CaptureState::Idle);
    }

    #[test]
    fn test_held_input_is_ignored_until_released() {
        let t0 = Instant::now();
        let mut capture = Capture::new(300 * MS);
        capture.arm(Accept::Any, &set(&[button(0)]));

        assert_eq!(capture.poll(t0, &set(&[button(0)])), None);
        assert_eq!(capture.poll(t0, &BTreeSet::new()), None);
        assert_eq!(capture.poll(t0, &set(&[button(0)])), Some(button(0)));
    }

    #[test]
    fn test_accept_filters_raw_kinds() {
        let t0 = Instant::now();
        let mut capture = Capture::new(300 * MS);
        capture.arm(Accept::RawAxes, &BTreeSet::new());
        assert_eq!(capture.poll(t0, &set(&[button(0)])), None);

        let axis = ObservedInput::RawAxis {
            slot: 0,
            index: 1,
            positive: true,
        };
        assert_eq!(capture.poll(t0, &set(&[button(0), axis.clone()])), Some(axis));
    }

    #[test]
    fn test_calibration_walks_targets_then_monitors() {
        let settings = CaptureSettings::default();
        let t0 = Instant::now();
        let targets = vec![
            GamepadControl::button("A"),
            GamepadControl::axis("lStick", Direction::Up),
        ];
        let mut session = CaptureSession::calibration("XBOX 360", targets, &settings, &BTreeSet::new());
        assert_eq!(session.target(), Some(&GamepadControl::button("A")));

        let step = session.poll(t0, &set(&[button(0)]));
        assert_eq!(
            step,
            Some(CaptureStep::Calibrated {
                gpad_type: "XBOX 360".into(),
                target: GamepadControl::button("A"),
                input: button(0),
            })
        );

        // Still held after the cool-down: next target armed, button ignored.
        assert_eq!(session.poll(t0 + 300 * MS, &set(&[button(0)])), None);
        assert_eq!(
            session.target(),
            Some(&GamepadControl::axis("lStick", Direction::Up))
        );
        let axis = ObservedInput::RawAxis {
            slot: 0,
            index: 1,
            positive: false,
        };
        let step = session.poll(t0 + 350 * MS, &set(&[button(0), axis.clone()]));
        assert!(matches!(step, Some(CaptureStep::Calibrated { input, .. }) if input == axis));

        let step = session.poll(t0 + 700 * MS, &BTreeSet::new());
        assert_eq!(
            step,
            Some(CaptureStep::CalibrationFinished {
                gpad_type: "XBOX 360".into()
            })
        );
        assert!(matches!(session.flow(), CaptureFlow::Monitor { .. }));
    }

    #[test]
    fn test_empty_calibration_finishes_on_first_poll() {
        let settings = CaptureSettings::default();
        let mut session =
            CaptureSession::calibration("Logitech F310", Vec::new(), &settings, &BTreeSet::new());
        assert_eq!(session.target(), None);
        assert!(matches!(
            session.poll(Instant::now(), &BTreeSet::new()),
            Some(CaptureStep::CalibrationFinished { .. })
        ));
    }

    #[test]
    fn test_action_mapping_rearms_after_cooldown() {
        let settings = CaptureSettings::default();
        let t0 = Instant::now();
        let mut session = CaptureSession::action_mapping(2, "jump", 0, &settings, &BTreeSet::new());

        let first = session.poll(t0, &set(&[ObservedInput::Key(32)]));
        assert!(matches!(first, Some(CaptureStep::Bound { input: ObservedInput::Key(32), .. })));

        assert_eq!(session.poll(t0 + 300 * MS, &set(&[ObservedInput::Key(32)])), None);
        assert_eq!(session.state(), &CaptureState::WaitingForInput);

        let second = session.poll(t0 + 400 * MS, &set(&[ObservedInput::Key(32), ObservedInput::Key(87)]));
        assert!(matches!(second, Some(CaptureStep::Bound { input: ObservedInput::Key(87), .. })));
    }
}
